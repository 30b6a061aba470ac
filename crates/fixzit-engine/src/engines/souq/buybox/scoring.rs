use super::super::domain::{FulfillmentMethod, Listing, SellerHealth};

pub(crate) const PRICE_WEIGHT: f64 = 0.35;
pub(crate) const ON_TIME_WEIGHT: f64 = 0.25;
pub(crate) const DEFECT_WEIGHT: f64 = 0.20;
pub(crate) const RATING_WEIGHT: f64 = 0.10;
pub(crate) const CANCEL_WEIGHT: f64 = 0.10;

pub(crate) const FBF_BONUS: f64 = 5.0;
pub(crate) const ORDER_VOLUME_BONUS: f64 = 3.0;
pub(crate) const ORDER_VOLUME_THRESHOLD: u32 = 100;
pub(crate) const HEALTH_BONUS: f64 = 2.0;

pub(crate) const SCORE_CAP: f64 = 100.0;
const NEUTRAL_PRICE_SCORE: f64 = 50.0;

/// Relative price position against the market mean, 0-100. An empty market
/// (mean of zero) reads as neutral.
pub(crate) fn price_competitiveness(price: f64, avg_price: f64) -> f64 {
    if avg_price <= 0.0 {
        return NEUTRAL_PRICE_SCORE;
    }
    (((avg_price - price) / avg_price) * 100.0).clamp(0.0, 100.0)
}

/// Composite Buy Box score for one candidate listing, capped at 100.
pub(crate) fn score_listing(listing: &Listing, health: Option<SellerHealth>, avg_price: f64) -> f64 {
    let metrics = &listing.metrics;

    let mut score = price_competitiveness(listing.price, avg_price) * PRICE_WEIGHT
        + metrics.on_time_ship_rate * ON_TIME_WEIGHT
        + (100.0 - metrics.defect_rate) * DEFECT_WEIGHT
        + (metrics.customer_rating / 5.0 * 100.0) * RATING_WEIGHT
        + (100.0 - metrics.cancel_rate) * CANCEL_WEIGHT;

    if listing.fulfillment == FulfillmentMethod::Fbf {
        score += FBF_BONUS;
    }
    if metrics.order_count > ORDER_VOLUME_THRESHOLD {
        score += ORDER_VOLUME_BONUS;
    }
    if health == Some(SellerHealth::Excellent) {
        score += HEALTH_BONUS;
    }

    score.min(SCORE_CAP)
}
