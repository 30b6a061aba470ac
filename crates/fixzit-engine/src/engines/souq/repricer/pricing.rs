use super::super::buybox::{BuyBoxDecision, RankedOffer};
use super::super::domain::ListingId;
use super::super::settings::{RepricerRule, TargetPosition};

/// Multiplier applied over the lowest competitor in `competitive` mode.
pub(crate) const COMPETITIVE_MARKUP: f64 = 1.05;

/// Prices closer than half a cent are the same price.
const PRICE_TOLERANCE: f64 = 0.005;

pub(crate) fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn lowest_competitor<'a>(
    board: &'a BuyBoxDecision,
    listing_id: &ListingId,
) -> Option<&'a RankedOffer> {
    board
        .offers
        .iter()
        .filter(|offer| &offer.listing_id != listing_id)
        .min_by(|a, b| {
            a.price
                .partial_cmp(&b.price)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Compute the price a listing should move to, or `None` when it should keep
/// its current price.
///
/// A listing already holding the Buy Box under a `competitive` rule stays
/// put. With no competitors on the board the price rises to the rule
/// ceiling. Otherwise the target tracks the lowest competitor (undercut for
/// `win`, a 5% markup for `competitive`), bounded to the rule's range with
/// the protect-margin floor applied last, and rounded to two decimals.
pub(crate) fn calculate_optimal_price(
    current_price: f64,
    board: &BuyBoxDecision,
    rule: &RepricerRule,
    listing_id: &ListingId,
) -> Option<f64> {
    let already_winning = board
        .winner
        .as_ref()
        .map(|winner| &winner.listing_id == listing_id)
        .unwrap_or(false);
    if already_winning && rule.target_position == TargetPosition::Competitive {
        return None;
    }

    let target = match lowest_competitor(board, listing_id) {
        None => rule.min_price.max(rule.max_price),
        Some(competitor) => match rule.target_position {
            TargetPosition::Win => competitor.price - rule.undercut,
            TargetPosition::Competitive => competitor.price * COMPETITIVE_MARKUP,
        },
    };

    let mut bounded = target.max(rule.min_price).min(rule.max_price);
    if rule.protect_margin && bounded < rule.min_price {
        bounded = rule.min_price;
    }

    let rounded = round_price(bounded);
    if (rounded - current_price).abs() < PRICE_TOLERANCE {
        None
    } else {
        Some(rounded)
    }
}

/// Relative change between two prices as a percentage, rounded to 2 decimals.
pub(crate) fn change_pct(old_price: f64, new_price: f64) -> f64 {
    if old_price <= 0.0 {
        return 0.0;
    }
    round_price((new_price - old_price) / old_price * 100.0)
}
