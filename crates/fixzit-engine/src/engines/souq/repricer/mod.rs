mod pricing;

pub(crate) use pricing::calculate_optimal_price;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::buybox::BuyBoxError;
use super::domain::{Listing, SellerId};
use super::offers::OfferBoardProvider;
use super::repository::{
    MarketplaceRepository, NotificationQueue, PriceChangeRecord, PriceHistorySink, QueueError,
    QueueJob, RepositoryError, SinkError,
};
use super::settings::{AutoRepricerSettings, RepricerRule};
use crate::tenancy::OrgId;

/// Trailing window, in days, for the order-rate snapshot written to the
/// price-history log.
const SALES_WINDOW_DAYS: u32 = 7;

const NOTIFICATION_QUEUE: &str = "notifications";
const PRICE_CHANGED_JOB: &str = "souq.price_changed";

/// Automated price agent: moves a seller's listings inside their configured
/// rule bounds in response to the current offer board.
pub struct AutoRepricer<R, H, Q> {
    repository: Arc<R>,
    offers: Arc<OfferBoardProvider<R>>,
    history: Arc<H>,
    queue: Arc<Q>,
}

/// Aggregate outcome of a reprice run. Individual failures are logged, not
/// returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepriceRunSummary {
    pub processed: u32,
    pub repriced: u32,
    pub errors: u32,
}

impl RepriceRunSummary {
    fn absorb(&mut self, other: RepriceRunSummary) {
        self.processed += other.processed;
        self.repriced += other.repriced;
        self.errors += other.errors;
    }
}

/// Error raised by repricer operations.
#[derive(Debug, thiserror::Error)]
pub enum RepricerError {
    #[error("seller {0:?} not found for tenant")]
    SellerNotFound(SellerId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    BuyBox(#[from] BuyBoxError),
    #[error(transparent)]
    History(#[from] SinkError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl<R, H, Q> AutoRepricer<R, H, Q>
where
    R: MarketplaceRepository,
    H: PriceHistorySink,
    Q: NotificationQueue,
{
    pub fn new(
        repository: Arc<R>,
        offers: Arc<OfferBoardProvider<R>>,
        history: Arc<H>,
        queue: Arc<Q>,
    ) -> Self {
        Self {
            repository,
            offers,
            history,
            queue,
        }
    }

    /// Turn repricing on for a seller, replacing any stored rule set.
    pub fn enable_auto_repricer(
        &self,
        org: &OrgId,
        seller_id: &SellerId,
        settings: AutoRepricerSettings,
    ) -> Result<(), RepricerError> {
        self.repository
            .seller(org, seller_id)?
            .ok_or_else(|| RepricerError::SellerNotFound(seller_id.clone()))?;

        let settings = AutoRepricerSettings {
            enabled: true,
            ..settings
        };
        self.repository
            .save_seller_settings(org, seller_id, Some(settings))?;
        Ok(())
    }

    /// Turn repricing off, keeping the stored rules for later re-enable.
    pub fn disable_auto_repricer(
        &self,
        org: &OrgId,
        seller_id: &SellerId,
    ) -> Result<(), RepricerError> {
        let seller = self
            .repository
            .seller(org, seller_id)?
            .ok_or_else(|| RepricerError::SellerNotFound(seller_id.clone()))?;

        let settings = seller.auto_repricer.map(|settings| AutoRepricerSettings {
            enabled: false,
            ..settings
        });
        self.repository
            .save_seller_settings(org, seller_id, settings)?;
        Ok(())
    }

    pub fn reprice_seller(
        &self,
        org: &OrgId,
        seller_id: &SellerId,
    ) -> Result<RepriceRunSummary, RepricerError> {
        self.reprice_seller_at(org, seller_id, Utc::now())
    }

    /// Reprice every active, in-stock listing of one seller that resolves to
    /// an enabled rule. A failing listing is logged and counted; the rest of
    /// the batch continues.
    pub fn reprice_seller_at(
        &self,
        org: &OrgId,
        seller_id: &SellerId,
        now: DateTime<Utc>,
    ) -> Result<RepriceRunSummary, RepricerError> {
        let seller = self
            .repository
            .seller(org, seller_id)?
            .ok_or_else(|| RepricerError::SellerNotFound(seller_id.clone()))?;

        let mut summary = RepriceRunSummary::default();
        let settings = match seller.auto_repricer.filter(|settings| settings.enabled) {
            Some(settings) => settings,
            None => return Ok(summary),
        };

        let listings = self.repository.listings_for_seller(org, seller_id)?;
        for listing in listings
            .into_iter()
            .filter(|listing| listing.is_active() && listing.in_stock())
        {
            summary.processed += 1;

            let rule = match settings.rule_for(&listing.id, &listing.fsin) {
                Some(rule) if rule.enabled => rule,
                _ => continue,
            };

            match self.reprice_listing(org, &listing, rule, now) {
                Ok(true) => summary.repriced += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(
                        org = %org,
                        listing = %listing.id.0,
                        error = %err,
                        "repricing listing failed"
                    );
                    summary.errors += 1;
                }
            }
        }

        Ok(summary)
    }

    pub fn reprice_all_sellers(&self, org: &OrgId) -> Result<RepriceRunSummary, RepricerError> {
        self.reprice_all_sellers_at(org, Utc::now())
    }

    /// Periodic batch entry point: run every seller with repricing enabled,
    /// sequentially. One seller blowing up does not stop the loop.
    pub fn reprice_all_sellers_at(
        &self,
        org: &OrgId,
        now: DateTime<Utc>,
    ) -> Result<RepriceRunSummary, RepricerError> {
        let sellers = self.repository.sellers_with_repricing_enabled(org)?;

        let mut total = RepriceRunSummary::default();
        for seller in sellers {
            match self.reprice_seller_at(org, &seller.id, now) {
                Ok(summary) => total.absorb(summary),
                Err(err) => {
                    warn!(org = %org, seller = %seller.id.0, error = %err, "seller reprice run failed");
                    total.errors += 1;
                }
            }
        }

        Ok(total)
    }

    /// Returns whether the listing's price moved.
    fn reprice_listing(
        &self,
        org: &OrgId,
        listing: &Listing,
        rule: &RepricerRule,
        now: DateTime<Utc>,
    ) -> Result<bool, RepricerError> {
        let board = self.offers.board_at(org, &listing.fsin, now)?;

        let new_price = match calculate_optimal_price(listing.price, &board, rule, &listing.id) {
            Some(price) => price,
            None => return Ok(false),
        };
        let competitor = pricing::lowest_competitor(&board, &listing.id).cloned();

        self.repository
            .update_listing_price(org, &listing.id, new_price, now)?;
        self.offers.invalidate(org, &listing.fsin);

        self.offers.recalculate_at(org, &listing.fsin, now)?;

        let sales_before =
            self.repository
                .average_daily_orders(org, &listing.id, SALES_WINDOW_DAYS)?;
        self.history.append(
            org,
            PriceChangeRecord {
                listing_id: listing.id.clone(),
                seller_id: listing.seller_id.clone(),
                fsin: listing.fsin.clone(),
                old_price: listing.price,
                new_price,
                change_pct: pricing::change_pct(listing.price, new_price),
                competitor_price: competitor.as_ref().map(|offer| offer.price),
                competitor_listing: competitor.map(|offer| offer.listing_id),
                sales_before,
                recorded_at: now,
            },
        )?;

        self.queue.enqueue(QueueJob {
            queue: NOTIFICATION_QUEUE.to_string(),
            job_type: PRICE_CHANGED_JOB.to_string(),
            payload: json!({
                "org_id": org.as_str(),
                "listing_id": listing.id.0,
                "seller_id": listing.seller_id.0,
                "fsin": listing.fsin.0,
                "old_price": listing.price,
                "new_price": new_price,
            }),
        })?;

        Ok(true)
    }
}
