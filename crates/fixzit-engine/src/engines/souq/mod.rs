//! Souq marketplace engines: Buy Box winner selection, automated repricing,
//! and the seller listing feed.

pub mod buybox;
pub mod domain;
pub mod feed;
pub mod offers;
pub mod repository;
pub mod repricer;
pub mod router;
pub mod settings;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::Duration;

pub use buybox::{BuyBoxDecision, BuyBoxEngine, BuyBoxError, RankedOffer};
pub use domain::{
    Fsin, FulfillmentMethod, Listing, ListingCondition, ListingId, ListingStatus,
    PerformanceMetrics, Seller, SellerHealth, SellerId,
};
pub use feed::{FeedImportError, FeedImportSummary, ListingFeedImporter};
pub use offers::OfferBoardProvider;
pub use repository::{
    MarketplaceRepository, NotificationQueue, PriceChangeRecord, PriceHistorySink, QueueError,
    QueueJob, RepositoryError, SinkError,
};
pub use repricer::{AutoRepricer, RepriceRunSummary, RepricerError};
pub use router::souq_router;
pub use settings::{AutoRepricerSettings, RepricerRule, SettingsError, TargetPosition};

/// How long an offer board snapshot stays fresh between batch reads.
const DEFAULT_OFFER_TTL_SECS: i64 = 300;

/// Facade bundling the marketplace engines behind one constructor so routers
/// and jobs share the same offer-board cache.
pub struct SouqService<R, H, Q> {
    offers: Arc<OfferBoardProvider<R>>,
    repricer: AutoRepricer<R, H, Q>,
    feed: ListingFeedImporter<R>,
}

impl<R, H, Q> SouqService<R, H, Q>
where
    R: MarketplaceRepository,
    H: PriceHistorySink,
    Q: NotificationQueue,
{
    pub fn new(repository: Arc<R>, history: Arc<H>, queue: Arc<Q>) -> Self {
        Self::with_offer_ttl(
            repository,
            history,
            queue,
            Duration::seconds(DEFAULT_OFFER_TTL_SECS),
        )
    }

    pub fn with_offer_ttl(
        repository: Arc<R>,
        history: Arc<H>,
        queue: Arc<Q>,
        offer_ttl: Duration,
    ) -> Self {
        let offers = Arc::new(OfferBoardProvider::new(repository.clone(), offer_ttl));
        let repricer = AutoRepricer::new(repository.clone(), offers.clone(), history, queue);
        let feed = ListingFeedImporter::new(repository);

        Self {
            offers,
            repricer,
            feed,
        }
    }

    pub fn buybox(&self) -> &BuyBoxEngine<R> {
        self.offers.engine()
    }

    pub fn offers(&self) -> &OfferBoardProvider<R> {
        &self.offers
    }

    pub fn repricer(&self) -> &AutoRepricer<R, H, Q> {
        &self.repricer
    }

    pub fn feed(&self) -> &ListingFeedImporter<R> {
        &self.feed
    }
}
