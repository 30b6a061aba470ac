use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::buybox::BuyBoxDecision;
use super::domain::{Fsin, Listing, ListingId, Seller, SellerId};
use super::settings::AutoRepricerSettings;
use crate::tenancy::OrgId;

/// Storage abstraction so the marketplace engines can be exercised in
/// isolation. Every call is scoped to one tenant.
pub trait MarketplaceRepository: Send + Sync {
    fn listings_for_product(&self, org: &OrgId, fsin: &Fsin)
        -> Result<Vec<Listing>, RepositoryError>;
    fn listings_for_seller(
        &self,
        org: &OrgId,
        seller: &SellerId,
    ) -> Result<Vec<Listing>, RepositoryError>;
    fn seller(&self, org: &OrgId, id: &SellerId) -> Result<Option<Seller>, RepositoryError>;
    fn sellers_with_repricing_enabled(&self, org: &OrgId) -> Result<Vec<Seller>, RepositoryError>;
    fn update_listing_price(
        &self,
        org: &OrgId,
        id: &ListingId,
        price: f64,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
    fn update_listing_feed(
        &self,
        org: &OrgId,
        id: &ListingId,
        price: Option<f64>,
        quantity: Option<u32>,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
    fn save_seller_settings(
        &self,
        org: &OrgId,
        id: &SellerId,
        settings: Option<AutoRepricerSettings>,
    ) -> Result<(), RepositoryError>;
    /// Persist a freshly computed Buy Box decision so listing documents carry
    /// their current score and winner flag.
    fn record_buy_box(&self, org: &OrgId, decision: &BuyBoxDecision)
        -> Result<(), RepositoryError>;
    /// Mean orders per day over the trailing window, used for price-history
    /// analytics snapshots.
    fn average_daily_orders(
        &self,
        org: &OrgId,
        listing: &ListingId,
        window_days: u32,
    ) -> Result<f64, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Append-only price-change log consumed by analytics; the engines only ever
/// write to it.
pub trait PriceHistorySink: Send + Sync {
    fn append(&self, org: &OrgId, record: PriceChangeRecord) -> Result<(), SinkError>;
}

/// One audited price change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChangeRecord {
    pub listing_id: ListingId,
    pub seller_id: SellerId,
    pub fsin: Fsin,
    pub old_price: f64,
    pub new_price: f64,
    pub change_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_listing: Option<ListingId>,
    /// Trailing 7-day average daily order count at the moment of the change.
    pub sales_before: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("price history sink unavailable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget job queue used for post-change notifications. Enqueue
/// failures are surfaced to the caller but never retried here.
pub trait NotificationQueue: Send + Sync {
    fn enqueue(&self, job: QueueJob) -> Result<(), QueueError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueJob {
    pub queue: String,
    pub job_type: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue transport unavailable: {0}")]
    Transport(String),
}
