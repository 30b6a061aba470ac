use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::engines::souq::buybox::BuyBoxDecision;
use crate::engines::souq::domain::{
    Fsin, FulfillmentMethod, Listing, ListingCondition, ListingId, ListingStatus,
    PerformanceMetrics, Seller, SellerHealth, SellerId,
};
use crate::engines::souq::repository::{
    MarketplaceRepository, NotificationQueue, PriceChangeRecord, PriceHistorySink, QueueError,
    QueueJob, RepositoryError, SinkError,
};
use crate::engines::souq::settings::{AutoRepricerSettings, RepricerRule, TargetPosition};
use crate::engines::souq::SouqService;
use crate::tenancy::OrgId;

pub(super) fn org() -> OrgId {
    OrgId::new("org-fixzit-demo").expect("valid org id")
}

pub(super) fn other_org() -> OrgId {
    OrgId::new("org-other-tenant").expect("valid org id")
}

pub(super) fn run_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 28, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn metrics() -> PerformanceMetrics {
    PerformanceMetrics {
        order_count: 50,
        cancel_rate: 2.0,
        defect_rate: 5.0,
        on_time_ship_rate: 95.0,
        customer_rating: 4.5,
    }
}

pub(super) fn listing(id: &str, seller: &str, fsin: &str, price: f64) -> Listing {
    Listing {
        id: ListingId(id.to_string()),
        seller_id: SellerId(seller.to_string()),
        fsin: Fsin(fsin.to_string()),
        sku: format!("SKU-{id}"),
        title: format!("Listing {id}"),
        price,
        quantity: 10,
        fulfillment: FulfillmentMethod::Fbm,
        condition: ListingCondition::New,
        status: ListingStatus::Active,
        buy_box_eligible: true,
        metrics: metrics(),
        updated_at: run_at(),
    }
}

pub(super) fn seller(id: &str, health: SellerHealth) -> Seller {
    Seller {
        id: SellerId(id.to_string()),
        name: format!("Seller {id}"),
        health,
        auto_repricer: None,
    }
}

pub(super) fn rule(
    min: f64,
    max: f64,
    target: TargetPosition,
    undercut: f64,
    protect: bool,
) -> RepricerRule {
    RepricerRule {
        enabled: true,
        min_price: min,
        max_price: max,
        target_position: target,
        undercut,
        protect_margin: protect,
    }
}

pub(super) fn default_settings(default_rule: RepricerRule) -> AutoRepricerSettings {
    AutoRepricerSettings {
        enabled: true,
        listing_rules: BTreeMap::new(),
        fsin_rules: BTreeMap::new(),
        default_rule: Some(default_rule),
    }
}

#[derive(Default, Clone)]
struct TenantState {
    listings: BTreeMap<String, Listing>,
    sellers: BTreeMap<String, Seller>,
    daily_orders: HashMap<String, f64>,
    decisions: Vec<BuyBoxDecision>,
}

/// In-memory tenant-partitioned marketplace store.
#[derive(Default)]
pub(super) struct MemoryMarketplace {
    state: Mutex<HashMap<String, TenantState>>,
}

impl MemoryMarketplace {
    pub(super) fn insert_listing(&self, org: &OrgId, listing: Listing) {
        let mut guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .listings
            .insert(listing.id.0.clone(), listing);
    }

    pub(super) fn insert_seller(&self, org: &OrgId, seller: Seller) {
        let mut guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .sellers
            .insert(seller.id.0.clone(), seller);
    }

    pub(super) fn set_daily_orders(&self, org: &OrgId, listing: &ListingId, value: f64) {
        let mut guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .daily_orders
            .insert(listing.0.clone(), value);
    }

    pub(super) fn listing_price(&self, org: &OrgId, id: &ListingId) -> Option<f64> {
        let guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .get(org.as_str())
            .and_then(|tenant| tenant.listings.get(&id.0))
            .map(|listing| listing.price)
    }

    pub(super) fn listing_quantity(&self, org: &OrgId, id: &ListingId) -> Option<u32> {
        let guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .get(org.as_str())
            .and_then(|tenant| tenant.listings.get(&id.0))
            .map(|listing| listing.quantity)
    }

    pub(super) fn recorded_decisions(&self, org: &OrgId) -> Vec<BuyBoxDecision> {
        let guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .get(org.as_str())
            .map(|tenant| tenant.decisions.clone())
            .unwrap_or_default()
    }
}

impl MarketplaceRepository for MemoryMarketplace {
    fn listings_for_product(
        &self,
        org: &OrgId,
        fsin: &Fsin,
    ) -> Result<Vec<Listing>, RepositoryError> {
        let guard = self.state.lock().expect("marketplace mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .map(|tenant| {
                tenant
                    .listings
                    .values()
                    .filter(|listing| &listing.fsin == fsin)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn listings_for_seller(
        &self,
        org: &OrgId,
        seller: &SellerId,
    ) -> Result<Vec<Listing>, RepositoryError> {
        let guard = self.state.lock().expect("marketplace mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .map(|tenant| {
                tenant
                    .listings
                    .values()
                    .filter(|listing| &listing.seller_id == seller)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn seller(&self, org: &OrgId, id: &SellerId) -> Result<Option<Seller>, RepositoryError> {
        let guard = self.state.lock().expect("marketplace mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .and_then(|tenant| tenant.sellers.get(&id.0))
            .cloned())
    }

    fn sellers_with_repricing_enabled(&self, org: &OrgId) -> Result<Vec<Seller>, RepositoryError> {
        let guard = self.state.lock().expect("marketplace mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .map(|tenant| {
                tenant
                    .sellers
                    .values()
                    .filter(|seller| seller.repricing_enabled())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn update_listing_price(
        &self,
        org: &OrgId,
        id: &ListingId,
        price: f64,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("marketplace mutex poisoned");
        let listing = guard
            .get_mut(org.as_str())
            .and_then(|tenant| tenant.listings.get_mut(&id.0))
            .ok_or(RepositoryError::NotFound)?;
        listing.price = price;
        listing.updated_at = at;
        Ok(())
    }

    fn update_listing_feed(
        &self,
        org: &OrgId,
        id: &ListingId,
        price: Option<f64>,
        quantity: Option<u32>,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("marketplace mutex poisoned");
        let listing = guard
            .get_mut(org.as_str())
            .and_then(|tenant| tenant.listings.get_mut(&id.0))
            .ok_or(RepositoryError::NotFound)?;
        if let Some(price) = price {
            listing.price = price;
        }
        if let Some(quantity) = quantity {
            listing.quantity = quantity;
        }
        listing.updated_at = at;
        Ok(())
    }

    fn save_seller_settings(
        &self,
        org: &OrgId,
        id: &SellerId,
        settings: Option<AutoRepricerSettings>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("marketplace mutex poisoned");
        let seller = guard
            .get_mut(org.as_str())
            .and_then(|tenant| tenant.sellers.get_mut(&id.0))
            .ok_or(RepositoryError::NotFound)?;
        seller.auto_repricer = settings;
        Ok(())
    }

    fn record_buy_box(
        &self,
        org: &OrgId,
        decision: &BuyBoxDecision,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .decisions
            .push(decision.clone());
        Ok(())
    }

    fn average_daily_orders(
        &self,
        org: &OrgId,
        listing: &ListingId,
        _window_days: u32,
    ) -> Result<f64, RepositoryError> {
        let guard = self.state.lock().expect("marketplace mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .and_then(|tenant| tenant.daily_orders.get(&listing.0))
            .copied()
            .unwrap_or(0.0))
    }
}

#[derive(Default)]
pub(super) struct MemoryHistory {
    records: Mutex<Vec<PriceChangeRecord>>,
}

impl MemoryHistory {
    pub(super) fn records(&self) -> Vec<PriceChangeRecord> {
        self.records.lock().expect("history mutex poisoned").clone()
    }
}

impl PriceHistorySink for MemoryHistory {
    fn append(&self, _org: &OrgId, record: PriceChangeRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .expect("history mutex poisoned")
            .push(record);
        Ok(())
    }
}

pub(super) struct UnavailableHistory;

impl PriceHistorySink for UnavailableHistory {
    fn append(&self, _org: &OrgId, _record: PriceChangeRecord) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("analytics store offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryQueue {
    jobs: Mutex<Vec<QueueJob>>,
}

impl MemoryQueue {
    pub(super) fn jobs(&self) -> Vec<QueueJob> {
        self.jobs.lock().expect("queue mutex poisoned").clone()
    }
}

impl NotificationQueue for MemoryQueue {
    fn enqueue(&self, job: QueueJob) -> Result<(), QueueError> {
        self.jobs.lock().expect("queue mutex poisoned").push(job);
        Ok(())
    }
}

pub(super) type MemoryService = SouqService<MemoryMarketplace, MemoryHistory, MemoryQueue>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<MemoryMarketplace>,
    Arc<MemoryHistory>,
    Arc<MemoryQueue>,
) {
    let repository = Arc::new(MemoryMarketplace::default());
    let history = Arc::new(MemoryHistory::default());
    let queue = Arc::new(MemoryQueue::default());
    let service = SouqService::with_offer_ttl(
        repository.clone(),
        history.clone(),
        queue.clone(),
        Duration::seconds(300),
    );
    (service, repository, history, queue)
}

pub(super) fn build_service_with_failing_history() -> (
    SouqService<MemoryMarketplace, UnavailableHistory, MemoryQueue>,
    Arc<MemoryMarketplace>,
    Arc<MemoryQueue>,
) {
    let repository = Arc::new(MemoryMarketplace::default());
    let history = Arc::new(UnavailableHistory);
    let queue = Arc::new(MemoryQueue::default());
    let service = SouqService::with_offer_ttl(
        repository.clone(),
        history,
        queue.clone(),
        Duration::seconds(300),
    );
    (service, repository, queue)
}
