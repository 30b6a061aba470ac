use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use fixzit_engine::engines::dispatch::{
    Assignee, Assignment, AssignmentCandidate, AssignmentConfig, Availability, CandidateDirectory,
    CandidateId, CandidateKind, RepositoryError as DispatchRepositoryError, TimeSlot, WorkOrder,
    WorkOrderId, WorkOrderPriority, WorkOrderRepository, WorkOrderStatus,
};
use fixzit_engine::engines::souq::{
    AutoRepricerSettings, BuyBoxDecision, Fsin, FulfillmentMethod, Listing, ListingCondition,
    ListingId, ListingStatus, MarketplaceRepository, NotificationQueue, PerformanceMetrics,
    PriceChangeRecord, PriceHistorySink, QueueError, QueueJob, RepositoryError, RepricerRule,
    Seller, SellerHealth, SellerId, SinkError, TargetPosition,
};
use fixzit_engine::tenancy::OrgId;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
struct MarketTenant {
    listings: BTreeMap<String, Listing>,
    sellers: BTreeMap<String, Seller>,
    daily_orders: HashMap<String, f64>,
    buy_boxes: HashMap<String, BuyBoxDecision>,
}

/// In-memory marketplace store partitioned by tenant.
#[derive(Default)]
pub(crate) struct InMemoryMarketplace {
    state: Mutex<HashMap<String, MarketTenant>>,
}

impl InMemoryMarketplace {
    pub(crate) fn insert_listing(&self, org: &OrgId, listing: Listing) {
        let mut guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .listings
            .insert(listing.id.0.clone(), listing);
    }

    pub(crate) fn insert_seller(&self, org: &OrgId, seller: Seller) {
        let mut guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .sellers
            .insert(seller.id.0.clone(), seller);
    }

    pub(crate) fn set_daily_orders(&self, org: &OrgId, listing: &ListingId, value: f64) {
        let mut guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .daily_orders
            .insert(listing.0.clone(), value);
    }

    pub(crate) fn listing_price(&self, org: &OrgId, id: &ListingId) -> Option<f64> {
        let guard = self.state.lock().expect("marketplace mutex poisoned");
        guard
            .get(org.as_str())
            .and_then(|tenant| tenant.listings.get(&id.0))
            .map(|listing| listing.price)
    }
}

impl MarketplaceRepository for InMemoryMarketplace {
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
            .buy_boxes
            .insert(decision.fsin.0.clone(), decision.clone());
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
pub(crate) struct InMemoryPriceHistory {
    records: Mutex<Vec<PriceChangeRecord>>,
}

impl InMemoryPriceHistory {
    pub(crate) fn records(&self) -> Vec<PriceChangeRecord> {
        self.records.lock().expect("history mutex poisoned").clone()
    }
}

impl PriceHistorySink for InMemoryPriceHistory {
    fn append(&self, _org: &OrgId, record: PriceChangeRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .expect("history mutex poisoned")
            .push(record);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryNotificationQueue {
    jobs: Mutex<Vec<QueueJob>>,
}

impl InMemoryNotificationQueue {
    pub(crate) fn jobs(&self) -> Vec<QueueJob> {
        self.jobs.lock().expect("queue mutex poisoned").clone()
    }
}

impl NotificationQueue for InMemoryNotificationQueue {
    fn enqueue(&self, job: QueueJob) -> Result<(), QueueError> {
        self.jobs.lock().expect("queue mutex poisoned").push(job);
        Ok(())
    }
}

/// In-memory work-order store. Workload and booked slots are derived from
/// the stored orders rather than tracked separately.
#[derive(Default)]
pub(crate) struct InMemoryWorkOrders {
    state: Mutex<HashMap<String, BTreeMap<String, WorkOrder>>>,
}

impl InMemoryWorkOrders {
    pub(crate) fn insert(&self, org: &OrgId, work_order: WorkOrder) {
        let mut guard = self.state.lock().expect("work order mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .insert(work_order.id.0.clone(), work_order);
    }

    pub(crate) fn get(&self, org: &OrgId, id: &WorkOrderId) -> Option<WorkOrder> {
        let guard = self.state.lock().expect("work order mutex poisoned");
        guard
            .get(org.as_str())
            .and_then(|tenant| tenant.get(&id.0))
            .cloned()
    }
}

fn assigned_to_candidate(order: &WorkOrder, candidate: &CandidateId) -> bool {
    match &order.assignment.assigned_to {
        Some(Assignee::Technician(id)) | Some(Assignee::Vendor(id)) => id == candidate,
        _ => false,
    }
}

impl WorkOrderRepository for InMemoryWorkOrders {
    fn work_order(
        &self,
        org: &OrgId,
        id: &WorkOrderId,
    ) -> Result<Option<WorkOrder>, DispatchRepositoryError> {
        let guard = self.state.lock().expect("work order mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .and_then(|tenant| tenant.get(&id.0))
            .cloned())
    }

    fn assign(
        &self,
        org: &OrgId,
        id: &WorkOrderId,
        assignee: Assignee,
        at: DateTime<Utc>,
    ) -> Result<(), DispatchRepositoryError> {
        let mut guard = self.state.lock().expect("work order mutex poisoned");
        let order = guard
            .get_mut(org.as_str())
            .and_then(|tenant| tenant.get_mut(&id.0))
            .ok_or(DispatchRepositoryError::NotFound)?;
        if order.assignment.assigned_to.is_some() {
            return Err(DispatchRepositoryError::Conflict);
        }
        order.assignment.assigned_to = Some(assignee);
        order.assignment.assigned_at = Some(at);
        order.status = WorkOrderStatus::Assigned;
        Ok(())
    }

    fn open_workload(
        &self,
        org: &OrgId,
        candidate: &CandidateId,
    ) -> Result<u32, DispatchRepositoryError> {
        let guard = self.state.lock().expect("work order mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .map(|tenant| {
                tenant
                    .values()
                    .filter(|order| {
                        !order.status.is_terminal() && assigned_to_candidate(order, candidate)
                    })
                    .count() as u32
            })
            .unwrap_or(0))
    }

    fn booked_slots(
        &self,
        org: &OrgId,
        candidate: &CandidateId,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, DispatchRepositoryError> {
        let guard = self.state.lock().expect("work order mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .map(|tenant| {
                tenant
                    .values()
                    .filter(|order| {
                        !order.status.is_terminal() && assigned_to_candidate(order, candidate)
                    })
                    .filter_map(|order| order.scheduled)
                    .filter(|scheduled| scheduled.date == date)
                    .map(|scheduled| scheduled.slot)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryDirectory {
    state: Mutex<HashMap<String, (Vec<AssignmentCandidate>, Vec<AssignmentCandidate>)>>,
}

impl InMemoryDirectory {
    pub(crate) fn add_technician(&self, org: &OrgId, candidate: AssignmentCandidate) {
        let mut guard = self.state.lock().expect("directory mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .0
            .push(candidate);
    }

    pub(crate) fn add_vendor(&self, org: &OrgId, candidate: AssignmentCandidate) {
        let mut guard = self.state.lock().expect("directory mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .1
            .push(candidate);
    }
}

impl CandidateDirectory for InMemoryDirectory {
    fn technicians(
        &self,
        org: &OrgId,
    ) -> Result<Vec<AssignmentCandidate>, DispatchRepositoryError> {
        let guard = self.state.lock().expect("directory mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .map(|pools| pools.0.clone())
            .unwrap_or_default())
    }

    fn vendors(&self, org: &OrgId) -> Result<Vec<AssignmentCandidate>, DispatchRepositoryError> {
        let guard = self.state.lock().expect("directory mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .map(|pools| pools.1.clone())
            .unwrap_or_default())
    }
}

pub(crate) fn default_assignment_config() -> AssignmentConfig {
    AssignmentConfig::default()
}

pub(crate) fn demo_org() -> OrgId {
    OrgId::new("org-fixzit-demo").expect("demo org id is non-empty")
}

fn demo_metrics(order_count: u32, defect_rate: f64, rating: f64) -> PerformanceMetrics {
    PerformanceMetrics {
        order_count,
        cancel_rate: 1.5,
        defect_rate,
        on_time_ship_rate: 96.0,
        customer_rating: rating,
    }
}

fn demo_listing(
    id: &str,
    seller: &str,
    fsin: &str,
    sku: &str,
    price: f64,
    metrics: PerformanceMetrics,
    now: DateTime<Utc>,
) -> Listing {
    Listing {
        id: ListingId(id.to_string()),
        seller_id: SellerId(seller.to_string()),
        fsin: Fsin(fsin.to_string()),
        sku: sku.to_string(),
        title: format!("18V Cordless Drill ({sku})"),
        price,
        quantity: 25,
        fulfillment: FulfillmentMethod::Fbm,
        condition: ListingCondition::New,
        status: ListingStatus::Active,
        buy_box_eligible: true,
        metrics,
        updated_at: now,
    }
}

/// Seed a small competitive marketplace for the demo and `reprice` commands.
pub(crate) fn seed_demo_marketplace(repository: &InMemoryMarketplace, org: &OrgId) {
    let now = Utc::now();

    let rule = RepricerRule {
        enabled: true,
        min_price: 90.0,
        max_price: 120.0,
        target_position: TargetPosition::Win,
        undercut: 0.5,
        protect_margin: true,
    };
    repository.insert_seller(
        org,
        Seller {
            id: SellerId("s-gulf-tools".to_string()),
            name: "Gulf Tools Trading".to_string(),
            health: SellerHealth::Excellent,
            auto_repricer: Some(AutoRepricerSettings {
                enabled: true,
                listing_rules: BTreeMap::new(),
                fsin_rules: BTreeMap::new(),
                default_rule: Some(rule),
            }),
        },
    );
    repository.insert_seller(
        org,
        Seller {
            id: SellerId("s-riyadh-hw".to_string()),
            name: "Riyadh Hardware Co".to_string(),
            health: SellerHealth::Good,
            auto_repricer: None,
        },
    );

    repository.insert_listing(
        org,
        demo_listing(
            "l-gulf-drill",
            "s-gulf-tools",
            "FSN-DRILL-18V",
            "GT-DRL-18V",
            100.0,
            demo_metrics(180, 3.0, 4.7),
            now,
        ),
    );
    repository.insert_listing(
        org,
        demo_listing(
            "l-riyadh-drill",
            "s-riyadh-hw",
            "FSN-DRILL-18V",
            "RH-DRL-18V",
            85.0,
            demo_metrics(60, 6.0, 4.2),
            now,
        ),
    );
    repository.set_daily_orders(org, &ListingId("l-gulf-drill".to_string()), 2.4);
}

fn demo_technician(id: &str, name: &str, skills: &[&str], rating: f64) -> AssignmentCandidate {
    AssignmentCandidate {
        id: CandidateId(id.to_string()),
        name: name.to_string(),
        kind: CandidateKind::Technician,
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        rating,
        availability: Availability::Available,
        current_workload: 0,
        max_workload: Some(6),
        property_ids: vec!["prop-olaya-tower".to_string()],
        last_assigned_at: None,
    }
}

/// Seed an open HVAC work order and a small technician bench for the demo.
pub(crate) fn seed_demo_dispatch(
    work_orders: &InMemoryWorkOrders,
    directory: &InMemoryDirectory,
    org: &OrgId,
) {
    work_orders.insert(
        org,
        WorkOrder {
            id: WorkOrderId("wo-1001".to_string()),
            title: "AC not cooling in unit 12A".to_string(),
            category: "hvac".to_string(),
            subcategory: Some("split-unit".to_string()),
            work_type: Some("repair".to_string()),
            priority: WorkOrderPriority::High,
            property_id: Some("prop-olaya-tower".to_string()),
            scheduled: None,
            status: WorkOrderStatus::Open,
            assignment: Assignment::default(),
            created_at: Utc::now(),
        },
    );

    directory.add_technician(
        org,
        demo_technician(
            "t-khalid",
            "Khalid A.",
            &["hvac", "split-unit", "repair"],
            4.6,
        ),
    );
    directory.add_technician(
        org,
        demo_technician("t-noura", "Noura S.", &["plumbing", "repair"], 4.9),
    );
    directory.add_vendor(
        org,
        AssignmentCandidate {
            kind: CandidateKind::Vendor,
            ..demo_technician("v-coolserve", "CoolServe Maintenance LLC", &["hvac"], 4.1)
        },
    );
}
