use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::engines::dispatch::config::AssignmentConfig;
use crate::engines::dispatch::domain::{
    Assignee, Assignment, AssignmentCandidate, Availability, CandidateId, CandidateKind,
    ScheduledSlot, TimeSlot, WorkOrder, WorkOrderId, WorkOrderPriority, WorkOrderStatus,
};
use crate::engines::dispatch::repository::{
    CandidateDirectory, RepositoryError, WorkOrderRepository,
};
use crate::engines::dispatch::AutoAssignmentEngine;
use crate::tenancy::OrgId;

pub(super) fn org() -> OrgId {
    OrgId::new("org-fixzit-demo").expect("valid org id")
}

pub(super) fn other_org() -> OrgId {
    OrgId::new("org-other-tenant").expect("valid org id")
}

/// Sunday 09:00 — a working-hours timestamp in the deployment region.
pub(super) fn run_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 28, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn work_order(id: &str) -> WorkOrder {
    WorkOrder {
        id: WorkOrderId(id.to_string()),
        title: format!("Work order {id}"),
        category: "hvac".to_string(),
        subcategory: Some("split-unit".to_string()),
        work_type: Some("repair".to_string()),
        priority: WorkOrderPriority::High,
        property_id: Some("prop-olaya-tower".to_string()),
        scheduled: None,
        status: WorkOrderStatus::Open,
        assignment: Assignment::default(),
        created_at: run_at(),
    }
}

pub(super) fn technician(id: &str) -> AssignmentCandidate {
    AssignmentCandidate {
        id: CandidateId(id.to_string()),
        name: format!("Technician {id}"),
        kind: CandidateKind::Technician,
        skills: vec![
            "hvac".to_string(),
            "split-unit".to_string(),
            "repair".to_string(),
        ],
        rating: 4.0,
        availability: Availability::Available,
        current_workload: 0,
        max_workload: Some(5),
        property_ids: Vec::new(),
        last_assigned_at: None,
    }
}

pub(super) fn vendor(id: &str) -> AssignmentCandidate {
    AssignmentCandidate {
        kind: CandidateKind::Vendor,
        name: format!("Vendor {id}"),
        ..technician(id)
    }
}

pub(super) fn slot(start: u16, end: u16) -> TimeSlot {
    TimeSlot {
        start_minute: start,
        end_minute: end,
    }
}

pub(super) fn scheduled(date: NaiveDate, start: u16, end: u16) -> ScheduledSlot {
    ScheduledSlot {
        date,
        slot: slot(start, end),
    }
}

#[derive(Default)]
struct TenantOrders {
    orders: BTreeMap<String, WorkOrder>,
    workload: HashMap<String, u32>,
    booked: HashMap<(String, NaiveDate), Vec<TimeSlot>>,
}

/// In-memory tenant-partitioned work-order store.
#[derive(Default)]
pub(super) struct MemoryWorkOrders {
    state: Mutex<HashMap<String, TenantOrders>>,
}

impl MemoryWorkOrders {
    pub(super) fn insert(&self, org: &OrgId, work_order: WorkOrder) {
        let mut guard = self.state.lock().expect("work order mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .orders
            .insert(work_order.id.0.clone(), work_order);
    }

    pub(super) fn set_workload(&self, org: &OrgId, candidate: &CandidateId, count: u32) {
        let mut guard = self.state.lock().expect("work order mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .workload
            .insert(candidate.0.clone(), count);
    }

    pub(super) fn book_slot(
        &self,
        org: &OrgId,
        candidate: &CandidateId,
        date: NaiveDate,
        slot: TimeSlot,
    ) {
        let mut guard = self.state.lock().expect("work order mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .booked
            .entry((candidate.0.clone(), date))
            .or_default()
            .push(slot);
    }

    pub(super) fn get(&self, org: &OrgId, id: &WorkOrderId) -> Option<WorkOrder> {
        let guard = self.state.lock().expect("work order mutex poisoned");
        guard
            .get(org.as_str())
            .and_then(|tenant| tenant.orders.get(&id.0))
            .cloned()
    }
}

impl WorkOrderRepository for MemoryWorkOrders {
    fn work_order(
        &self,
        org: &OrgId,
        id: &WorkOrderId,
    ) -> Result<Option<WorkOrder>, RepositoryError> {
        let guard = self.state.lock().expect("work order mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .and_then(|tenant| tenant.orders.get(&id.0))
            .cloned())
    }

    fn assign(
        &self,
        org: &OrgId,
        id: &WorkOrderId,
        assignee: Assignee,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("work order mutex poisoned");
        let order = guard
            .get_mut(org.as_str())
            .and_then(|tenant| tenant.orders.get_mut(&id.0))
            .ok_or(RepositoryError::NotFound)?;
        if order.assignment.assigned_to.is_some() {
            return Err(RepositoryError::Conflict);
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
    ) -> Result<u32, RepositoryError> {
        let guard = self.state.lock().expect("work order mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .and_then(|tenant| tenant.workload.get(&candidate.0))
            .copied()
            .unwrap_or(0))
    }

    fn booked_slots(
        &self,
        org: &OrgId,
        candidate: &CandidateId,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, RepositoryError> {
        let guard = self.state.lock().expect("work order mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .and_then(|tenant| tenant.booked.get(&(candidate.0.clone(), date)))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    state: Mutex<HashMap<String, (Vec<AssignmentCandidate>, Vec<AssignmentCandidate>)>>,
}

impl MemoryDirectory {
    pub(super) fn add_technician(&self, org: &OrgId, candidate: AssignmentCandidate) {
        let mut guard = self.state.lock().expect("directory mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .0
            .push(candidate);
    }

    pub(super) fn add_vendor(&self, org: &OrgId, candidate: AssignmentCandidate) {
        let mut guard = self.state.lock().expect("directory mutex poisoned");
        guard
            .entry(org.as_str().to_string())
            .or_default()
            .1
            .push(candidate);
    }
}

impl CandidateDirectory for MemoryDirectory {
    fn technicians(&self, org: &OrgId) -> Result<Vec<AssignmentCandidate>, RepositoryError> {
        let guard = self.state.lock().expect("directory mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .map(|pools| pools.0.clone())
            .unwrap_or_default())
    }

    fn vendors(&self, org: &OrgId) -> Result<Vec<AssignmentCandidate>, RepositoryError> {
        let guard = self.state.lock().expect("directory mutex poisoned");
        Ok(guard
            .get(org.as_str())
            .map(|pools| pools.1.clone())
            .unwrap_or_default())
    }
}

pub(super) type MemoryEngine = AutoAssignmentEngine<MemoryWorkOrders, MemoryDirectory>;

pub(super) fn build_engine(
    config: AssignmentConfig,
) -> (MemoryEngine, Arc<MemoryWorkOrders>, Arc<MemoryDirectory>) {
    let work_orders = Arc::new(MemoryWorkOrders::default());
    let directory = Arc::new(MemoryDirectory::default());
    let engine = AutoAssignmentEngine::new(work_orders.clone(), directory.clone(), config);
    (engine, work_orders, directory)
}
