//! Work-order dispatch: picks the best available technician or vendor for a
//! maintenance task and writes the assignment exactly once.

pub mod config;
pub mod domain;
pub mod repository;
pub mod router;
pub mod schedule;
mod scoring;

#[cfg(test)]
mod tests;

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use config::{AssignmentConfig, BusinessHours, LogisticWeights, ScoringMode};
pub use domain::{
    Assignee, Assignment, AssignmentCandidate, Availability, CandidateId, CandidateKind,
    ScheduledSlot, TimeSlot, WorkOrder, WorkOrderId, WorkOrderPriority, WorkOrderStatus,
};
pub use repository::{CandidateDirectory, RepositoryError, WorkOrderRepository};
pub use router::dispatch_router;
pub use schedule::{slots_overlap, within_business_hours};

use crate::tenancy::OrgId;

/// Selects and persists the best candidate for an unassigned work order.
pub struct AutoAssignmentEngine<W, D> {
    work_orders: Arc<W>,
    directory: Arc<D>,
    config: AssignmentConfig,
}

/// One candidate after scoring, kept for ordering and reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate_id: CandidateId,
    pub kind: CandidateKind,
    pub score: f64,
    pub current_workload: u32,
    pub rating: f64,
}

/// Result of a successful auto-assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentOutcome {
    pub work_order_id: WorkOrderId,
    pub assigned_to: Assignee,
    pub score: f64,
    /// Pool size after availability and schedule filtering.
    pub evaluated: usize,
}

/// Error raised by the assignment engine.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("work order {0:?} not found for tenant")]
    WorkOrderNotFound(WorkOrderId),
    #[error("work order {0:?} is already assigned")]
    AlreadyAssigned(WorkOrderId),
    #[error("auto-assignment is outside configured business hours")]
    OutsideBusinessHours,
    #[error("no eligible candidates for work order {0:?}")]
    NoEligibleCandidates(WorkOrderId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl<W, D> AutoAssignmentEngine<W, D>
where
    W: WorkOrderRepository,
    D: CandidateDirectory,
{
    pub fn new(work_orders: Arc<W>, directory: Arc<D>, config: AssignmentConfig) -> Self {
        Self {
            work_orders,
            directory,
            config,
        }
    }

    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    pub(crate) fn work_orders(&self) -> &W {
        &self.work_orders
    }

    pub fn auto_assign(
        &self,
        org: &OrgId,
        id: &WorkOrderId,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        self.auto_assign_at(org, id, Utc::now())
    }

    /// Assign the best candidate as of `now`.
    ///
    /// The business-hours gate vetoes the whole call before anything is
    /// read; an already-assigned order is rejected rather than overwritten.
    pub fn auto_assign_at(
        &self,
        org: &OrgId,
        id: &WorkOrderId,
        now: DateTime<Utc>,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        if let Some(hours) = &self.config.business_hours {
            if !within_business_hours(hours, now) {
                return Err(AssignmentError::OutsideBusinessHours);
            }
        }

        let work_order = self
            .work_orders
            .work_order(org, id)?
            .ok_or_else(|| AssignmentError::WorkOrderNotFound(id.clone()))?;
        if work_order.is_assigned() {
            return Err(AssignmentError::AlreadyAssigned(id.clone()));
        }

        let pool = self.eligible_pool(org, &work_order)?;
        let evaluated = pool.len();
        let best = self
            .rank(&work_order, pool, now)
            .into_iter()
            .next()
            .ok_or_else(|| AssignmentError::NoEligibleCandidates(id.clone()))?;

        let assigned_to = match best.kind {
            CandidateKind::Technician => Assignee::Technician(best.candidate_id.clone()),
            CandidateKind::Vendor => Assignee::Vendor(best.candidate_id.clone()),
        };
        self.work_orders
            .assign(org, id, assigned_to.clone(), now)?;

        Ok(AssignmentOutcome {
            work_order_id: id.clone(),
            assigned_to,
            score: best.score,
            evaluated,
        })
    }

    /// Score the eligible pool without mutating anything, best first.
    pub fn rank_candidates_at(
        &self,
        org: &OrgId,
        id: &WorkOrderId,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredCandidate>, AssignmentError> {
        let work_order = self
            .work_orders
            .work_order(org, id)?
            .ok_or_else(|| AssignmentError::WorkOrderNotFound(id.clone()))?;

        let pool = self.eligible_pool(org, &work_order)?;
        Ok(self.rank(&work_order, pool, now))
    }

    fn eligible_pool(
        &self,
        org: &OrgId,
        work_order: &WorkOrder,
    ) -> Result<Vec<AssignmentCandidate>, AssignmentError> {
        let (want_internal, want_vendors) = self.config.pools();

        let mut pool = Vec::new();
        if want_internal {
            pool.extend(self.directory.technicians(org)?);
        }
        if want_vendors {
            pool.extend(self.directory.vendors(org)?);
        }

        for candidate in &mut pool {
            candidate.current_workload = self.work_orders.open_workload(org, &candidate.id)?;
        }
        pool.retain(|candidate| candidate.is_available());

        if let Some(scheduled) = &work_order.scheduled {
            let mut free = Vec::with_capacity(pool.len());
            for candidate in pool {
                let booked = self
                    .work_orders
                    .booked_slots(org, &candidate.id, scheduled.date)?;
                if !booked.iter().any(|slot| slots_overlap(slot, &scheduled.slot)) {
                    free.push(candidate);
                }
            }
            pool = free;
        }

        Ok(pool)
    }

    fn rank(
        &self,
        work_order: &WorkOrder,
        pool: Vec<AssignmentCandidate>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = pool
            .into_iter()
            .map(|candidate| {
                let signals = scoring::signals_for(work_order, &candidate, &self.config, now);
                let score = scoring::score_candidate(&signals, candidate.kind, &self.config);
                ScoredCandidate {
                    candidate_id: candidate.id,
                    kind: candidate.kind,
                    score,
                    current_workload: candidate.current_workload,
                    rating: candidate.rating,
                }
            })
            .collect();

        scored.sort_by(compare_candidates);
        scored
    }
}

/// Descending score, ascending workload, descending rating.
fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then(a.current_workload.cmp(&b.current_workload))
        .then(b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
}
