use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{Assignee, AssignmentCandidate, CandidateId, TimeSlot, WorkOrder, WorkOrderId};
use crate::tenancy::OrgId;

/// Storage abstraction for work orders so the assignment engine can be
/// exercised in isolation. Every call is scoped to one tenant.
pub trait WorkOrderRepository: Send + Sync {
    fn work_order(&self, org: &OrgId, id: &WorkOrderId)
        -> Result<Option<WorkOrder>, RepositoryError>;
    /// Write the assignment. Implementations must refuse to overwrite an
    /// existing assignee and report `Conflict` instead.
    fn assign(
        &self,
        org: &OrgId,
        id: &WorkOrderId,
        assignee: Assignee,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
    /// Count of non-terminal work orders currently assigned to a candidate.
    fn open_workload(&self, org: &OrgId, candidate: &CandidateId)
        -> Result<u32, RepositoryError>;
    /// Visit windows already booked for a candidate on a given date.
    fn booked_slots(
        &self,
        org: &OrgId,
        candidate: &CandidateId,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, RepositoryError>;
}

/// Directory of assignable people and companies for one tenant.
pub trait CandidateDirectory: Send + Sync {
    /// Active internal technicians.
    fn technicians(&self, org: &OrgId) -> Result<Vec<AssignmentCandidate>, RepositoryError>;
    /// Approved external vendors.
    fn vendors(&self, org: &OrgId) -> Result<Vec<AssignmentCandidate>, RepositoryError>;
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
