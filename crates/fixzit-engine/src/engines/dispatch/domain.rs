use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for maintenance work orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkOrderId(pub String);

/// Identifier shared by technicians and vendors in the candidate directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderPriority {
    Low,
    Medium,
    High,
    Emergency,
}

impl WorkOrderPriority {
    pub const fn label(self) -> &'static str {
        match self {
            WorkOrderPriority::Low => "low",
            WorkOrderPriority::Medium => "medium",
            WorkOrderPriority::High => "high",
            WorkOrderPriority::Emergency => "emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Open,
    Assigned,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    /// Terminal orders no longer count toward a candidate's workload.
    pub const fn is_terminal(self) -> bool {
        matches!(self, WorkOrderStatus::Completed | WorkOrderStatus::Cancelled)
    }
}

/// Minute-offset window within a day, half-open (`start <= t < end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_minute: u16,
    pub end_minute: u16,
}

/// A concrete visit window requested on the work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSlot {
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

/// Who a work order is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Assignee {
    Technician(CandidateId),
    Vendor(CandidateId),
    Team(String),
}

/// Assignment block on the work-order document. The transition is one-way:
/// once `assigned_to` is set it is never overwritten by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Assignee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
}

/// A maintenance task raised against a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    pub title: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    pub priority: WorkOrderPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<ScheduledSlot>,
    pub status: WorkOrderStatus,
    #[serde(default)]
    pub assignment: Assignment,
    pub created_at: DateTime<Utc>,
}

impl WorkOrder {
    pub fn is_assigned(&self) -> bool {
        self.assignment.assigned_to.is_some()
    }

    /// Lowercased skill tokens a candidate is matched against.
    pub fn skill_tokens(&self) -> Vec<String> {
        [
            Some(self.category.as_str()),
            self.subcategory.as_deref(),
            self.work_type.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Technician,
    Vendor,
}

impl CandidateKind {
    pub const fn label(self) -> &'static str {
        match self {
            CandidateKind::Technician => "technician",
            CandidateKind::Vendor => "vendor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable,
    OnLeave,
}

/// Ephemeral scoring view of one technician or vendor; never persisted, only
/// the chosen candidate's id is written back to the work order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentCandidate {
    pub id: CandidateId,
    pub name: String,
    pub kind: CandidateKind,
    pub skills: Vec<String>,
    pub rating: f64,
    pub availability: Availability,
    #[serde(default)]
    pub current_workload: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workload: Option<u32>,
    #[serde(default)]
    pub property_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_assigned_at: Option<DateTime<Utc>>,
}

impl AssignmentCandidate {
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn normalized_skills(&self) -> HashSet<String> {
        self.skills
            .iter()
            .map(|skill| skill.trim().to_ascii_lowercase())
            .filter(|skill| !skill.is_empty())
            .collect()
    }
}
