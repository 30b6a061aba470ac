use serde::{Deserialize, Serialize};

/// Which scoring formula ranks the candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Weighted sum of skill, workload headroom, and rating signals.
    Heuristic,
    /// Linear combination of the same signals squashed through a logistic.
    Logistic,
}

/// Daily window inside which auto-assignment is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    /// First allowed hour, inclusive.
    pub start_hour: u8,
    /// First disallowed hour.
    pub end_hour: u8,
    pub include_weekends: bool,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 18,
            include_weekends: false,
        }
    }
}

/// Weights for the logistic scoring mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticWeights {
    pub bias: f64,
    pub skill: f64,
    pub workload: f64,
    pub rating: f64,
    pub property: f64,
    pub availability: f64,
}

impl Default for LogisticWeights {
    fn default() -> Self {
        Self {
            bias: -2.0,
            skill: 3.0,
            workload: 1.5,
            rating: 1.0,
            property: 0.75,
            availability: 0.5,
        }
    }
}

/// Tuning knobs for the auto-assignment engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentConfig {
    pub mode: ScoringMode,
    /// Pull internal technicians into the pool (with a flat bonus).
    pub prefer_internal: bool,
    /// Pull approved vendors into the pool (with a flat bonus).
    pub prefer_vendors: bool,
    pub skill_match_weight: f64,
    pub workload_weight: f64,
    pub rating_weight: f64,
    pub consider_rating: bool,
    /// Reward candidates who have waited longest since their last job.
    pub round_robin: bool,
    /// Workload ceiling for candidates without one on their profile.
    pub default_max_workload: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_hours: Option<BusinessHours>,
    #[serde(default)]
    pub logistic: LogisticWeights,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::Heuristic,
            prefer_internal: true,
            prefer_vendors: false,
            skill_match_weight: 0.5,
            workload_weight: 0.3,
            rating_weight: 0.2,
            consider_rating: true,
            round_robin: true,
            default_max_workload: 5,
            business_hours: None,
            logistic: LogisticWeights::default(),
        }
    }
}

impl AssignmentConfig {
    /// Neither preference flag set means both pools are considered.
    pub(crate) fn pools(&self) -> (bool, bool) {
        if !self.prefer_internal && !self.prefer_vendors {
            (true, true)
        } else {
            (self.prefer_internal, self.prefer_vendors)
        }
    }
}
