use chrono::{DateTime, Utc};

use super::config::{AssignmentConfig, LogisticWeights, ScoringMode};
use super::domain::{AssignmentCandidate, CandidateKind, WorkOrder};

/// Round-robin bonus ceiling, in hours-since-last-assignment points.
pub(crate) const ROUND_ROBIN_CAP: f64 = 24.0;

/// Flat bonus for the pool the config prefers.
pub(crate) const PREFERENCE_BONUS: f64 = 10.0;

const RATING_SCALE: f64 = 5.0;

/// Normalized inputs shared by both scoring modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CandidateSignals {
    pub(crate) skill_ratio: f64,
    pub(crate) headroom: f64,
    pub(crate) rating_ratio: f64,
    pub(crate) hours_since_last: f64,
    pub(crate) property_match: bool,
    pub(crate) available: bool,
}

pub(crate) fn signals_for(
    work_order: &WorkOrder,
    candidate: &AssignmentCandidate,
    config: &AssignmentConfig,
    now: DateTime<Utc>,
) -> CandidateSignals {
    let tokens = work_order.skill_tokens();
    let skills = candidate.normalized_skills();
    let skill_ratio = if tokens.is_empty() {
        1.0
    } else {
        let matched = tokens.iter().filter(|token| skills.contains(*token)).count();
        matched as f64 / tokens.len() as f64
    };

    let max_workload = candidate
        .max_workload
        .unwrap_or(config.default_max_workload)
        .max(1);
    let headroom =
        (1.0 - candidate.current_workload as f64 / max_workload as f64).clamp(0.0, 1.0);

    let rating_ratio = (candidate.rating / RATING_SCALE).clamp(0.0, 1.0);

    let hours_since_last = candidate
        .last_assigned_at
        .map(|last| ((now - last).num_minutes() as f64 / 60.0).clamp(0.0, ROUND_ROBIN_CAP))
        .unwrap_or(ROUND_ROBIN_CAP);

    let property_match = match (&work_order.property_id, candidate.property_ids.is_empty()) {
        (Some(property), false) => candidate.property_ids.iter().any(|id| id == property),
        _ => false,
    };

    CandidateSignals {
        skill_ratio,
        headroom,
        rating_ratio,
        hours_since_last,
        property_match,
        available: candidate.is_available(),
    }
}

pub(crate) fn score_candidate(
    signals: &CandidateSignals,
    kind: CandidateKind,
    config: &AssignmentConfig,
) -> f64 {
    match config.mode {
        ScoringMode::Heuristic => heuristic_score(signals, kind, config),
        ScoringMode::Logistic => logistic_score(signals, &config.logistic),
    }
}

fn heuristic_score(
    signals: &CandidateSignals,
    kind: CandidateKind,
    config: &AssignmentConfig,
) -> f64 {
    let mut score = signals.skill_ratio * config.skill_match_weight * 100.0
        + signals.headroom * config.workload_weight * 100.0;

    if config.consider_rating {
        score += signals.rating_ratio * config.rating_weight * 100.0;
    }
    if config.round_robin {
        score += signals.hours_since_last.min(ROUND_ROBIN_CAP);
    }

    match kind {
        CandidateKind::Technician if config.prefer_internal => score += PREFERENCE_BONUS,
        CandidateKind::Vendor if config.prefer_vendors => score += PREFERENCE_BONUS,
        _ => {}
    }

    score
}

fn logistic_score(signals: &CandidateSignals, weights: &LogisticWeights) -> f64 {
    let logit = weights.bias
        + weights.skill * signals.skill_ratio
        + weights.workload * signals.headroom
        + weights.rating * signals.rating_ratio
        + weights.property * binary_feature(signals.property_match)
        + weights.availability * binary_feature(signals.available);

    100.0 / (1.0 + (-logit).exp())
}

fn binary_feature(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}
