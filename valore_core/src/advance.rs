//! Advancement results: field-by-field diffs and dependent ranking.
//!
//! Every diff field is exactly `new - old` of the corresponding top-level
//! snapshot field. Dependent individuals are all advanced as candidates,
//! ranked by [`IndividualDiff::impact`], and only the top
//! [`DEPENDENT_UPDATE_LIMIT`] are kept.

use crate::agents::AgentMetrics;
use crate::snapshot::{BehavioralSnapshot, IndividualSnapshot};
use serde::{Deserialize, Serialize};

/// Maximum individuals committed per organization advancement.
pub const DEPENDENT_UPDATE_LIMIT: usize = 2;

/// Organization snapshot deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrganizationDiff {
    pub resonance_score: f64,
    pub authenticity_score: f64,
    pub social_identity_index: f64,
    pub fairness_index: f64,
    pub compliance_risk: f64,
    pub valuation_projection: f64,
    pub sponsor_velocity: f64,
    pub sentiment_mean: f64,
    pub interactions_weekly: f64,
    pub share_rate: f64,
    pub retention_rate: f64,
}

impl OrganizationDiff {
    pub fn between(previous: &BehavioralSnapshot, current: &BehavioralSnapshot) -> Self {
        let (old, new) = (&previous.scores, &current.scores);
        let (old_raw, new_raw) = (&previous.raw_inputs, &current.raw_inputs);
        Self {
            resonance_score: new.resonance_score - old.resonance_score,
            authenticity_score: new.authenticity_score - old.authenticity_score,
            social_identity_index: new.social_identity_index - old.social_identity_index,
            fairness_index: new.fairness_index - old.fairness_index,
            compliance_risk: new.compliance_risk - old.compliance_risk,
            valuation_projection: new.valuation_projection - old.valuation_projection,
            sponsor_velocity: new.sponsor_velocity - old.sponsor_velocity,
            sentiment_mean: new_raw.sentiment_mean - old_raw.sentiment_mean,
            interactions_weekly: new_raw.interactions_weekly - old_raw.interactions_weekly,
            share_rate: new_raw.share_rate - old_raw.share_rate,
            retention_rate: new_raw.retention_rate - old_raw.retention_rate,
        }
    }
}

/// Individual snapshot deltas, including every agent metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndividualDiff {
    pub resonance_score: f64,
    pub authenticity_score: f64,
    pub fairness_index: f64,
    pub compliance_risk: f64,
    pub valuation_projection: f64,
    pub engagement_velocity: f64,
    pub sentiment_mean: f64,
    pub interactions_weekly: f64,
    pub share_rate: f64,

    /// Field-wise agent metric deltas
    pub agent_metrics: AgentMetrics,
}

impl IndividualDiff {
    pub fn between(previous: &IndividualSnapshot, current: &IndividualSnapshot) -> Self {
        let (old, new) = (&previous.scores, &current.scores);
        let (old_raw, new_raw) = (&previous.raw_inputs, &current.raw_inputs);
        Self {
            resonance_score: new.resonance_score - old.resonance_score,
            authenticity_score: new.authenticity_score - old.authenticity_score,
            fairness_index: new.fairness_index - old.fairness_index,
            compliance_risk: new.compliance_risk - old.compliance_risk,
            valuation_projection: new.valuation_projection - old.valuation_projection,
            engagement_velocity: new.engagement_velocity - old.engagement_velocity,
            sentiment_mean: new_raw.sentiment_mean - old_raw.sentiment_mean,
            interactions_weekly: new_raw.interactions_weekly - old_raw.interactions_weekly,
            share_rate: new_raw.share_rate - old_raw.share_rate,
            agent_metrics: current.agent_metrics.delta(&previous.agent_metrics),
        }
    }

    /// Weighted magnitude used to rank dependents.
    pub fn impact(&self) -> f64 {
        let agents = &self.agent_metrics;
        self.resonance_score.abs() * 3.0
            + self.authenticity_score.abs() * 2.0
            + self.valuation_projection.abs() / 50_000.0
            + self.engagement_velocity.abs() * 2.5
            + agents.social_media.engagement_authenticity.abs() * 2.5
            + agents.market_intelligence.comp_deal_alignment.abs() * 2.0
            + agents.risk_compliance.audit_risk.abs() * 1.5
    }
}

/// One advanced individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualUpdate {
    pub snapshot: IndividualSnapshot,
    pub diff: IndividualDiff,
    pub impact: f64,
}

impl IndividualUpdate {
    pub fn new(snapshot: IndividualSnapshot, diff: IndividualDiff) -> Self {
        let impact = diff.impact();
        Self { snapshot, diff, impact }
    }
}

/// Result of advancing one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBundle {
    pub organization_id: String,
    pub snapshot: BehavioralSnapshot,
    pub diff: OrganizationDiff,

    /// At most [`DEPENDENT_UPDATE_LIMIT`], highest impact first
    pub individuals: Vec<IndividualUpdate>,
}

/// Keeps the highest-impact candidates. The sort is stable, so equal
/// impacts keep roster order.
pub fn select_dependents(mut candidates: Vec<IndividualUpdate>) -> Vec<IndividualUpdate> {
    candidates.sort_by(|a, b| b.impact.total_cmp(&a.impact));
    candidates.truncate(DEPENDENT_UPDATE_LIMIT);
    candidates
}
