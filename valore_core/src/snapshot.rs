//! Snapshots: derived, wholesale-replaced value records.
//!
//! A stored snapshot is always consistent with its own [`RawSeries`]: the
//! builders here take a series, summarize it, score it and return a complete
//! value. Nothing edits a snapshot field-by-field afterwards.

use crate::agents::AgentMetrics;
use crate::feed::FeedItem;
use crate::model::{Individual, Organization};
use crate::observation::{RawInputs, RawSeries};
use crate::scoring::{score_individual, score_organization, IndividualScores, OrganizationScores};
use serde::{Deserialize, Serialize};

/// Organization-level snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralSnapshot {
    pub organization_id: String,

    #[serde(flatten)]
    pub scores: OrganizationScores,

    pub raw_inputs: RawInputs,

    pub raw_series: RawSeries,
}

impl BehavioralSnapshot {
    /// Summarizes and scores `raw_series` for `organization`.
    pub fn build(organization: &Organization, raw_series: RawSeries) -> Self {
        let raw_inputs = RawInputs::from_series(&raw_series);
        let scores = score_organization(&raw_inputs, organization.metrics.baseline_valuation);
        Self {
            organization_id: organization.id.clone(),
            scores,
            raw_inputs,
            raw_series,
        }
    }
}

/// Individual-level snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualSnapshot {
    pub individual_id: String,
    pub organization_id: String,
    pub name: String,
    pub position: String,
    pub archetype: String,

    #[serde(flatten)]
    pub scores: IndividualScores,

    pub agent_metrics: AgentMetrics,

    /// Most recent first
    pub feed_items: Vec<FeedItem>,

    pub raw_inputs: RawInputs,

    pub raw_series: RawSeries,
}

impl IndividualSnapshot {
    /// Summarizes, scores and derives agent metrics for `raw_series`.
    ///
    /// `valuation_baseline` is the individual's memoized baseline. The feed
    /// is attached afterwards with [`IndividualSnapshot::with_feed`] since
    /// its content depends on the metrics computed here.
    pub fn build(
        individual: &Individual,
        parent: &OrganizationScores,
        valuation_baseline: f64,
        raw_series: RawSeries,
    ) -> Self {
        let raw_inputs = RawInputs::from_series(&raw_series);
        let scores = score_individual(&raw_inputs, &individual.traits, parent, valuation_baseline);
        let agent_metrics = AgentMetrics::derive(&raw_inputs, &individual.traits, parent);
        Self {
            individual_id: individual.id.clone(),
            organization_id: individual.organization_id.clone(),
            name: individual.name.clone(),
            position: individual.position.clone(),
            archetype: individual.archetype.clone(),
            scores,
            agent_metrics,
            feed_items: Vec::new(),
            raw_inputs,
            raw_series,
        }
    }

    pub fn with_feed(mut self, feed_items: Vec<FeedItem>) -> Self {
        self.feed_items = feed_items;
        self
    }
}
