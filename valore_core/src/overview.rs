//! Dashboard overview: a nested, read-only payload assembled from an engine.

use crate::agents::AgentMetrics;
use crate::engine::Engine;
use crate::feed::FeedItem;
use crate::model::{Individual, Organization, Scenario, ValidationMetrics};
use crate::observation::{RawInputs, RawSeries};
use crate::scoring::{IndividualScores, OrganizationScores};
use serde::{Deserialize, Serialize};

/// Daily samples kept per organization.
pub const ORGANIZATION_SAMPLE_DAYS: usize = 7;
/// Daily samples kept per individual.
pub const INDIVIDUAL_SAMPLE_DAYS: usize = 5;
pub const MAX_SCENARIOS: usize = 3;
pub const MAX_INDIVIDUALS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub seed: u64,

    /// Unix seconds per the engine's context
    pub generated_at: i64,

    pub validation_metrics: ValidationMetrics,

    pub organizations: Vec<OrganizationOverview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationOverview {
    pub organization: Organization,
    pub scores: OrganizationScores,
    pub raw_inputs: RawInputs,

    /// First days of each daily series, full monthly and churn series
    pub samples: RawSeries,

    pub scenarios: Vec<Scenario>,

    /// Highest valuation first
    pub individuals: Vec<IndividualOverview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualOverview {
    pub individual: Individual,
    pub scores: IndividualScores,
    pub raw_inputs: RawInputs,
    pub samples: RawSeries,
    pub agent_metrics: AgentMetrics,
    pub feed_items: Vec<FeedItem>,
}

/// Keeps the first `days` of every daily window.
fn sample(series: &RawSeries, days: usize) -> RawSeries {
    fn head<T: Copy>(values: &[T], days: usize) -> Vec<T> {
        values.iter().take(days).copied().collect()
    }
    RawSeries {
        sentiment_daily: head(&series.sentiment_daily, days),
        interactions_daily: head(&series.interactions_daily, days),
        content_similarity_daily: head(&series.content_similarity_daily, days),
        share_rate_daily: head(&series.share_rate_daily, days),
        retention_monthly: series.retention_monthly.clone(),
        churn_events: series.churn_events.clone(),
        schedule_volatility_daily: head(&series.schedule_volatility_daily, days),
    }
}

/// Assembles the overview. Organizations without a snapshot are skipped.
pub fn build_overview(engine: &Engine) -> Overview {
    let organizations = engine
        .organizations()
        .into_iter()
        .filter_map(|organization| {
            let snapshot = engine.behavioral_snapshot(&organization.id)?;

            let mut scenarios = engine.scenarios(Some(&organization.id));
            scenarios.truncate(MAX_SCENARIOS);

            let mut snapshots = engine.individual_snapshots(Some(&organization.id));
            snapshots.sort_by(|a, b| {
                b.scores
                    .valuation_projection
                    .total_cmp(&a.scores.valuation_projection)
            });
            let individuals = snapshots
                .into_iter()
                .take(MAX_INDIVIDUALS)
                .filter_map(|s| {
                    let individual = engine.individual(&s.individual_id)?;
                    Some(IndividualOverview {
                        individual,
                        scores: s.scores,
                        raw_inputs: s.raw_inputs,
                        samples: sample(&s.raw_series, INDIVIDUAL_SAMPLE_DAYS),
                        agent_metrics: s.agent_metrics,
                        feed_items: s.feed_items,
                    })
                })
                .collect();

            Some(OrganizationOverview {
                scores: snapshot.scores,
                raw_inputs: snapshot.raw_inputs,
                samples: sample(&snapshot.raw_series, ORGANIZATION_SAMPLE_DAYS),
                organization,
                scenarios,
                individuals,
            })
        })
        .collect();

    Overview {
        seed: engine.seed(),
        generated_at: engine.context().unix_secs(),
        validation_metrics: engine.validation_metrics(),
        organizations,
    }
}
