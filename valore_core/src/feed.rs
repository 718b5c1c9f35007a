//! Narrative feed synthesis.
//!
//! Each individual keeps a rolling history of at most [`FEED_HISTORY_CAP`]
//! items, most recent first. The first snapshot gets one templated item per
//! major agent group; every later advancement may prepend a single "signal"
//! item when the largest agent metric change clears [`SIGNAL_THRESHOLD`].

use crate::agents::AgentMetrics;
use crate::baseline::BaselineCatalog;
use crate::model::Individual;
use crate::rng::SeedStream;
use crate::scoring::{round_places, UNIT_BAND};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored history cap per individual.
pub const FEED_HISTORY_CAP: usize = 10;

/// Items visible through read APIs.
pub const FEED_VISIBLE_CAP: usize = 8;

/// Minimum |delta| for a signal item.
pub const SIGNAL_THRESHOLD: f64 = 0.015;

/// Feed item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedCategory {
    Social,
    News,
    Performance,
    Community,
    Compliance,
    Signal,
}

impl FeedCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedCategory::Social => "social",
            FeedCategory::News => "news",
            FeedCategory::Performance => "performance",
            FeedCategory::Community => "community",
            FeedCategory::Compliance => "compliance",
            FeedCategory::Signal => "signal",
        }
    }
}

impl fmt::Display for FeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short narrative record in an individual's activity history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// `{individual}-{category}-{timestamp}-{nonce}`
    pub id: String,

    pub category: FeedCategory,

    /// Platform, outlet, tracker or agent that produced the item
    pub source: String,

    pub headline: String,

    pub snippet: String,

    /// [0, 1], rounded to 3 places
    pub sentiment: f64,

    /// [0, 1], rounded to 3 places
    pub impact_score: f64,

    /// Unix seconds
    pub timestamp: i64,

    pub tags: Vec<String>,

    pub individual_id: String,

    pub individual_name: String,
}

/// Item content before the id nonce is drawn.
struct Draft {
    category: FeedCategory,
    source: String,
    headline: String,
    snippet: String,
    sentiment: f64,
    impact: f64,
    timestamp: i64,
    tags: [&'static str; 2],
}

impl Draft {
    fn finish(self, rng: &mut SeedStream, individual_id: &str, individual_name: &str) -> FeedItem {
        let nonce = rng.int_inclusive(100, 999);
        FeedItem {
            id: format!("{}-{}-{}-{}", individual_id, self.category, self.timestamp, nonce),
            category: self.category,
            source: self.source,
            headline: self.headline,
            snippet: self.snippet,
            sentiment: round_places(UNIT_BAND.clamp(self.sentiment), 3),
            impact_score: round_places(UNIT_BAND.clamp(self.impact), 3),
            timestamp: self.timestamp,
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            individual_id: individual_id.to_string(),
            individual_name: individual_name.to_string(),
        }
    }
}

fn pick_or(rng: &mut SeedStream, pool: &[String], fallback: &str) -> String {
    rng.pick(pool).cloned().unwrap_or_else(|| fallback.to_string())
}

/// Builds the first feed: social, news, performance, community, compliance.
///
/// Draw order per item is flavor pick (if any), timestamp offset, id nonce.
pub fn initial_feed(
    rng: &mut SeedStream,
    individual: &Individual,
    metrics: &AgentMetrics,
    catalog: &BaselineCatalog,
    now: i64,
) -> Vec<FeedItem> {
    let first = individual.first_name();
    let mut items = Vec::with_capacity(5);

    let platform = pick_or(rng, &catalog.social_platforms, "Social");
    let engagement = metrics.social_media.engagement_authenticity;
    let draft = Draft {
        category: FeedCategory::Social,
        headline: format!("{} clip pushes {} into trending NIL lane", platform, first),
        snippet: format!(
            "{} fans amplified a behind-the-scenes moment; engagement authenticity spikes to {:.2} as supporters share team-first messaging.",
            platform, engagement
        ),
        source: platform,
        sentiment: metrics.social_media.sentiment_intensity,
        impact: (0.4 + engagement * 0.5).min(1.0),
        timestamp: now - rng.int_inclusive(1_800, 7_200),
        tags: ["fan-reaction", "social"],
    };
    items.push(draft.finish(rng, &individual.id, &individual.name));

    let outlet = pick_or(rng, &catalog.news_outlets, "Newswire");
    let alignment = metrics.market_intelligence.comp_deal_alignment;
    let draft = Draft {
        category: FeedCategory::News,
        headline: format!("{}: Collectives circle {} after showcase weekend", outlet, individual.name),
        snippet: format!(
            "Insiders cite NIL comps aligning at {:.2} with national guard campaigns. Brand demand rising as locker room leadership narrative solidifies.",
            alignment
        ),
        source: outlet,
        sentiment: 0.55 + alignment * 0.3,
        impact: (0.45 + alignment * 0.4).min(1.0),
        timestamp: now - rng.int_inclusive(3_600, 14_400),
        tags: ["market", "collective"],
    };
    items.push(draft.finish(rng, &individual.id, &individual.name));

    let tracker = pick_or(rng, &catalog.performance_trackers, "Tracker");
    let efficiency = metrics.athletic_performance.stat_efficiency;
    let draft = Draft {
        category: FeedCategory::Performance,
        headline: format!(
            "{} grades {} top {} percentile in clutch possessions",
            tracker,
            first,
            (efficiency * 100.0) as i64
        ),
        snippet: format!(
            "Adjusted efficiency at {:.2} with contextual bump for late-game runs. Coaching staff experimenting with lineup that maximizes spacing and NIL storytelling.",
            efficiency
        ),
        source: tracker,
        sentiment: 0.5 + efficiency * 0.35,
        impact: (0.4 + efficiency * 0.45).min(1.0),
        timestamp: now - rng.int_inclusive(900, 5_400),
        tags: ["performance", "analytics"],
    };
    items.push(draft.finish(rng, &individual.id, &individual.name));

    let trust = metrics.psychology.trust_velocity;
    let draft = Draft {
        category: FeedCategory::Community,
        source: "Booster Slack".to_string(),
        headline: format!("Community AMA boosts trust velocity for {}", first),
        snippet: format!(
            "Local collective hosted a mental health roundtable. Fan trust velocity now {:.2}; alumni push for expanded mentorship activations.",
            trust
        ),
        sentiment: 0.55 + trust * 0.3,
        impact: (0.35 + trust * 0.5).min(1.0),
        timestamp: now - rng.int_inclusive(1_200, 9_600),
        tags: ["community", "psychology"],
    };
    items.push(draft.finish(rng, &individual.id, &individual.name));

    let audit = metrics.risk_compliance.audit_risk;
    let draft = Draft {
        category: FeedCategory::Compliance,
        source: "Disclosure Portal".to_string(),
        headline: format!("Disclosure update processed for {} brand collaboration", first),
        snippet: format!(
            "Compliance audit risk steady at {:.2}; RACA recommends maintaining weekly disclosure cadence to protect collective partnerships.",
            audit
        ),
        sentiment: 0.5 - audit * 0.2,
        impact: (0.3 + (0.3 - audit) * 0.4).max(0.1),
        timestamp: now - rng.int_inclusive(600, 4_200),
        tags: ["compliance", "ethics"],
    };
    items.push(draft.finish(rng, &individual.id, &individual.name));

    items
}

/// Builds a signal item from the largest agent metric change, if it clears
/// [`SIGNAL_THRESHOLD`].
pub fn signal_item(
    rng: &mut SeedStream,
    individual: &Individual,
    current: &AgentMetrics,
    deltas: &AgentMetrics,
    now: i64,
) -> Option<FeedItem> {
    let shift = deltas.largest_shift()?;
    if shift.value.abs() <= SIGNAL_THRESHOLD {
        return None;
    }

    let value = current.value(shift.group, shift.metric).unwrap_or(0.5);
    tracing::trace!(
        individual = %individual.id,
        group = %shift.group,
        metric = shift.metric,
        delta = shift.value,
        "feed signal"
    );

    let draft = Draft {
        category: FeedCategory::Signal,
        source: shift.group.title().to_string(),
        headline: format!(
            "{} registers {} shift",
            individual.name,
            shift.metric.replace('_', " ")
        ),
        snippet: format!(
            "Agent {} flags metric change of {:+.3}. Current value {:.2} signals evolving opportunity for collectives.",
            shift.group.title(),
            shift.value,
            value
        ),
        sentiment: 0.5 + value * 0.2,
        impact: 0.4 + (shift.value.abs() * 4.0).min(0.4),
        timestamp: now,
        tags: ["agent-signal", shift.group.key()],
    };
    Some(draft.finish(rng, &individual.id, &individual.name))
}

/// Prepends `signal` (if any) and truncates to [`FEED_HISTORY_CAP`].
pub fn push_signal(history: &[FeedItem], signal: Option<FeedItem>) -> Vec<FeedItem> {
    let mut items = Vec::with_capacity(FEED_HISTORY_CAP);
    items.extend(signal);
    items.extend(history.iter().cloned());
    items.truncate(FEED_HISTORY_CAP);
    items
}

/// The externally visible slice of a history.
pub fn visible(history: &[FeedItem]) -> Vec<FeedItem> {
    history.iter().take(FEED_VISIBLE_CAP).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::RawInputs;
    use crate::scoring::score_organization;

    fn fixture() -> (BaselineCatalog, Individual, AgentMetrics) {
        let catalog = BaselineCatalog::standard();
        let individual = catalog.individuals[0].clone();
        let inputs = RawInputs {
            sentiment_mean: 0.8,
            sentiment_volatility: 0.04,
            interactions_weekly: 70_000.0,
            interactions_baseline: 69_000.0,
            content_similarity: 0.77,
            share_rate: 0.22,
            retention_rate: 0.85,
            churn_shock: 0.06,
            stability_index: 0.98,
            schedule_volatility: 0.11,
        };
        let parent = score_organization(&inputs, 2_000_000.0);
        let metrics = AgentMetrics::derive(&inputs, &individual.traits, &parent);
        (catalog, individual, metrics)
    }

    #[test]
    fn test_initial_feed_shape() {
        let (catalog, individual, metrics) = fixture();
        let mut rng = SeedStream::new(42);
        let now = 1_704_067_200;
        let items = initial_feed(&mut rng, &individual, &metrics, &catalog, now);

        let categories: Vec<FeedCategory> = items.iter().map(|i| i.category).collect();
        assert_eq!(
            categories,
            vec![
                FeedCategory::Social,
                FeedCategory::News,
                FeedCategory::Performance,
                FeedCategory::Community,
                FeedCategory::Compliance,
            ]
        );
        for item in &items {
            assert!(item.timestamp < now);
            assert!(UNIT_BAND.contains(item.sentiment));
            assert!(UNIT_BAND.contains(item.impact_score));
            assert!(item.id.starts_with(&format!("{}-{}-", individual.id, item.category)));
            assert_eq!(item.individual_id, individual.id);
        }
        assert!(catalog.social_platforms.contains(&items[0].source));
    }

    #[test]
    fn test_no_signal_below_threshold() {
        let (_, individual, metrics) = fixture();
        let mut deltas = metrics.delta(&metrics);
        deltas.psychology.trust_velocity = SIGNAL_THRESHOLD;
        let mut rng = SeedStream::new(1);
        assert!(signal_item(&mut rng, &individual, &metrics, &deltas, 0).is_none());
    }

    #[test]
    fn test_signal_references_largest_shift() {
        let (_, individual, metrics) = fixture();
        let mut deltas = metrics.delta(&metrics);
        deltas.risk_compliance.audit_risk = -0.05;
        deltas.social_media.virality_potential = 0.02;
        let mut rng = SeedStream::new(1);
        let item = signal_item(&mut rng, &individual, &metrics, &deltas, 1_000).unwrap();

        assert_eq!(item.category, FeedCategory::Signal);
        assert_eq!(item.source, "Risk Compliance");
        assert!(item.headline.ends_with("registers audit risk shift"));
        assert!(item.snippet.contains("-0.050"));
        assert_eq!(item.tags, vec!["agent-signal", "risk_compliance"]);
        // 0.4 + min(0.4, 0.2)
        assert_eq!(item.impact_score, 0.6);
        assert_eq!(item.timestamp, 1_000);
    }

    #[test]
    fn test_history_is_capped() {
        let (catalog, individual, metrics) = fixture();
        let mut rng = SeedStream::new(9);
        let mut history = initial_feed(&mut rng, &individual, &metrics, &catalog, 10_000);
        let mut deltas = metrics.delta(&metrics);
        deltas.ethics.bias_index = 0.1;

        for tick in 0..20 {
            let signal = signal_item(&mut rng, &individual, &metrics, &deltas, 10_000 + tick);
            history = push_signal(&history, signal);
            assert!(history.len() <= FEED_HISTORY_CAP);
        }
        assert_eq!(history.len(), FEED_HISTORY_CAP);
        assert_eq!(history[0].timestamp, 10_019);
        assert_eq!(visible(&history).len(), FEED_VISIBLE_CAP);
    }
}
