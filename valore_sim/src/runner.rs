//! Scenario runner - checks engine invariants over advancing state.

use crate::scenarios::ScenarioId;

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use valore_core::feed::{FEED_HISTORY_CAP, FEED_VISIBLE_CAP};
use valore_core::observation::{CHURN_WINDOW, DAILY_WINDOW, MONTHLY_WINDOW};
use valore_core::rng::SeedStream;
use valore_core::scoring::{
    COMPLIANCE_BAND, ENGAGEMENT_VELOCITY_BAND, FAIRNESS_BAND, SOCIAL_IDENTITY_BAND,
    SPONSOR_VELOCITY_BAND, UNIT_BAND, VALUATION_STEP,
};
use valore_core::timeline::{build_timeline, EventPayload, FAIRNESS_ALERT_THRESHOLD};
use valore_core::{
    BehavioralSnapshot, Engine, EngineError, EventKind, IndividualSnapshot, RawSeries,
    UpdateBundle,
};
use valore_env::VirtualClock;

/// Virtual seconds between advances.
const TICK_SECS: u64 = 5;

/// Salt for the stream used to force timelines in the fairness gate.
const GATE_SALT: u64 = 0x6761_7465;

/// Results from running a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total advances executed
    pub total_ticks: u64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: RunMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunMetrics {
    /// Organization advances
    pub advances: u64,

    /// Individual snapshots committed
    pub individual_updates: u64,

    /// Signal items seen at the head of committed feeds
    pub feed_signals: u64,

    /// Timeline events generated
    pub timeline_events: u64,

    /// Bias alerts among them
    pub bias_alerts: u64,

    /// Largest absolute organization valuation move
    pub max_valuation_delta: f64,
}

impl RunMetrics {
    fn record(&mut self, bundle: &UpdateBundle) {
        self.advances += 1;
        self.individual_updates += bundle.individuals.len() as u64;
        self.feed_signals += bundle
            .individuals
            .iter()
            .filter(|u| {
                u.snapshot
                    .feed_items
                    .first()
                    .map_or(false, |item| item.category == valore_core::FeedCategory::Signal)
            })
            .count() as u64;
        self.max_valuation_delta = self
            .max_valuation_delta
            .max(bundle.diff.valuation_projection.abs());
    }
}

type Check = Result<(), String>;

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Check {
    if condition {
        Ok(())
    } else {
        Err(message())
    }
}

/// Runs invariant scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Number of advances per scenario
    ticks: u64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self { seed, ticks: 30 }
    }

    /// Sets the number of advances.
    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.ticks = ticks;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let mut metrics = RunMetrics::default();
        let outcome = match scenario {
            ScenarioId::Determinism => self.run_determinism(&mut metrics),
            ScenarioId::RangeBands => self.run_range_bands(&mut metrics),
            ScenarioId::ValuationQuantization => self.run_valuation_quantization(&mut metrics),
            ScenarioId::RollingWindow => self.run_rolling_window(&mut metrics),
            ScenarioId::DiffConsistency => self.run_diff_consistency(&mut metrics),
            ScenarioId::FeedCap => self.run_feed_cap(&mut metrics),
            ScenarioId::ReplayIsolation => self.run_replay_isolation(&mut metrics),
            ScenarioId::UnknownEntity => self.run_unknown_entity(&mut metrics),
            ScenarioId::FairnessGate => self.run_fairness_gate(&mut metrics),
        };

        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: outcome.is_ok(),
            total_ticks: metrics.advances,
            failure_reason: outcome.err(),
            metrics,
        }
    }

    /// Builds an engine on a virtual clock the runner controls.
    fn engine(&self) -> (Engine, Arc<VirtualClock>) {
        let clock = VirtualClock::shared(self.seed);
        (Engine::with_context(self.seed, clock.clone()), clock)
    }

    /// Advances organizations round-robin, calling `inspect` after each.
    fn drive<F>(&self, metrics: &mut RunMetrics, mut inspect: F) -> Check
    where
        F: FnMut(&Engine, &BehavioralSnapshot, &UpdateBundle) -> Check,
    {
        let (mut engine, clock) = self.engine();
        let ids: Vec<String> = engine.organizations().into_iter().map(|o| o.id).collect();
        if ids.is_empty() {
            return Ok(());
        }

        for tick in 0..self.ticks {
            let id = &ids[tick as usize % ids.len()];
            clock.advance_time(Duration::from_secs(TICK_SECS));

            let before = engine
                .behavioral_snapshot(id)
                .ok_or_else(|| format!("missing snapshot for {}", id))?;
            let bundle = engine.advance(id).map_err(|e| e.to_string())?;
            metrics.record(&bundle);
            inspect(&engine, &before, &bundle)
                .map_err(|reason| format!("tick {} ({}): {}", tick, id, reason))?;

            if tick % 10 == 0 {
                debug!(
                    "  tick={} | org={} | valuation_delta={:+.0}",
                    tick, id, bundle.diff.valuation_projection
                );
            }
        }
        Ok(())
    }

    /// INV-001: two engines, one seed, lockstep advances.
    fn run_determinism(&self, metrics: &mut RunMetrics) -> Check {
        let (mut a, clock_a) = self.engine();
        let (mut b, clock_b) = self.engine();

        ensure(a.organizations() == b.organizations(), || "organizations differ".into())?;
        ensure(a.individuals(None) == b.individuals(None), || "individuals differ".into())?;
        ensure(a.scenarios(None) == b.scenarios(None), || "scenarios differ".into())?;
        ensure(a.validation_metrics() == b.validation_metrics(), || {
            "validation metrics differ".into()
        })?;
        ensure(
            a.individual_snapshots(None) == b.individual_snapshots(None),
            || "first individual snapshots differ".into(),
        )?;

        let ids: Vec<String> = a.organizations().into_iter().map(|o| o.id).collect();
        for tick in 0..self.ticks {
            let Some(id) = ids.get(tick as usize % ids.len().max(1)) else {
                break;
            };
            clock_a.advance_time(Duration::from_secs(TICK_SECS));
            clock_b.advance_time(Duration::from_secs(TICK_SECS));
            let left = a.advance(id).map_err(|e| e.to_string())?;
            let right = b.advance(id).map_err(|e| e.to_string())?;
            metrics.record(&left);
            ensure(left == right, || format!("tick {}: bundles for {} differ", tick, id))?;
        }
        Ok(())
    }

    /// INV-002
    fn run_range_bands(&self, metrics: &mut RunMetrics) -> Check {
        self.drive(metrics, |engine, _, bundle| {
            check_organization_bands(&bundle.snapshot)?;
            for snapshot in engine.individual_snapshots(None) {
                check_individual_bands(&snapshot)?;
            }
            Ok(())
        })
    }

    /// INV-003
    fn run_valuation_quantization(&self, metrics: &mut RunMetrics) -> Check {
        self.drive(metrics, |engine, _, bundle| {
            check_quantized("organization", bundle.snapshot.scores.valuation_projection)?;
            for snapshot in engine.individual_snapshots(None) {
                check_quantized(&snapshot.individual_id, snapshot.scores.valuation_projection)?;
            }
            Ok(())
        })?;

        let (mut engine, _) = self.engine();
        for organization in engine.organizations() {
            for event in engine.agent_timeline(&organization.id, None) {
                metrics.timeline_events += 1;
                if let EventPayload::Consensus(consensus) = &event.payload {
                    check_quantized("consensus", consensus.valuation)?;
                }
            }
        }
        Ok(())
    }

    /// INV-004
    fn run_rolling_window(&self, metrics: &mut RunMetrics) -> Check {
        self.drive(metrics, |engine, _, bundle| {
            check_windows(&bundle.snapshot.raw_series)?;
            for snapshot in engine.individual_snapshots(None) {
                check_windows(&snapshot.raw_series)?;
            }
            Ok(())
        })
    }

    /// INV-005
    fn run_diff_consistency(&self, metrics: &mut RunMetrics) -> Check {
        let (mut engine, clock) = self.engine();
        let ids: Vec<String> = engine.organizations().into_iter().map(|o| o.id).collect();

        for tick in 0..self.ticks {
            let Some(id) = ids.get(tick as usize % ids.len().max(1)) else {
                break;
            };
            clock.advance_time(Duration::from_secs(TICK_SECS));
            let before = engine
                .behavioral_snapshot(id)
                .ok_or_else(|| format!("missing snapshot for {}", id))?;
            let individuals_before = engine.individual_snapshots(Some(id));
            let bundle = engine.advance(id).map_err(|e| e.to_string())?;
            metrics.record(&bundle);

            let (old, new, d) = (&before.scores, &bundle.snapshot.scores, &bundle.diff);
            let pairs = [
                ("resonance_score", d.resonance_score, new.resonance_score - old.resonance_score),
                (
                    "authenticity_score",
                    d.authenticity_score,
                    new.authenticity_score - old.authenticity_score,
                ),
                (
                    "social_identity_index",
                    d.social_identity_index,
                    new.social_identity_index - old.social_identity_index,
                ),
                ("fairness_index", d.fairness_index, new.fairness_index - old.fairness_index),
                ("compliance_risk", d.compliance_risk, new.compliance_risk - old.compliance_risk),
                (
                    "valuation_projection",
                    d.valuation_projection,
                    new.valuation_projection - old.valuation_projection,
                ),
                ("sponsor_velocity", d.sponsor_velocity, new.sponsor_velocity - old.sponsor_velocity),
                (
                    "sentiment_mean",
                    d.sentiment_mean,
                    bundle.snapshot.raw_inputs.sentiment_mean - before.raw_inputs.sentiment_mean,
                ),
                (
                    "interactions_weekly",
                    d.interactions_weekly,
                    bundle.snapshot.raw_inputs.interactions_weekly
                        - before.raw_inputs.interactions_weekly,
                ),
            ];
            for (field, diff, expected) in pairs {
                ensure(diff == expected, || {
                    format!("tick {}: {} diff {} != {}", tick, field, diff, expected)
                })?;
            }

            for update in &bundle.individuals {
                let previous = individuals_before
                    .iter()
                    .find(|s| s.individual_id == update.snapshot.individual_id)
                    .ok_or_else(|| format!("{} was not a dependent", update.snapshot.individual_id))?;
                let (old, new) = (&previous.scores, &update.snapshot.scores);
                ensure(
                    update.diff.valuation_projection
                        == new.valuation_projection - old.valuation_projection
                        && update.diff.resonance_score == new.resonance_score - old.resonance_score
                        && update.diff.engagement_velocity
                            == new.engagement_velocity - old.engagement_velocity,
                    || format!("tick {}: individual diff mismatch", tick),
                )?;
                let expected = update.snapshot.agent_metrics.delta(&previous.agent_metrics);
                ensure(update.diff.agent_metrics == expected, || {
                    format!("tick {}: agent metric diff mismatch", tick)
                })?;
            }
        }
        Ok(())
    }

    /// INV-006
    fn run_feed_cap(&self, metrics: &mut RunMetrics) -> Check {
        self.drive(metrics, |engine, _, bundle| {
            for update in &bundle.individuals {
                ensure(update.snapshot.feed_items.len() <= FEED_VISIBLE_CAP, || {
                    "bundle exposes too many feed items".into()
                })?;
            }
            for individual in engine.individuals(None) {
                let stored = engine.feed_history(&individual.id).unwrap_or_default();
                ensure(stored.len() <= FEED_HISTORY_CAP, || {
                    format!("{} stores {} feed items", individual.id, stored.len())
                })?;
                let exposed = engine
                    .individual_snapshot(&individual.id)
                    .map_or(0, |s| s.feed_items.len());
                ensure(exposed <= FEED_VISIBLE_CAP, || {
                    format!("{} exposes {} feed items", individual.id, exposed)
                })?;
            }
            Ok(())
        })
    }

    /// INV-007: a busy engine must not affect fresh ones with the same seed.
    fn run_replay_isolation(&self, metrics: &mut RunMetrics) -> Check {
        let (mut busy, clock) = self.engine();
        let ids: Vec<String> = busy.organizations().into_iter().map(|o| o.id).collect();
        let Some(target) = ids.first().cloned() else {
            return Ok(());
        };
        for _ in 0..self.ticks {
            clock.advance_time(Duration::from_secs(TICK_SECS));
            let bundle = busy.advance(&target).map_err(|e| e.to_string())?;
            metrics.record(&bundle);
        }

        let (mut first, _) = self.engine();
        let (mut second, _) = self.engine();
        let left = first.advance(&target).map_err(|e| e.to_string())?;
        let right = second.advance(&target).map_err(|e| e.to_string())?;
        let left = serde_json::to_string(&left.diff).map_err(|e| e.to_string())?;
        let right = serde_json::to_string(&right.diff).map_err(|e| e.to_string())?;
        ensure(left == right, || "replayed diffs are not byte-identical".into())
    }

    /// INV-008
    fn run_unknown_entity(&self, _metrics: &mut RunMetrics) -> Check {
        let (mut engine, _) = self.engine();
        let before = engine.individual_snapshots(None);
        let missing = "unknown_program";

        match engine.advance(missing) {
            Err(EngineError::UnknownOrganization(id)) if id == missing => {}
            Err(other) => return Err(format!("unexpected error: {}", other)),
            Ok(_) => return Err("advance on unknown id succeeded".into()),
        }
        ensure(engine.behavioral_snapshot(missing).is_none(), || {
            "snapshot for unknown id".into()
        })?;
        ensure(engine.individual_snapshot(missing).is_none(), || {
            "individual snapshot for unknown id".into()
        })?;
        ensure(engine.agent_timeline(missing, None).is_empty(), || {
            "timeline for unknown id".into()
        })?;
        ensure(engine.individual_snapshots(None) == before, || {
            "state changed after unknown id".into()
        })
    }

    /// INV-009: natural timelines plus forced low/high fairness.
    fn run_fairness_gate(&self, metrics: &mut RunMetrics) -> Check {
        let (mut engine, _) = self.engine();
        let mut rng = SeedStream::derived(self.seed, GATE_SALT);

        for organization in engine.organizations() {
            let Some(snapshot) = engine.behavioral_snapshot(&organization.id) else {
                continue;
            };
            let natural = engine.agent_timeline(&organization.id, None);
            check_gate(&natural, snapshot.scores.fairness_index, metrics)?;

            for forced in [0.9, FAIRNESS_ALERT_THRESHOLD - 0.001, 0.95, 0.99] {
                let mut adjusted = snapshot.clone();
                adjusted.scores.fairness_index = forced;
                let events = build_timeline(&mut rng, &adjusted, None);
                check_gate(&events, forced, metrics)?;
            }
        }
        Ok(())
    }
}

fn check_gate(
    events: &[valore_core::TimelineEvent],
    fairness: f64,
    metrics: &mut RunMetrics,
) -> Check {
    metrics.timeline_events += events.len() as u64;
    let alerts = events.iter().filter(|e| e.kind == EventKind::BiasAlert).count();
    let insights = events.iter().filter(|e| e.kind == EventKind::Insight).count();
    metrics.bias_alerts += alerts as u64;

    if fairness < FAIRNESS_ALERT_THRESHOLD {
        ensure(alerts == 1 && insights == 0, || {
            format!("fairness {:.3}: expected one bias_alert", fairness)
        })
    } else {
        ensure(alerts == 0 && insights == 1, || {
            format!("fairness {:.3}: expected one insight", fairness)
        })
    }
}

fn check_quantized(label: &str, valuation: f64) -> Check {
    ensure(valuation % VALUATION_STEP == 0.0, || {
        format!("{} valuation {} is not a multiple of {}", label, valuation, VALUATION_STEP)
    })
}

fn check_windows(series: &RawSeries) -> Check {
    let lengths = [
        ("sentiment_daily", series.sentiment_daily.len(), DAILY_WINDOW),
        ("interactions_daily", series.interactions_daily.len(), DAILY_WINDOW),
        ("content_similarity_daily", series.content_similarity_daily.len(), DAILY_WINDOW),
        ("share_rate_daily", series.share_rate_daily.len(), DAILY_WINDOW),
        ("retention_monthly", series.retention_monthly.len(), MONTHLY_WINDOW),
        ("churn_events", series.churn_events.len(), CHURN_WINDOW),
        ("schedule_volatility_daily", series.schedule_volatility_daily.len(), DAILY_WINDOW),
    ];
    for (name, actual, expected) in lengths {
        ensure(actual == expected, || format!("{} has {} entries, expected {}", name, actual, expected))?;
    }
    Ok(())
}

fn check_organization_bands(snapshot: &BehavioralSnapshot) -> Check {
    let s = &snapshot.scores;
    let checks = [
        ("resonance_score", UNIT_BAND.contains(s.resonance_score), s.resonance_score),
        ("authenticity_score", UNIT_BAND.contains(s.authenticity_score), s.authenticity_score),
        (
            "social_identity_index",
            SOCIAL_IDENTITY_BAND.contains(s.social_identity_index),
            s.social_identity_index,
        ),
        ("fairness_index", FAIRNESS_BAND.contains(s.fairness_index), s.fairness_index),
        ("compliance_risk", COMPLIANCE_BAND.contains(s.compliance_risk), s.compliance_risk),
        (
            "sponsor_velocity",
            SPONSOR_VELOCITY_BAND.contains(s.sponsor_velocity),
            s.sponsor_velocity,
        ),
    ];
    for (name, ok, value) in checks {
        ensure(ok, || format!("{} {} out of band for {}", name, value, snapshot.organization_id))?;
    }
    let components = s
        .resonance_components
        .as_vector()
        .iter()
        .chain(s.authenticity_components.as_vector().iter())
        .all(|v| UNIT_BAND.contains(*v));
    ensure(components, || format!("component out of [0, 1] for {}", snapshot.organization_id))
}

fn check_individual_bands(snapshot: &IndividualSnapshot) -> Check {
    let s = &snapshot.scores;
    let checks = [
        ("resonance_score", UNIT_BAND.contains(s.resonance_score), s.resonance_score),
        ("authenticity_score", UNIT_BAND.contains(s.authenticity_score), s.authenticity_score),
        ("fairness_index", FAIRNESS_BAND.contains(s.fairness_index), s.fairness_index),
        ("compliance_risk", COMPLIANCE_BAND.contains(s.compliance_risk), s.compliance_risk),
        (
            "engagement_velocity",
            ENGAGEMENT_VELOCITY_BAND.contains(s.engagement_velocity),
            s.engagement_velocity,
        ),
    ];
    for (name, ok, value) in checks {
        ensure(ok, || format!("{} {} out of band for {}", name, value, snapshot.individual_id))?;
    }
    if let Some(reading) = snapshot
        .agent_metrics
        .readings()
        .into_iter()
        .find(|r| !UNIT_BAND.contains(r.value))
    {
        return Err(format!(
            "{}.{} = {} out of [0, 1] for {}",
            reading.group, reading.metric, reading.value, snapshot.individual_id
        ));
    }
    Ok(())
}
