//! Live stream driver: the timeline first, then periodic advancement.
//!
//! The engine attaches advisory delays to everything it produces; this
//! driver is the transport-side loop that honors them by sleeping on the
//! engine's own context. Under a [`VirtualClock`](valore_env::VirtualClock)
//! the sleeps return immediately, so a full stream replays instantly.

use crate::error::SimError;

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use valore_core::observation::RawInputs;
use valore_core::rng::SeedStream;
use valore_core::scoring::OrganizationScores;
use valore_core::{Engine, EngineError, IndividualUpdate, OrganizationDiff, TimelineEvent};

/// Bounds of the random pause between advances, in seconds.
pub const MIN_INTERVAL_SECS: f64 = 4.0;
pub const MAX_INTERVAL_SECS: f64 = 7.0;

/// Largest accepted delay multiplier.
pub const MAX_INTERVAL_SCALE: f64 = 3_600.0;

/// Feed items forwarded per individual in an update.
pub const STREAM_FEED_CAP: usize = 6;

/// Salt for the interval stream, independent of the engine's own draws.
const INTERVAL_SALT: u64 = 0x7374_7265_616d;

/// Stream configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub organization_id: String,

    /// Updates to emit before stopping (`None` streams until an error)
    pub updates: Option<u64>,

    /// Multiplier applied to every delay
    pub interval_scale: f64,

    /// Explicit starting valuation for the consensus event
    pub valuation_anchor: Option<f64>,
}

impl StreamConfig {
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            updates: None,
            interval_scale: 1.0,
            valuation_anchor: None,
        }
    }

    pub fn with_updates(mut self, updates: u64) -> Self {
        self.updates = Some(updates);
        self
    }

    /// Sets the delay multiplier, clamped to `[0, MAX_INTERVAL_SCALE]`.
    /// NaN keeps real-time pacing.
    pub fn with_interval_scale(mut self, scale: f64) -> Self {
        self.interval_scale = if scale.is_nan() {
            1.0
        } else {
            scale.clamp(0.0, MAX_INTERVAL_SCALE)
        };
        self
    }

    pub fn with_valuation_anchor(mut self, anchor: f64) -> Self {
        self.valuation_anchor = Some(anchor);
        self
    }
}

/// Body of an `update` message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatePayload {
    pub organization_id: String,
    pub timestamp: i64,

    #[serde(flatten)]
    pub scores: OrganizationScores,

    pub raw_inputs: RawInputs,
    pub diff: OrganizationDiff,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub individuals: Vec<IndividualUpdate>,
}

/// `{"type": "update", "payload": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub payload: UpdatePayload,
}

/// Everything the driver emits, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamMessage {
    Timeline(TimelineEvent),
    Update(UpdateMessage),
}

/// Counts from a finished stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    pub timeline_events: u64,
    pub updates: u64,
}

/// Drives one organization's stream against an engine.
pub struct StreamDriver<'a> {
    engine: &'a mut Engine,
    config: StreamConfig,
    rng: SeedStream,
}

impl<'a> StreamDriver<'a> {
    pub fn new(engine: &'a mut Engine, config: StreamConfig) -> Self {
        let rng = SeedStream::derived(engine.seed(), INTERVAL_SALT);
        Self { engine, config, rng }
    }

    /// Runs the stream, handing each message to `emit`.
    ///
    /// Fails with [`EngineError::UnknownOrganization`] before emitting
    /// anything if the organization does not exist. An error from `emit`
    /// stops the stream and is returned as-is.
    pub async fn run<F>(mut self, mut emit: F) -> Result<StreamSummary, SimError>
    where
        F: FnMut(StreamMessage) -> Result<(), SimError>,
    {
        let organization_id = self.config.organization_id.clone();
        if self.engine.organization(&organization_id).is_none() {
            return Err(EngineError::UnknownOrganization(organization_id).into());
        }

        let context = self.engine.context();
        let mut summary = StreamSummary::default();

        let timeline = self
            .engine
            .agent_timeline(&organization_id, self.config.valuation_anchor);
        info!(
            "Streaming {} ({} timeline events)",
            organization_id,
            timeline.len()
        );
        for event in timeline {
            context.sleep(self.scaled(event.delay_secs)).await;
            emit(StreamMessage::Timeline(event))?;
            summary.timeline_events += 1;
        }

        while self.config.updates.map_or(true, |limit| summary.updates < limit) {
            let pause = self.rng.uniform(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS);
            context.sleep(self.scaled(pause)).await;

            let bundle = self.engine.advance(&organization_id)?;
            debug!(
                "update {} for {}: {} individuals",
                summary.updates,
                organization_id,
                bundle.individuals.len()
            );

            let individuals = bundle
                .individuals
                .into_iter()
                .map(|mut update| {
                    update.snapshot.feed_items.truncate(STREAM_FEED_CAP);
                    update
                })
                .collect();
            let payload = UpdatePayload {
                organization_id: bundle.organization_id,
                timestamp: context.unix_secs(),
                scores: bundle.snapshot.scores,
                raw_inputs: bundle.snapshot.raw_inputs,
                diff: bundle.diff,
                individuals,
            };
            emit(StreamMessage::Update(UpdateMessage { kind: "update", payload }))?;
            summary.updates += 1;
        }

        Ok(summary)
    }

    fn scaled(&self, secs: f64) -> Duration {
        Duration::try_from_secs_f64(secs * self.config.interval_scale).unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valore_core::EventKind;
    use valore_env::{ValoreContext, VirtualClock};

    fn engine(seed: u64) -> (Engine, std::sync::Arc<VirtualClock>) {
        let clock = VirtualClock::shared(seed);
        (Engine::with_context(seed, clock.clone()), clock)
    }

    async fn collect(
        engine: &mut Engine,
        config: StreamConfig,
    ) -> (Result<StreamSummary, SimError>, Vec<StreamMessage>) {
        let mut messages = Vec::new();
        let result = StreamDriver::new(engine, config)
            .run(|message| {
                messages.push(message);
                Ok(())
            })
            .await;
        (result, messages)
    }

    #[tokio::test]
    async fn test_timeline_then_updates() {
        let (mut engine, _) = engine(42);
        let config = StreamConfig::new("kansas_mbb").with_updates(3);
        let (result, messages) = collect(&mut engine, config).await;

        let summary = result.unwrap();
        assert_eq!(summary.timeline_events, 6);
        assert_eq!(summary.updates, 3);
        assert_eq!(messages.len(), 9);

        assert!(matches!(
            &messages[0],
            StreamMessage::Timeline(e) if e.kind == EventKind::Evidence
        ));
        assert!(messages[..6].iter().all(|m| matches!(m, StreamMessage::Timeline(_))));
        for message in &messages[6..] {
            let StreamMessage::Update(update) = message else {
                panic!("expected update, got {:?}", message);
            };
            assert_eq!(update.kind, "update");
            assert_eq!(update.payload.organization_id, "kansas_mbb");
            assert!(update.payload.individuals.len() <= 2);
            for individual in &update.payload.individuals {
                assert!(individual.snapshot.feed_items.len() <= STREAM_FEED_CAP);
            }
        }
    }

    #[tokio::test]
    async fn test_delays_advance_virtual_clock() {
        let (mut engine, clock) = engine(7);
        let start = clock.now();
        let config = StreamConfig::new("auburn_mbb").with_updates(2);
        let (result, _) = collect(&mut engine, config).await;
        result.unwrap();

        // Two updates alone need at least 2 * 4 s.
        assert!(clock.now() - start >= Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_zero_scale_skips_waiting() {
        let (mut engine, clock) = engine(7);
        let start = clock.now();
        let config = StreamConfig::new("auburn_mbb")
            .with_updates(2)
            .with_interval_scale(0.0);
        let (result, _) = collect(&mut engine, config).await;
        result.unwrap();
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_interval_scale_is_bounded() {
        let scale = |value: f64| StreamConfig::new("x").with_interval_scale(value).interval_scale;
        assert_eq!(scale(f64::INFINITY), MAX_INTERVAL_SCALE);
        assert_eq!(scale(1e300), MAX_INTERVAL_SCALE);
        assert_eq!(scale(-2.0), 0.0);
        assert_eq!(scale(f64::NAN), 1.0);
        assert_eq!(scale(0.5), 0.5);
    }

    #[tokio::test]
    async fn test_infinite_scale_streams_without_overflow() {
        let (mut engine, clock) = engine(13);
        let start = clock.now();
        let config = StreamConfig::new("houston_mbb")
            .with_updates(1)
            .with_interval_scale(f64::INFINITY);
        let (result, messages) = collect(&mut engine, config).await;

        assert_eq!(result.unwrap().updates, 1);
        assert_eq!(messages.len(), 7);
        assert!(clock.now() - start >= Duration::from_secs_f64(MIN_INTERVAL_SECS * MAX_INTERVAL_SCALE));
    }

    #[tokio::test]
    async fn test_unknown_organization_emits_nothing() {
        let (mut engine, _) = engine(1);
        let (result, messages) = collect(&mut engine, StreamConfig::new("nope")).await;

        assert!(matches!(
            result,
            Err(SimError::Engine(EngineError::UnknownOrganization(ref id))) if id == "nope"
        ));
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_emit_error_stops_stream() {
        let (mut engine, _) = engine(3);
        let mut seen = 0;
        let result = StreamDriver::new(&mut engine, StreamConfig::new("gonzaga_mbb"))
            .run(|_| {
                seen += 1;
                if seen == 2 {
                    Err(SimError::SinkClosed)
                } else {
                    Ok(())
                }
            })
            .await;

        assert!(matches!(result, Err(SimError::SinkClosed)));
        assert_eq!(seen, 2);
    }

    #[tokio::test]
    async fn test_streams_replay_identically() {
        let (mut a, _) = engine(11);
        let (mut b, _) = engine(11);
        let config = StreamConfig::new("stanford_wbb").with_updates(4);
        let (_, left) = collect(&mut a, config.clone()).await;
        let (_, right) = collect(&mut b, config).await;

        assert_eq!(
            serde_json::to_string(&left).unwrap(),
            serde_json::to_string(&right).unwrap()
        );
    }

    #[test]
    fn test_update_message_shape() {
        let (mut engine, _) = engine(5);
        let bundle = engine.advance("villanova_mbb").unwrap();
        let message = StreamMessage::Update(UpdateMessage {
            kind: "update",
            payload: UpdatePayload {
                organization_id: bundle.organization_id,
                timestamp: 0,
                scores: bundle.snapshot.scores,
                raw_inputs: bundle.snapshot.raw_inputs,
                diff: bundle.diff,
                individuals: Vec::new(),
            },
        });

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "update");
        assert!(json["payload"]["resonance_score"].is_number());
        assert!(json["payload"]["diff"]["fairness_index"].is_number());
        assert!(json["payload"].get("individuals").is_none());
    }
}
