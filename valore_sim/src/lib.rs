//! VALORE Simulation Harness
//!
//! Runs the synthetic engine under controlled time so its invariants can be
//! checked seed after seed, and drives the live stream a transport would
//! forward to a dashboard.
//!
//! # Core Principle
//!
//! Every engine built here gets a [`VirtualClock`](valore_env::VirtualClock):
//! - **Time** only moves when the runner or the stream advances it
//! - **Randomness** comes from the engine's seed, or a stream derived from it
//!
//! A failing `(scenario, seed)` pair therefore replays exactly.
//!
//! # Usage
//!
//! ```ignore
//! use valore_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).with_ticks(30).run(ScenarioId::RangeBands);
//! assert!(result.passed);
//! ```

mod error;
mod exporter;
mod runner;
pub mod scenarios;
mod stream;

pub use error::SimError;
pub use exporter::RunExport;
pub use runner::{RunMetrics, ScenarioResult, ScenarioRunner};
pub use stream::{
    StreamConfig, StreamDriver, StreamMessage, StreamSummary, UpdateMessage, UpdatePayload,
    MAX_INTERVAL_SCALE, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS, STREAM_FEED_CAP,
};
