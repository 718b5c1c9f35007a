//! VALORE Core - Deterministic Synthetic Data & Behavioral Scoring Engine
//!
//! Fabricates a reproducible "digital twin" dataset for sports programs
//! (organizations) and their athletes (individuals), and evolves it over time
//! to simulate live analytics updates:
//! 1. **Generation**: seeded jitter of fixed baseline records plus 30-day
//!    observation series per entity
//! 2. **Scoring**: clamped component/composite scores, seven agent metric
//!    groups and a narrative feed per individual
//! 3. **Advancement**: bounded random-walk updates with exact field diffs,
//!    cascaded to the highest-impact individuals
//!
//! Everything downstream of an [`Engine`] seed is reproducible: the engine
//! draws from a single ChaCha8 stream in a fixed call order.

pub mod advance;
pub mod agents;
pub mod baseline;
pub mod engine;
pub mod entities;
pub mod error;
pub mod feed;
pub mod model;
pub mod observation;
pub mod overview;
pub mod registry;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod timeline;

// Re-export key types for convenience
pub use advance::{IndividualDiff, IndividualUpdate, OrganizationDiff, UpdateBundle};
pub use agents::{AgentGroup, AgentMetrics};
pub use baseline::BaselineCatalog;
pub use engine::Engine;
pub use error::EngineError;
pub use feed::{FeedCategory, FeedItem};
pub use model::{Individual, Organization, Scenario, TraitVector, ValidationMetrics};
pub use observation::{RawInputs, RawSeries};
pub use overview::{build_overview, Overview};
pub use registry::EngineRegistry;
pub use scoring::{IndividualScores, OrganizationScores};
pub use snapshot::{BehavioralSnapshot, IndividualSnapshot};
pub use timeline::{EventKind, TimelineEvent};
