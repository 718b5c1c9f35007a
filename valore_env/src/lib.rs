//! VALORE Environment Abstraction Layer
//!
//! This crate isolates everything the synthetic engine needs from the outside
//! world so the same engine code runs against real time in a service and
//! against a virtual clock in tests and simulations.
//!
//! # Core Concept
//!
//! The engine never reads the system clock or the process environment
//! directly:
//! - **Time** comes from a [`ValoreContext`] (`system_time()`, `sleep()`)
//! - **Randomness** is derived by the engine from the context's 64-bit seed
//! - **Configuration** is read once into [`Settings`]
//!
//! With a [`VirtualClock`] and a fixed seed, every generated record
//! (including feed timestamps) is reproducible from the seed alone.
//!
//! # Example
//!
//! ```ignore
//! use valore_env::{Settings, ValoreContext, VirtualClock};
//!
//! let settings = Settings::from_env()?;
//! let clock = VirtualClock::shared(settings.synthetic_seed.unwrap_or(42));
//! clock.sleep(Duration::from_secs(5)).await; // returns immediately
//! ```

mod config;
mod context;
mod error;
mod virtual_clock;
mod wall_clock;

pub use config::{DataMode, Settings, DEFAULT_REGISTRY_CAPACITY};
pub use context::ValoreContext;
pub use error::EnvError;
pub use virtual_clock::VirtualClock;
pub use wall_clock::WallClock;
