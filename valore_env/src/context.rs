//! Core environment context trait for the VALORE engine.

use async_trait::async_trait;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The engine's only window onto time.
///
/// # Implementations
///
/// - **Production**: [`WallClock`](crate::WallClock) - wraps `SystemTime::now()`
///   and `tokio::time::sleep`
/// - **Simulation**: [`VirtualClock`](crate::VirtualClock) - a manually
///   advanced clock anchored at a fixed epoch
///
/// # Determinism
///
/// Feed items carry timestamps. Under a virtual clock those timestamps depend
/// only on how far the driver has advanced the clock, so two engines built
/// from the same seed produce identical feeds.
#[async_trait]
pub trait ValoreContext: Send + Sync + 'static {
    /// Returns the monotonic time elapsed since the context was created.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time used for record timestamps.
    fn system_time(&self) -> SystemTime;

    /// Suspends the caller for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances the virtual clock and returns immediately
    async fn sleep(&self, duration: Duration);

    /// Returns the context's seed (0 when not seeded).
    fn seed(&self) -> u64;

    /// Seconds since the Unix epoch according to [`system_time`](Self::system_time).
    fn unix_secs(&self) -> i64 {
        match self.system_time().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs() as i64,
            Err(before) => -(before.duration().as_secs() as i64),
        }
    }
}
