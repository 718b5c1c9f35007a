//! Virtual clock implementing ValoreContext for deterministic runs.

use crate::ValoreContext;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 2024-01-01 00:00:00 UTC
const VIRTUAL_EPOCH_SECS: u64 = 1_704_067_200;

/// Simulation context backed by a manually advanced clock.
///
/// - Virtual time starts at zero and maps onto a fixed epoch
/// - `sleep` advances virtual time instead of blocking
/// - Clones share the same clock
pub struct VirtualClock {
    /// Master seed this clock was created for
    seed: u64,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<AtomicU64>,

    /// Epoch offset (virtual time 0 maps to this wall-clock time)
    epoch: SystemTime,
}

impl VirtualClock {
    /// Creates a new VirtualClock for the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(AtomicU64::new(0)),
            epoch: UNIX_EPOCH + Duration::from_secs(VIRTUAL_EPOCH_SECS),
        }
    }

    /// Creates an Arc-wrapped clock for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        self.virtual_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Sets the virtual time to a specific value.
    pub fn set_time(&self, time_ns: u64) {
        self.virtual_time_ns.store(time_ns, Ordering::SeqCst);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        self.virtual_time_ns.load(Ordering::SeqCst)
    }
}

impl Clone for VirtualClock {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            epoch: self.epoch,
        }
    }
}

#[async_trait]
impl ValoreContext for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    fn system_time(&self) -> SystemTime {
        self.epoch + self.now()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance_time(duration);
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_time() {
        let clock = VirtualClock::new(42);
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance_time(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(1));

        clock.advance_time(Duration::from_millis(500));
        assert_eq!(clock.now(), Duration::from_millis(1500));
    }

    #[test]
    fn test_virtual_clock_epoch() {
        let clock = VirtualClock::new(7);
        assert_eq!(clock.unix_secs(), VIRTUAL_EPOCH_SECS as i64);

        clock.advance_time(Duration::from_secs(90));
        assert_eq!(clock.unix_secs(), VIRTUAL_EPOCH_SECS as i64 + 90);
    }

    #[tokio::test]
    async fn test_virtual_sleep_advances_without_blocking() {
        let clock = VirtualClock::new(42);
        clock.sleep(Duration::from_secs(3600)).await;
        assert_eq!(clock.now(), Duration::from_secs(3600));
    }

    #[test]
    fn test_virtual_clock_clone_shares_time() {
        let clock1 = VirtualClock::new(42);
        let clock2 = clock1.clone();

        clock1.advance_time(Duration::from_secs(5));

        assert_eq!(clock1.now(), clock2.now());
        assert_eq!(clock2.seed(), 42);
    }
}
