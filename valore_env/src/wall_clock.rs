//! Production implementation of ValoreContext using the system clock.

use crate::ValoreContext;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// Production context backed by the system clock and Tokio timers.
///
/// Used when the engine is created without a seed, and by the live stream
/// driver when advisory delays must be honored in real time.
pub struct WallClock {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl WallClock {
    /// Creates a new WallClock.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Creates an Arc-wrapped clock for sharing across tasks.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValoreContext for WallClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn seed(&self) -> u64 {
        // Wall-clock contexts are not seeded
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wall_clock_sleep_elapses() {
        let clock = WallClock::new();
        let t1 = clock.now();
        clock.sleep(Duration::from_millis(10)).await;
        let t2 = clock.now();

        assert!(t2 > t1);
        assert!(t2 - t1 >= Duration::from_millis(10));
    }

    #[test]
    fn test_wall_clock_unix_secs_is_recent() {
        let clock = WallClock::new();
        // 2024-01-01T00:00:00Z
        assert!(clock.unix_secs() > 1_704_067_200);
    }

    #[test]
    fn test_wall_clock_seed() {
        let clock = WallClock::new();
        assert_eq!(clock.seed(), 0);
    }
}
