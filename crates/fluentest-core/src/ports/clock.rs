//! Time source port.
//!
//! Polling loops read the time and sleep through a [`Clock`] so tests can
//! simulate elapsed time without real sleeping.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Monotonic time and asynchronous delays.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Clock that only moves when slept on or advanced explicitly.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    /// A clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut elapsed = self
            .elapsed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *elapsed += by;
    }

    /// Total simulated time since creation.
    pub fn elapsed(&self) -> Duration {
        *self
            .elapsed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sleeping_advances_manual_time() {
        let clock = ManualClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(30)).await;
        clock.advance(Duration::from_millis(500));

        assert_eq!(clock.now() - start, Duration::from_millis(30_500));
        assert_eq!(clock.elapsed(), Duration::from_millis(30_500));
    }
}
