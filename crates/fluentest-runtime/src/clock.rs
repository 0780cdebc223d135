//! Real-time [`Clock`] backed by tokio's timer.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use fluentest_core::Clock;

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
