//! Simulated network latency for demo deployments.

use std::time::Duration;

use rand::Rng;

use crate::config::LatencyRange;

/// Optional uniform random delay applied before each service call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latency {
    range: Option<LatencyRange>,
}

impl Latency {
    #[must_use]
    pub fn new(range: Option<LatencyRange>) -> Self {
        Self { range }
    }

    /// Draw a delay from the configured range. `None` when disabled.
    #[must_use]
    pub fn sample(&self) -> Option<Duration> {
        let range = self.range?;
        let ms = rand::rng().random_range(range.min_ms..=range.max_ms);
        Some(Duration::from_millis(ms))
    }

    pub async fn wait(&self) {
        if let Some(delay) = self.sample() {
            tokio::time::sleep(delay).await;
        }
    }
}
