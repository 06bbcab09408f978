//! Clock configuration.

use std::time::Duration;

/// Configuration for the clock.
#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// Wall-clock delay between declaring completion and polling for
    /// terminal quiescence, giving straggling acknowledgments a last chance
    /// to arrive before teardown.
    pub grace_period: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(1),
        }
    }
}

impl ClockConfig {
    /// Create a new clock configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown grace period.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }
}
