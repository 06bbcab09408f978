//! Configuration for the demo scenario.

use std::time::Duration;

/// Configuration for an assembly-line run.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Number of machine workers.
    pub machines: usize,

    /// Number of work orders to submit, round-robin across machines.
    pub jobs: u64,

    /// Base assembly duration in ticks; each job gets ±1 tick of seeded
    /// jitter.
    pub base_duration: u64,

    /// Random seed for reproducible jitter.
    pub seed: u64,

    /// Shutdown grace period for the clock.
    pub grace_period: Duration,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            machines: 3,
            jobs: 12,
            base_duration: 5,
            seed: 12345,
            grace_period: Duration::from_millis(250),
        }
    }
}

impl ScenarioConfig {
    /// Create a scenario configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of machines.
    pub fn with_machines(mut self, machines: usize) -> Self {
        self.machines = machines;
        self
    }

    /// Set the number of jobs.
    pub fn with_jobs(mut self, jobs: u64) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set the base assembly duration in ticks.
    pub fn with_base_duration(mut self, ticks: u64) -> Self {
        self.base_duration = ticks;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the shutdown grace period.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }
}
