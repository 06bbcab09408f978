//! Scenario runner.

use crate::config::ScenarioConfig;
use crate::machine::{CollectorWorker, JobMessage, MachineWorker};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempo_clock::ClockConfig;
use tempo_core::{SimMessage, Tick, WorkerId};
use tempo_runtime::{SimulationBuilder, SimulationError};
use tracing::info;

/// Results of one assembly-line run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    /// Number of machines.
    pub machines: usize,
    /// Work orders submitted.
    pub jobs_submitted: u64,
    /// Completion reports received by the collector.
    pub jobs_completed: u64,
    /// Logical time of the last completion.
    pub final_tick: Tick,
}

impl ScenarioReport {
    /// Print a human-readable summary.
    pub fn print_summary(&self) {
        println!("\n=== Assembly Line Report ===");
        println!("Machines:       {}", self.machines);
        println!("Jobs submitted: {}", self.jobs_submitted);
        println!("Jobs completed: {}", self.jobs_completed);
        println!("Final tick:     {}", self.final_tick);
    }
}

/// Run one assembly-line scenario to quiescence.
///
/// Work orders are submitted before `Start`, so the clock stashes and then
/// replays them in order; everything after that is driven by the protocol
/// until the clock proves no work remains.
pub async fn run_scenario(config: ScenarioConfig) -> Result<ScenarioReport, SimulationError> {
    let completed = Arc::new(AtomicU64::new(0));
    let last_tick = Arc::new(AtomicU64::new(0));

    let mut builder = SimulationBuilder::new()
        .with_clock_config(ClockConfig::new().with_grace_period(config.grace_period));

    let collector = builder.register(CollectorWorker::new(
        Arc::clone(&completed),
        Arc::clone(&last_tick),
    ));

    // At least one machine, or submitted work would have no destination.
    let machine_count = config.machines.max(1);
    let machines: Vec<WorkerId> = (0..machine_count)
        .map(|_| {
            builder.register_with(|id| {
                let rng = ChaCha8Rng::seed_from_u64(
                    config.seed.wrapping_add(id.0).wrapping_mul(0x9e3779b97f4a7c15),
                );
                MachineWorker::new(id, collector, rng)
            })
        })
        .collect();

    let handle = builder.handle();
    for job in 0..config.jobs {
        let machine = machines[(job as usize) % machines.len()];
        handle.send(SimMessage::to(
            machine,
            JobMessage::Work {
                job,
                duration: config.base_duration,
            },
        ));
    }

    info!(
        machines = machine_count,
        jobs = config.jobs,
        seed = config.seed,
        "starting assembly line"
    );

    let sim = builder.spawn();
    if config.jobs == 0 {
        // Nothing will ever acknowledge, so poll for quiescence explicitly.
        handle.start();
        handle.request_shutdown();
        sim.wait_until_quiescent().await?;
    } else {
        sim.run_until_quiescent().await?;
    }

    Ok(ScenarioReport {
        machines: machine_count,
        jobs_submitted: config.jobs,
        jobs_completed: completed.load(Ordering::Relaxed),
        final_tick: Tick(last_tick.load(Ordering::Relaxed)),
    })
}
