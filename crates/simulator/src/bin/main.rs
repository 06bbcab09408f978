//! Tempo demo CLI
//!
//! Runs the assembly-line scenario on the virtual-time kernel.
//!
//! # Example
//!
//! ```bash
//! # Twelve jobs across three machines
//! tempo-sim
//!
//! # A bigger line with a fixed seed
//! tempo-sim -m 8 -j 200 --seed 42
//! ```

use clap::Parser;
use std::time::Duration;
use tempo_simulator::{run_scenario, ScenarioConfig};
use tracing_subscriber::EnvFilter;

/// Tempo assembly-line simulator.
#[derive(Parser, Debug)]
#[command(name = "tempo-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of machines
    #[arg(short = 'm', long, default_value = "3")]
    machines: usize,

    /// Number of work orders
    #[arg(short = 'j', long, default_value = "12")]
    jobs: u64,

    /// Base assembly duration in ticks
    #[arg(short = 'd', long, default_value = "5")]
    duration: u64,

    /// Random seed for reproducible jitter
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Shutdown grace period in milliseconds
    #[arg(long, default_value = "250")]
    grace_ms: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = ScenarioConfig::new()
        .with_machines(args.machines.max(1))
        .with_jobs(args.jobs)
        .with_base_duration(args.duration.max(1))
        .with_seed(args.seed)
        .with_grace_period(Duration::from_millis(args.grace_ms));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    let report = rt
        .block_on(run_scenario(config))
        .expect("Simulation failed");

    report.print_summary();
}
