//! Assembly-line demo scenario for the tempo virtual-time kernel.
//!
//! Machines receive work orders, take a seeded-random number of ticks to
//! assemble each one, and report completions to a collector. The whole run
//! finishes when the clock proves no work remains, however long the
//! individual assemblies take in logical time; wall-clock time is only the
//! message-passing overhead.

mod config;
mod machine;
mod scenario;

pub use config::ScenarioConfig;
pub use machine::{CollectorWorker, JobMessage, MachineWorker};
pub use scenario::{run_scenario, ScenarioReport};
