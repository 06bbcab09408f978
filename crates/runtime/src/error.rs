//! Runtime errors.

use thiserror::Error;

/// Errors from running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The clock task terminated (invariant violation or dropped channels)
    /// before the simulation reached quiescence.
    #[error("clock terminated before reaching quiescence")]
    ClockFailed,
}
