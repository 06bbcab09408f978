//! Fatal clock errors.

use tempo_core::Tick;
use thiserror::Error;

/// Invariant violations that terminate the clock.
///
/// Protocol violations (a stray `Done`, an unroutable message) are logged
/// and dropped instead; only a corrupted time line is unrecoverable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    /// An advance selected a tick at or before the current time. This can
    /// only happen if the reservation table was corrupted.
    #[error("logical time must move strictly forward: current {now}, next {next}")]
    TimeRegression { now: Tick, next: Tick },
}
