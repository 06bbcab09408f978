//! Quiescence-detecting virtual-time clock.
//!
//! The clock is the single coordinator of a simulation: it routes messages
//! between workers, counts how many units of work are outstanding for the
//! current tick, and advances logical time only when that count proves no
//! worker has unfinished in-flight work.
//!
//! # Protocol Overview
//!
//! 1. **Routing**: A bare message is forwarded to its destination and counted
//!    against the current tick. A `Schedule` reserves a slot at a future tick
//!    and forwards its payload immediately.
//!
//! 2. **Quiescence**: Workers acknowledge each completed unit with `Done`.
//!    When the in-flight counter reaches zero the clock advances to the
//!    smallest reserved tick, installs its reservation count as the new
//!    in-flight value, and broadcasts the new time.
//!
//! 3. **Completion**: With no reservations left the clock is complete; after
//!    a grace period it polls itself with a `ShutdownRequest` and, still
//!    quiescent, invokes the orderly-shutdown collaborator.
//!
//! # Architecture
//!
//! ```text
//! ClockEvent ──► ClockState::handle() ──► Vec<ClockAction>
//!                      │
//!                      ├─ now: Tick                (strictly increasing)
//!                      ├─ in_flight: u64           (current-tick units)
//!                      ├─ reservations: BTreeMap   (future tick → count)
//!                      └─ modes: Vec<Mode>         (buffer/run stack + stash)
//! ```
//!
//! All I/O (delivery, the broadcast bus, the grace-period timer, process
//! shutdown) is handled by the runtime, not by this state machine.

mod config;
mod error;
mod state;

pub use config::ClockConfig;
pub use error::ClockError;
pub use state::ClockState;
