//! Tokio host for the tempo clock.
//!
//! Each component runs as an independent task draining its own unbounded
//! mpsc inbox, so no message is ever handled concurrently *within* a
//! component and the clock needs no locks around its state. Coordination is
//! purely asynchronous message delivery:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     Simulation                            │
//! │                (builder + join handles)                   │
//! ├───────────────────────────────────────────────────────────┤
//! │                                                           │
//! │   ┌──────────┐   ┌──────────┐   ┌──────────┐              │
//! │   │ Worker 0 │   │ Worker 1 │   │ Worker 2 │  ...         │
//! │   │  (task)  │   │  (task)  │   │  (task)  │              │
//! │   └────┬─────┘   └────┬─────┘   └────┬─────┘              │
//! │        │  ClockEvents │              │                    │
//! │        └──────────────┼──────────────┘                    │
//! │                 ┌─────▼─────┐                             │
//! │                 │ ClockTask │── Envelopes ──► inboxes     │
//! │                 │ (mailbox) │── Tick ───────► broadcast   │
//! │                 └───────────┘── quiescent ──► oneshot     │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! The one timer in the system is the shutdown grace period: a spawned
//! one-shot sleep that sends `ShutdownRequest` back to the clock, never a
//! blocking wait.

mod clock_task;
mod error;
mod handle;
mod registry;
mod simulation;
mod worker_task;

pub use clock_task::ClockTask;
pub use error::SimulationError;
pub use handle::ClockHandle;
pub use registry::WorkerRegistry;
pub use simulation::{Simulation, SimulationBuilder};
pub use worker_task::WorkerTask;
