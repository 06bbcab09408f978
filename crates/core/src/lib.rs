//! Core types for the tempo virtual-time kernel.
//!
//! This crate provides the foundational types shared by the clock and the
//! runtime:
//!
//! - [`Tick`]: logical simulation time
//! - [`ClockEvent`]: all possible inputs to the clock state machine
//! - [`ClockAction`]: all possible outputs from the clock state machine
//! - [`SimMessage`] / [`Envelope`]: routable payloads and their delivered form
//! - [`Worker`]: the contract a simulated component implements
//!
//! # Architecture
//!
//! The kernel is built on a simple event-driven model:
//!
//! ```text
//! ClockEvents → ClockState::handle() → ClockActions
//! ```
//!
//! The clock state machine is:
//! - **Synchronous**: No async, no .await
//! - **Deterministic**: Same state + event = same actions
//! - **Pure-ish**: Mutates self, but performs no I/O
//!
//! All I/O is handled by the runtime, which:
//! 1. Delivers events to the clock state machine, one at a time
//! 2. Executes the returned actions (delivery, broadcast, timers, shutdown)
//! 3. Runs each worker in its own mailbox task

mod action;
mod event;
mod message;
mod time;
mod worker;

pub use action::ClockAction;
pub use event::ClockEvent;
pub use message::{Envelope, Selection, SimMessage};
pub use time::{Tick, WorkerId};
pub use worker::{Worker, WorkerOp};
