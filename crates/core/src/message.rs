//! Routable messages and their delivered form.

use crate::time::{Tick, WorkerId};
use std::sync::Arc;

/// Destination selector for one-to-many delivery.
///
/// Groups are resolved by the runtime's registry; the clock state machine
/// never sees the membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every registered worker.
    All,
    /// Every worker registered under the named group.
    Group(String),
}

/// A routable message, addressed either to a single worker or to a selection.
///
/// The payload is reference-counted so that group delivery never clones it.
/// Exactly one of `target` / `selection` should be set; with neither set the
/// clock returns the message to its sender, and a message with no sender
/// either is unroutable (logged and dropped).
#[derive(Debug)]
pub struct SimMessage<P> {
    /// Originating worker, stamped by the runtime. `None` for messages
    /// injected from outside the simulation.
    pub from: Option<WorkerId>,

    /// Direct destination. Delivery preserves the original sender.
    pub target: Option<WorkerId>,

    /// One-to-many destination. Delivery shows the clock as the sender.
    pub selection: Option<Selection>,

    /// The domain payload.
    pub payload: Arc<P>,
}

impl<P> SimMessage<P> {
    /// Message addressed to a single worker.
    pub fn to(target: WorkerId, payload: P) -> Self {
        Self {
            from: None,
            target: Some(target),
            selection: None,
            payload: Arc::new(payload),
        }
    }

    /// Message addressed to a selection of workers.
    pub fn to_selection(selection: Selection, payload: P) -> Self {
        Self {
            from: None,
            target: None,
            selection: Some(selection),
            payload: Arc::new(payload),
        }
    }

    /// Message with no destination: the clock delivers it back to whoever
    /// sent it. Workers use this to schedule messages to themselves.
    pub fn to_sender(payload: P) -> Self {
        Self {
            from: None,
            target: None,
            selection: None,
            payload: Arc::new(payload),
        }
    }
}

impl<P> Clone for SimMessage<P> {
    fn clone(&self) -> Self {
        Self {
            from: self.from,
            target: self.target,
            selection: self.selection.clone(),
            payload: Arc::clone(&self.payload),
        }
    }
}

/// A message as it arrives in a worker's inbox.
#[derive(Debug)]
pub struct Envelope<P> {
    /// Apparent sender. `None` means the clock itself or an external caller.
    pub from: Option<WorkerId>,

    /// Set when the unit was reserved for a future tick: the payload is
    /// delivered immediately but must not be processed before `due` becomes
    /// the current tick.
    pub due: Option<Tick>,

    /// The domain payload.
    pub payload: Arc<P>,
}

impl<P> Clone for Envelope<P> {
    fn clone(&self) -> Self {
        Self {
            from: self.from,
            due: self.due,
            payload: Arc::clone(&self.payload),
        }
    }
}
