//! The contract a simulated component implements.

use crate::message::SimMessage;
use crate::time::{Tick, WorkerId};

/// Outputs from one worker step.
///
/// The runtime stamps the worker's id as the sender and forwards these to
/// the clock. Acknowledging `Done` is not a worker concern: the runtime
/// acknowledges every delivered unit after `on_message` returns.
#[derive(Debug)]
pub enum WorkerOp<P> {
    /// Route a message now, counted against the current tick.
    Send(SimMessage<P>),

    /// Reserve a future tick and dispatch the message immediately. The
    /// runtime withholds processing at the receiver until the tick is
    /// current.
    Schedule { delay: u64, message: SimMessage<P> },
}

/// A simulated component.
///
/// Workers are synchronous state machines in the same mold as the clock:
/// they mutate their own state and describe effects as returned ops. The
/// runtime owns the mailbox loop, the deferred-unit queue, and the `Done`
/// acknowledgment for every unit it delivers.
pub trait Worker: Send + 'static {
    /// Domain payload type exchanged through the clock.
    type Payload: Send + Sync + 'static;

    /// Process one unit of work.
    ///
    /// Called when an immediate unit arrives, or when a deferred unit's
    /// reserved tick becomes current. `now` is the worker's view of logical
    /// time; `from` is the apparent sender (`None` for the clock or an
    /// external caller).
    fn on_message(
        &mut self,
        now: Tick,
        from: Option<WorkerId>,
        payload: &Self::Payload,
    ) -> Vec<WorkerOp<Self::Payload>>;

    /// Observe a time advance. Most workers only care about delivered units;
    /// the default does nothing.
    fn on_tick(&mut self, _tick: Tick) -> Vec<WorkerOp<Self::Payload>> {
        Vec::new()
    }
}
