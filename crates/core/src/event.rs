//! Inbound protocol of the clock.

use crate::message::SimMessage;

/// All possible inputs to the clock state machine.
///
/// While the clock is buffering (before `Start`, or after a `Stop`), every
/// event except `Start` is stashed unread and replayed in arrival order on
/// the next `Start`.
#[derive(Debug)]
pub enum ClockEvent<P> {
    /// Begin (or resume) processing; flushes the stash.
    Start,

    /// Pause one level; subsequent events buffer again.
    Stop,

    /// One unit of current-tick work has completed.
    Done,

    /// Poll for terminal quiescence. Also self-scheduled by the clock after
    /// the grace period.
    ShutdownRequest,

    /// Reserve a slot `delay` ticks in the future and dispatch the inner
    /// message to its destination immediately.
    Schedule { delay: u64, message: SimMessage<P> },

    /// Route a message now, counted against the current tick.
    Message(SimMessage<P>),
}

impl<P> ClockEvent<P> {
    /// Human-readable name for this event, for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            ClockEvent::Start => "Start",
            ClockEvent::Stop => "Stop",
            ClockEvent::Done => "Done",
            ClockEvent::ShutdownRequest => "ShutdownRequest",
            ClockEvent::Schedule { .. } => "Schedule",
            ClockEvent::Message(_) => "Message",
        }
    }
}
