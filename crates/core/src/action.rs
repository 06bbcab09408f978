//! Outbound effects of the clock.

use crate::message::{Envelope, Selection};
use crate::time::{Tick, WorkerId};

/// All possible outputs from the clock state machine.
///
/// The runtime executes these in emission order; that ordering is what
/// guarantees a scheduled payload reaches its target's inbox before the
/// broadcast for its tick fires.
#[derive(Debug)]
pub enum ClockAction<P> {
    /// Put an envelope in a single worker's inbox.
    Deliver { to: WorkerId, envelope: Envelope<P> },

    /// Put an envelope in every inbox the selection resolves to.
    DeliverSelection {
        selection: Selection,
        envelope: Envelope<P>,
    },

    /// Publish the new current tick on the time-advance bus.
    AdvanceTo(Tick),

    /// Arm the one-shot grace-period timer that will send a
    /// `ShutdownRequest` back to the clock.
    ArmShutdownProbe,

    /// Invoke the orderly-shutdown collaborator. Emitted at most once.
    Shutdown,
}
