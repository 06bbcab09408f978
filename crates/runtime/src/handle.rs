//! Cloneable handle for talking to the clock.

use tempo_core::{ClockEvent, SimMessage, Tick};
use tokio::sync::{broadcast, mpsc};

/// Handle for sending protocol events to the clock and subscribing to the
/// time-advance bus.
///
/// Sends are fire-and-forget on an unbounded channel: a failed send means
/// the clock has already shut down, which every caller treats as benign.
pub struct ClockHandle<P> {
    tx: mpsc::UnboundedSender<ClockEvent<P>>,
    bus: broadcast::Sender<Tick>,
}

impl<P> Clone for ClockHandle<P> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            bus: self.bus.clone(),
        }
    }
}

impl<P> ClockHandle<P> {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<ClockEvent<P>>,
        bus: broadcast::Sender<Tick>,
    ) -> Self {
        Self { tx, bus }
    }

    /// Begin (or resume) processing.
    pub fn start(&self) {
        let _ = self.tx.send(ClockEvent::Start);
    }

    /// Pause one level.
    pub fn stop(&self) {
        let _ = self.tx.send(ClockEvent::Stop);
    }

    /// Acknowledge one completed unit of current-tick work.
    pub fn done(&self) {
        let _ = self.tx.send(ClockEvent::Done);
    }

    /// Poll the clock for terminal quiescence.
    pub fn request_shutdown(&self) {
        let _ = self.tx.send(ClockEvent::ShutdownRequest);
    }

    /// Route a message now, counted against the current tick.
    pub fn send(&self, message: SimMessage<P>) {
        let _ = self.tx.send(ClockEvent::Message(message));
    }

    /// Reserve a slot `delay` ticks ahead and dispatch the message
    /// immediately.
    pub fn schedule(&self, delay: u64, message: SimMessage<P>) {
        let _ = self.tx.send(ClockEvent::Schedule { delay, message });
    }

    /// Subscribe to the time-advance broadcast.
    pub fn subscribe(&self) -> broadcast::Receiver<Tick> {
        self.bus.subscribe()
    }
}
