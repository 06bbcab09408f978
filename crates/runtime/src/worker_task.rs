//! Generic worker mailbox task.
//!
//! Implements the worker-side half of the clock protocol so worker
//! implementations only describe domain behavior:
//!
//! - immediate units are processed on arrival, then acknowledged with `Done`
//! - deferred units (delivered with a `due` tick) are queued locally and
//!   processed when the time-advance broadcast reaches their tick, then
//!   acknowledged
//! - outgoing ops are stamped with the worker's id and forwarded to the clock

use crate::handle::ClockHandle;
use std::collections::BTreeMap;
use tempo_core::{Envelope, Tick, Worker, WorkerId, WorkerOp};
use tokio::sync::{broadcast, mpsc};

/// Mailbox loop around one [`Worker`].
pub struct WorkerTask<W: Worker> {
    id: WorkerId,
    worker: W,
    inbox: mpsc::UnboundedReceiver<Envelope<W::Payload>>,
    bus: broadcast::Receiver<Tick>,
    clock: ClockHandle<W::Payload>,
    now: Tick,
    /// Units reserved for future ticks, waiting for their tick to become
    /// current.
    deferred: BTreeMap<Tick, Vec<Envelope<W::Payload>>>,
    bus_open: bool,
}

impl<W: Worker> WorkerTask<W> {
    pub(crate) fn new(
        id: WorkerId,
        worker: W,
        inbox: mpsc::UnboundedReceiver<Envelope<W::Payload>>,
        bus: broadcast::Receiver<Tick>,
        clock: ClockHandle<W::Payload>,
    ) -> Self {
        Self {
            id,
            worker,
            inbox,
            bus,
            clock,
            now: Tick::ZERO,
            deferred: BTreeMap::new(),
            bus_open: true,
        }
    }

    /// Run the worker's mailbox loop.
    ///
    /// Exits when the inbox closes, which happens once the clock task has
    /// shut down and dropped the registry.
    pub async fn run(mut self) {
        loop {
            // Bus first, and biased: the broadcast for tick T is enqueued
            // before any tick-T work can put a follow-on envelope in the
            // inbox, so draining ready advances before each envelope keeps
            // `now` current when `on_message` runs.
            tokio::select! {
                biased;
                result = self.bus.recv(), if self.bus_open => match result {
                    Ok(tick) => self.on_advance(tick),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(id = %self.id, missed, "worker lagged behind time-advance bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => self.bus_open = false,
                },
                maybe = self.inbox.recv() => match maybe {
                    Some(envelope) => self.on_envelope(envelope),
                    None => break,
                },
            }
        }
        tracing::debug!(id = %self.id, "worker shutdown complete");
    }

    fn on_envelope(&mut self, envelope: Envelope<W::Payload>) {
        match envelope.due {
            // The broadcast can outrun the inbox; a unit whose tick is
            // already current (or past) is processed right away.
            Some(due) if due > self.now => {
                self.deferred.entry(due).or_default().push(envelope);
            }
            _ => self.process(envelope),
        }
    }

    fn on_advance(&mut self, tick: Tick) {
        self.now = tick;
        while let Some(entry) = self.deferred.first_entry() {
            if *entry.key() > tick {
                break;
            }
            for envelope in entry.remove() {
                self.process(envelope);
            }
        }
        let ops = self.worker.on_tick(tick);
        self.apply(ops);
    }

    /// Process one delivered unit and acknowledge it.
    fn process(&mut self, envelope: Envelope<W::Payload>) {
        let ops = self
            .worker
            .on_message(self.now, envelope.from, &envelope.payload);
        self.apply(ops);
        self.clock.done();
    }

    fn apply(&mut self, ops: Vec<WorkerOp<W::Payload>>) {
        for op in ops {
            match op {
                WorkerOp::Send(mut message) => {
                    message.from = Some(self.id);
                    self.clock.send(message);
                }
                WorkerOp::Schedule { delay, mut message } => {
                    message.from = Some(self.id);
                    self.clock.schedule(delay, message);
                }
            }
        }
    }
}
