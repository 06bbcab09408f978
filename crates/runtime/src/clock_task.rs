//! The clock's mailbox task.

use crate::handle::ClockHandle;
use crate::registry::WorkerRegistry;
use std::time::Duration;
use tempo_clock::ClockState;
use tempo_core::{ClockAction, ClockEvent, Tick};
use tokio::sync::{broadcast, mpsc, oneshot};

/// Drains the clock's inbox strictly sequentially and executes the actions
/// the state machine emits.
///
/// The task exits when the orderly shutdown fires or when the state machine
/// reports an invariant violation; either way the registry (and with it
/// every worker inbox sender) is dropped, so worker tasks wind down on
/// their own.
pub struct ClockTask<P> {
    state: ClockState<P>,
    inbox: mpsc::UnboundedReceiver<ClockEvent<P>>,
    registry: WorkerRegistry<P>,
    bus: broadcast::Sender<Tick>,
    handle: ClockHandle<P>,
    on_quiescent: Option<oneshot::Sender<()>>,
    grace_period: Duration,
}

impl<P: Send + Sync + 'static> ClockTask<P> {
    pub(crate) fn new(
        inbox: mpsc::UnboundedReceiver<ClockEvent<P>>,
        registry: WorkerRegistry<P>,
        bus: broadcast::Sender<Tick>,
        handle: ClockHandle<P>,
        on_quiescent: oneshot::Sender<()>,
        grace_period: Duration,
    ) -> Self {
        Self {
            state: ClockState::new(),
            inbox,
            registry,
            bus,
            handle,
            on_quiescent: Some(on_quiescent),
            grace_period,
        }
    }

    /// Run the clock's main loop.
    pub async fn run(mut self) {
        while let Some(event) = self.inbox.recv().await {
            tracing::trace!(event = event.type_name(), "clock event");
            match self.state.handle(event) {
                Ok(actions) => {
                    for action in actions {
                        if self.execute(action) {
                            tracing::debug!("clock shutdown complete");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "clock invariant violated; terminating");
                    return;
                }
            }
        }
        tracing::debug!("clock inbox closed");
    }

    /// Execute one action. Returns true when the task should exit.
    fn execute(&mut self, action: ClockAction<P>) -> bool {
        match action {
            ClockAction::Deliver { to, envelope } => {
                self.registry.deliver(to, envelope);
            }
            ClockAction::DeliverSelection {
                selection,
                envelope,
            } => {
                self.registry.deliver_selection(&selection, envelope);
            }
            ClockAction::AdvanceTo(tick) => {
                // No subscribers is fine: broadcasting is best-effort.
                let _ = self.bus.send(tick);
            }
            ClockAction::ArmShutdownProbe => {
                let handle = self.handle.clone();
                let grace = self.grace_period;
                tokio::spawn(async move {
                    tokio::time::sleep(grace).await;
                    handle.request_shutdown();
                });
            }
            ClockAction::Shutdown => {
                if let Some(tx) = self.on_quiescent.take() {
                    let _ = tx.send(());
                }
                return true;
            }
        }
        false
    }
}
