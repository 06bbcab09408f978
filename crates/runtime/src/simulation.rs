//! Simulation orchestrator.
//!
//! Wires the clock task, the worker tasks, and the time-advance bus
//! together, and coordinates orderly shutdown.

use crate::clock_task::ClockTask;
use crate::error::SimulationError;
use crate::handle::ClockHandle;
use crate::registry::WorkerRegistry;
use crate::worker_task::WorkerTask;
use tempo_clock::ClockConfig;
use tempo_core::{ClockEvent, Tick, Worker, WorkerId};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

/// Capacity of the time-advance broadcast channel. Slow subscribers see a
/// logged lag instead of blocking the clock.
const BUS_CAPACITY: usize = 1024;

/// Builder for a [`Simulation`].
///
/// Workers registered before `spawn` get ids in registration order; their
/// bus subscriptions are created at registration time so no broadcast is
/// ever missed.
pub struct SimulationBuilder<P: Send + Sync + 'static> {
    config: ClockConfig,
    clock_tx: mpsc::UnboundedSender<ClockEvent<P>>,
    clock_rx: mpsc::UnboundedReceiver<ClockEvent<P>>,
    bus: broadcast::Sender<Tick>,
    registry: WorkerRegistry<P>,
    spawns: Vec<Box<dyn FnOnce(ClockHandle<P>) -> JoinHandle<()> + Send>>,
    next_id: u64,
}

impl<P: Send + Sync + 'static> Default for SimulationBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Send + Sync + 'static> SimulationBuilder<P> {
    /// Create a builder with the default clock configuration.
    pub fn new() -> Self {
        let (clock_tx, clock_rx) = mpsc::unbounded_channel();
        let (bus, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            config: ClockConfig::default(),
            clock_tx,
            clock_rx,
            bus,
            registry: WorkerRegistry::new(),
            spawns: Vec::new(),
            next_id: 0,
        }
    }

    /// Set the clock configuration.
    pub fn with_clock_config(mut self, config: ClockConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a worker. Returns its assigned id.
    pub fn register<W>(&mut self, worker: W) -> WorkerId
    where
        W: Worker<Payload = P>,
    {
        self.register_with(|_| worker)
    }

    /// Register a worker built from its assigned id, for workers that need
    /// to know their own identity.
    pub fn register_with<W, F>(&mut self, build: F) -> WorkerId
    where
        W: Worker<Payload = P>,
        F: FnOnce(WorkerId) -> W,
    {
        let id = WorkerId(self.next_id);
        self.next_id += 1;

        let (tx, rx) = mpsc::unbounded_channel();
        self.registry.insert(id, tx);
        let bus_rx = self.bus.subscribe();
        let worker = build(id);
        self.spawns.push(Box::new(move |handle| {
            tokio::spawn(WorkerTask::new(id, worker, rx, bus_rx, handle).run())
        }));
        id
    }

    /// Register a worker and add it to a named group.
    pub fn register_in_group<W>(&mut self, group: &str, worker: W) -> WorkerId
    where
        W: Worker<Payload = P>,
    {
        let id = self.register(worker);
        self.registry.add_to_group(group, id);
        id
    }

    /// A handle to the clock, usable before and after `spawn`.
    pub fn handle(&self) -> ClockHandle<P> {
        ClockHandle::new(self.clock_tx.clone(), self.bus.clone())
    }

    /// Spawn the clock task and all registered worker tasks onto the
    /// current tokio runtime.
    pub fn spawn(self) -> Simulation<P> {
        let handle = ClockHandle::new(self.clock_tx.clone(), self.bus.clone());
        let (quiescent_tx, quiescent_rx) = oneshot::channel();

        let workers = self.registry.len();
        let clock = ClockTask::new(
            self.clock_rx,
            self.registry,
            self.bus,
            handle.clone(),
            quiescent_tx,
            self.config.grace_period,
        );
        let clock_join = tokio::spawn(clock.run());

        let worker_joins: Vec<_> = self
            .spawns
            .into_iter()
            .map(|spawn| spawn(handle.clone()))
            .collect();

        tracing::info!(workers, "simulation spawned");

        Simulation {
            handle,
            quiescent: quiescent_rx,
            clock_join,
            worker_joins,
        }
    }
}

/// A running simulation.
pub struct Simulation<P> {
    handle: ClockHandle<P>,
    quiescent: oneshot::Receiver<()>,
    clock_join: JoinHandle<()>,
    worker_joins: Vec<JoinHandle<()>>,
}

impl<P: Send + Sync + 'static> Simulation<P> {
    /// A handle to the clock.
    pub fn handle(&self) -> ClockHandle<P> {
        self.handle.clone()
    }

    /// Start the clock and wait until the system is fully quiescent and the
    /// orderly shutdown has fired, then join all tasks.
    ///
    /// Messages sent before this call were stashed by the clock and are
    /// replayed, in order, as part of starting.
    pub async fn run_until_quiescent(self) -> Result<(), SimulationError> {
        self.handle.start();
        self.wait_until_quiescent().await
    }

    /// Wait for quiescence without sending `Start` (for callers that drive
    /// the start/stop protocol themselves).
    pub async fn wait_until_quiescent(self) -> Result<(), SimulationError> {
        let Simulation {
            handle,
            quiescent,
            clock_join,
            worker_joins,
        } = self;

        quiescent
            .await
            .map_err(|_| SimulationError::ClockFailed)?;

        // The clock task has exited and dropped the registry; worker inboxes
        // are closed, so the tasks drain and finish on their own.
        drop(handle);
        let _ = clock_join.await;
        for join in worker_joins {
            let _ = join.await;
        }
        Ok(())
    }
}
