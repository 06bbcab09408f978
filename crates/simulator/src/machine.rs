//! Machine and collector workers.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempo_core::{SimMessage, Tick, Worker, WorkerId, WorkerOp};

/// Payloads exchanged in the assembly-line scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobMessage {
    /// A work order for a machine.
    Work { job: u64, duration: u64 },

    /// A machine's self-scheduled assembly completion.
    Finish { job: u64 },

    /// Completion report for the collector.
    Report { job: u64, machine: WorkerId },
}

/// A machine that assembles work orders.
///
/// On a `Work` order it schedules its own `Finish` after the assembly
/// duration (base ± 1 tick of seeded jitter); when the finish tick becomes
/// current it reports to the collector.
pub struct MachineWorker {
    id: WorkerId,
    collector: WorkerId,
    rng: ChaCha8Rng,
}

impl MachineWorker {
    /// Create a machine reporting to `collector`.
    pub fn new(id: WorkerId, collector: WorkerId, rng: ChaCha8Rng) -> Self {
        Self { id, collector, rng }
    }
}

impl Worker for MachineWorker {
    type Payload = JobMessage;

    fn on_message(
        &mut self,
        now: Tick,
        _from: Option<WorkerId>,
        payload: &JobMessage,
    ) -> Vec<WorkerOp<JobMessage>> {
        match payload {
            JobMessage::Work { job, duration } => {
                let jitter = self.rng.gen_range(-1i64..=1);
                let assembly = (*duration as i64 + jitter).max(1) as u64;
                tracing::debug!(machine = %self.id, job, assembly, %now, "working");
                // No explicit target: the clock returns the message to its
                // sender, i.e. back to this machine at the finish tick.
                vec![WorkerOp::Schedule {
                    delay: assembly,
                    message: SimMessage::to_sender(JobMessage::Finish { job: *job }),
                }]
            }
            JobMessage::Finish { job } => {
                tracing::debug!(machine = %self.id, job, %now, "finished");
                vec![WorkerOp::Send(SimMessage::to(
                    self.collector,
                    JobMessage::Report {
                        job: *job,
                        machine: self.id,
                    },
                ))]
            }
            JobMessage::Report { .. } => {
                tracing::warn!(machine = %self.id, "machine received a report; ignored");
                Vec::new()
            }
        }
    }
}

/// Counts completion reports.
///
/// Results are exposed through shared atomics so the scenario can read them
/// after the worker task has been consumed by the runtime.
pub struct CollectorWorker {
    completed: Arc<AtomicU64>,
    last_tick: Arc<AtomicU64>,
}

impl CollectorWorker {
    /// Create a collector writing into the given counters.
    pub fn new(completed: Arc<AtomicU64>, last_tick: Arc<AtomicU64>) -> Self {
        Self {
            completed,
            last_tick,
        }
    }
}

impl Worker for CollectorWorker {
    type Payload = JobMessage;

    fn on_message(
        &mut self,
        now: Tick,
        _from: Option<WorkerId>,
        payload: &JobMessage,
    ) -> Vec<WorkerOp<JobMessage>> {
        if let JobMessage::Report { job, machine } = payload {
            self.completed.fetch_add(1, Ordering::Relaxed);
            self.last_tick.store(now.0, Ordering::Relaxed);
            tracing::info!(job, %machine, %now, "job complete");
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn machine() -> MachineWorker {
        MachineWorker::new(
            WorkerId(1),
            WorkerId(0),
            ChaCha8Rng::seed_from_u64(7),
        )
    }

    #[test]
    fn work_schedules_finish_to_self() {
        let mut m = machine();
        let ops = m.on_message(
            Tick::ZERO,
            None,
            &JobMessage::Work {
                job: 1,
                duration: 5,
            },
        );
        match &ops[..] {
            [WorkerOp::Schedule { delay, message }] => {
                assert!((4..=6).contains(delay));
                // Undirected: the clock routes it back to the machine.
                assert!(message.target.is_none());
                assert!(message.selection.is_none());
                assert_eq!(*message.payload, JobMessage::Finish { job: 1 });
            }
            other => panic!("unexpected ops: {other:?}"),
        }
    }

    #[test]
    fn finish_reports_to_collector() {
        let mut m = machine();
        let ops = m.on_message(Tick(5), None, &JobMessage::Finish { job: 1 });
        match &ops[..] {
            [WorkerOp::Send(message)] => {
                assert_eq!(message.target, Some(WorkerId(0)));
                assert_eq!(
                    *message.payload,
                    JobMessage::Report {
                        job: 1,
                        machine: WorkerId(1),
                    }
                );
            }
            other => panic!("unexpected ops: {other:?}"),
        }
    }

    #[test]
    fn collector_counts_reports() {
        let completed = Arc::new(AtomicU64::new(0));
        let last_tick = Arc::new(AtomicU64::new(0));
        let mut c = CollectorWorker::new(Arc::clone(&completed), Arc::clone(&last_tick));

        c.on_message(
            Tick(6),
            None,
            &JobMessage::Report {
                job: 1,
                machine: WorkerId(1),
            },
        );
        assert_eq!(completed.load(Ordering::Relaxed), 1);
        assert_eq!(last_tick.load(Ordering::Relaxed), 6);
    }
}
