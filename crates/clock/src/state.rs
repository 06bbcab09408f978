//! Clock state machine implementation.
//!
//! All I/O (delivery, broadcast, timers, process shutdown) is handled by the
//! runtime; this state machine only mutates its own counters and describes
//! effects as returned [`ClockAction`]s.

use crate::ClockError;
use std::collections::{BTreeMap, VecDeque};
use tempo_core::{ClockAction, ClockEvent, Envelope, SimMessage, Tick};

/// One level of the behavior stack.
///
/// The bottom level is always `Buffering` (the not-started state). `Start`
/// pushes a `Running` level and replays the stash; `Stop` pops one level.
/// Nested pause/resume therefore preserves its depth, although observed
/// usage only ever pushes one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Buffering,
    Running,
}

/// The quiescence clock state machine.
///
/// Owns logical time, the in-flight counter, and the sparse future-tick
/// reservation table. No other component mutates any of these; sequencing is
/// enforced by the runtime's single-consumer mailbox, not by locks.
#[derive(Debug)]
pub struct ClockState<P> {
    /// Current logical time. Strictly increasing on every advance.
    now: Tick,

    /// Units dispatched for the current tick and not yet acknowledged.
    in_flight: u64,

    /// Future tick → number of units expected to be outstanding once that
    /// tick becomes current. Sorted so the minimum key pops first; entries
    /// accumulate and are removed wholesale when their tick becomes current.
    reservations: BTreeMap<Tick, u64>,

    /// Behavior stack; bottom level is always `Buffering`.
    modes: Vec<Mode>,

    /// Events stashed while buffering, replayed in order on `Start`.
    stash: VecDeque<ClockEvent<P>>,

    /// Set once no scheduled work remains; terminal.
    completed: bool,

    /// Guards the orderly-shutdown collaborator: invoked at most once.
    shutdown_sent: bool,
}

impl<P> Default for ClockState<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ClockState<P> {
    /// Create a clock at time zero, buffering until `Start`.
    pub fn new() -> Self {
        Self {
            now: Tick::ZERO,
            in_flight: 0,
            reservations: BTreeMap::new(),
            modes: vec![Mode::Buffering],
            stash: VecDeque::new(),
            completed: false,
            shutdown_sent: false,
        }
    }

    /// Current logical time.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Units dispatched for the current tick and not yet acknowledged.
    pub fn in_flight(&self) -> u64 {
        self.in_flight
    }

    /// Reservation count recorded for a future tick.
    pub fn reserved_at(&self, tick: Tick) -> u64 {
        self.reservations.get(&tick).copied().unwrap_or(0)
    }

    /// Sum of all reservation counts plus the in-flight counter: the total
    /// number of not-yet-acknowledged units across the whole system.
    pub fn outstanding_units(&self) -> u64 {
        self.in_flight + self.reservations.values().sum::<u64>()
    }

    /// Whether the clock is processing the full protocol (not buffering).
    pub fn is_running(&self) -> bool {
        matches!(self.modes.last(), Some(Mode::Running))
    }

    /// Whether the clock has declared completion.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Number of events currently stashed.
    pub fn stashed(&self) -> usize {
        self.stash.len()
    }

    /// Process one event, returning the effects for the runtime to execute
    /// in order.
    ///
    /// The only error is a time regression, which is fatal to the clock.
    pub fn handle(&mut self, event: ClockEvent<P>) -> Result<Vec<ClockAction<P>>, ClockError> {
        let mut actions = Vec::new();
        self.dispatch(event, &mut actions)?;
        Ok(actions)
    }

    fn dispatch(
        &mut self,
        event: ClockEvent<P>,
        actions: &mut Vec<ClockAction<P>>,
    ) -> Result<(), ClockError> {
        match self.modes.last().copied().unwrap_or(Mode::Buffering) {
            Mode::Buffering => match event {
                ClockEvent::Start => {
                    tracing::debug!(stashed = self.stash.len(), "starting; replaying stash");
                    self.modes.push(Mode::Running);
                    // Drain up front so replayed events that re-enter
                    // buffering stash afresh instead of re-entering this loop.
                    let stashed: Vec<_> = self.stash.drain(..).collect();
                    for ev in stashed {
                        self.dispatch(ev, actions)?;
                    }
                }
                other => self.stash.push_back(other),
            },
            Mode::Running => self.handle_running(event, actions)?,
        }
        Ok(())
    }

    fn handle_running(
        &mut self,
        event: ClockEvent<P>,
        actions: &mut Vec<ClockAction<P>>,
    ) -> Result<(), ClockError> {
        match event {
            ClockEvent::Start => {
                // Replay happens at most once per transition into Running.
                tracing::debug!("duplicate Start while running ignored");
            }
            ClockEvent::Stop => {
                self.modes.pop();
                tracing::debug!(depth = self.modes.len(), "paused; buffering resumes");
            }
            ClockEvent::Done => {
                if self.in_flight == 0 {
                    // Decrementing would corrupt the quiescence invariant
                    // irrecoverably, so the violation is dropped instead.
                    tracing::warn!(now = %self.now, "Done with no in-flight work; ignored");
                } else {
                    self.in_flight -= 1;
                    if self.in_flight == 0 {
                        self.advance(actions)?;
                    }
                }
            }
            ClockEvent::ShutdownRequest => {
                if self.in_flight == 0 && self.reservations.is_empty() && !self.shutdown_sent {
                    tracing::info!(now = %self.now, "fully quiescent; shutting down");
                    self.shutdown_sent = true;
                    actions.push(ClockAction::Shutdown);
                }
                // Otherwise a no-op poll: work is still outstanding.
            }
            ClockEvent::Schedule { delay, message } => {
                if delay == 0 {
                    // A reservation must be strictly in the future; treat the
                    // unit as immediate current-tick work instead.
                    tracing::warn!(now = %self.now, "zero-delay Schedule treated as immediate work");
                    if self.forward(message, None, actions) {
                        self.in_flight += 1;
                    }
                } else {
                    let due = self.now.plus(delay);
                    if self.forward(message, Some(due), actions) {
                        *self.reservations.entry(due).or_insert(0) += 1;
                        tracing::debug!(
                            due = %due,
                            reserved = self.reservations[&due],
                            "reserved future work"
                        );
                    }
                }
            }
            ClockEvent::Message(message) => {
                if self.forward(message, None, actions) {
                    self.in_flight += 1;
                }
            }
        }
        Ok(())
    }

    /// Forward a message to its destination. Returns whether it was
    /// dispatched; an unroutable message is a logged protocol violation and
    /// is dropped without affecting any counter.
    fn forward(
        &mut self,
        message: SimMessage<P>,
        due: Option<Tick>,
        actions: &mut Vec<ClockAction<P>>,
    ) -> bool {
        if let Some(target) = message.target {
            // A routing forward: the original sender stays visible.
            actions.push(ClockAction::Deliver {
                to: target,
                envelope: Envelope {
                    from: message.from,
                    due,
                    payload: message.payload,
                },
            });
            true
        } else if let Some(selection) = message.selection {
            actions.push(ClockAction::DeliverSelection {
                selection,
                envelope: Envelope {
                    from: None,
                    due,
                    payload: message.payload,
                },
            });
            true
        } else if let Some(sender) = message.from {
            actions.push(ClockAction::Deliver {
                to: sender,
                envelope: Envelope {
                    from: None,
                    due,
                    payload: message.payload,
                },
            });
            true
        } else {
            tracing::warn!(now = %self.now, "unroutable message (no target, selection, or sender); dropped");
            false
        }
    }

    /// Advance logical time now that the current tick is quiescent.
    ///
    /// Jumps to the smallest reserved tick and installs its count as the new
    /// in-flight value (replacing, not adding: the residual is zero by
    /// precondition). Ticks whose reservation count is zero move time but
    /// are skipped without a broadcast, so observers only see ticks that had
    /// outstanding work. An empty table means completion.
    fn advance(&mut self, actions: &mut Vec<ClockAction<P>>) -> Result<(), ClockError> {
        debug_assert_eq!(self.in_flight, 0);
        if self.completed {
            return Ok(());
        }
        loop {
            match self.reservations.pop_first() {
                None => {
                    tracing::info!(now = %self.now, "no scheduled work remains; completing");
                    self.completed = true;
                    actions.push(ClockAction::ArmShutdownProbe);
                    return Ok(());
                }
                Some((next, count)) => {
                    if next <= self.now {
                        return Err(ClockError::TimeRegression {
                            now: self.now,
                            next,
                        });
                    }
                    self.now = next;
                    self.in_flight = count;
                    if count > 0 {
                        tracing::debug!(now = %next, in_flight = count, "advanced logical time");
                        actions.push(ClockAction::AdvanceTo(next));
                        return Ok(());
                    }
                    tracing::debug!(tick = %next, "skipping tick with no reserved work");
                }
            }
        }
    }
}
