//! Logical time and component identity.

use std::fmt;

/// A point in logical simulation time.
///
/// Ticks carry no wall-clock meaning. The clock only ever assigns strictly
/// increasing values; observers see time jump directly between ticks that had
/// outstanding work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tick(pub u64);

impl Tick {
    /// The zero-point of simulation time.
    pub const ZERO: Tick = Tick(0);

    /// The tick `delay` units after `self`. Saturates at `u64::MAX`.
    pub fn plus(self, delay: u64) -> Tick {
        Tick(self.0.saturating_add(delay))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Identifies a registered worker within one simulation.
///
/// Ids are assigned by the runtime in registration order and are only
/// meaningful inside the simulation that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}
