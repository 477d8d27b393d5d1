//! Simulation time model.
//!
//! Time is a monotonically increasing `Tick` counter.  One tick is one grid
//! move for every agent that moves.  `SimClock` carries the tick duration used
//! by an interactive driver to pace rendering; the simulation itself never
//! reads it.

use std::fmt;
use std::time::Duration;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.  Tick 0 is the state before the first
/// step; after `n` steps the clock reads `Tick(n)`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Current tick plus the presentation-only tick duration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Wall-clock milliseconds an interactive driver waits per tick.
    pub tick_duration_ms: u64,
    /// The current tick, advanced by `SimClock::advance()` once per step.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_duration_ms: u64) -> Self {
        Self {
            tick_duration_ms,
            current_tick: Tick::ZERO,
        }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Number of ticks processed so far.
    #[inline]
    pub fn elapsed_ticks(&self) -> u64 {
        self.current_tick.0
    }

    /// Pacing interval for one rendered frame.
    #[inline]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.tick_duration_ms)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ms/tick)", self.current_tick, self.tick_duration_ms)
    }
}
