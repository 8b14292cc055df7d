//! World state: the tick clock and the tile map.

mod map;

pub use map::*;

use serde::{Deserialize, Serialize};

/// Discrete unit of in-game time.
pub type Tick = u64;

/// Tick counter advanced explicitly by caller actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    tick: Tick,
}

impl GameClock {
    /// Clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock resuming from a saved tick.
    pub fn starting_at(tick: Tick) -> Self {
        Self { tick }
    }

    /// Current tick.
    pub fn now(&self) -> Tick {
        self.tick
    }

    /// Advance by `ticks` and return the new time.
    pub fn advance(&mut self, ticks: Tick) -> Tick {
        self.tick = self.tick.saturating_add(ticks);
        self.tick
    }

    /// Ticks elapsed since `earlier` (0 if `earlier` is in the future).
    pub fn since(&self, earlier: Tick) -> Tick {
        self.tick.saturating_sub(earlier)
    }
}
