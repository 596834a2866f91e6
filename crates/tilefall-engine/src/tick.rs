//! Tick counting and per-tick results.
//!
//! The [`TickClock`] advances at the start of every tick, so the first tick
//! a session runs is tick 1. Fire-rate gating is tick-aligned: an action
//! gated by [`TickClock::every`] happens on ticks that are multiples of the
//! interval, not a fixed time after the previous one.
//!
//! ```
//! use tilefall_engine::tick::TickClock;
//!
//! let mut clock = TickClock::new();
//! let fired: Vec<u64> = (0..25)
//!     .filter_map(|_| {
//!         let tick = clock.advance();
//!         clock.every(10).then_some(tick)
//!     })
//!     .collect();
//! assert_eq!(fired, vec![10, 20]);
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TickClock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickClock {
    tick: u64,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next tick and return its number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// The current tick; `0` before the first [`advance`](Self::advance).
    pub fn current(&self) -> u64 {
        self.tick
    }

    /// Whether the current tick is a multiple of `interval`.
    ///
    /// An interval of 0 never matches.
    pub fn every(&self, interval: u64) -> bool {
        interval != 0 && self.tick % interval == 0
    }
}

// ---------------------------------------------------------------------------
// TickStats / TickOutcome
// ---------------------------------------------------------------------------

/// What one completed tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    pub tick: u64,
    /// Entities whose update routine ran.
    pub updated: usize,
    /// Entities spawned during the update pass (bullets).
    pub spawned: usize,
    /// Entities removed during the update pass.
    pub removed: usize,
    /// Draw calls issued by the render pass, tiles included.
    pub drawn: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Update and render both ran.
    Continue(TickStats),
    /// A quit request arrived; nothing was updated or drawn this tick.
    Quit { tick: u64 },
}

impl TickOutcome {
    pub fn is_quit(&self) -> bool {
        matches!(self, TickOutcome::Quit { .. })
    }

    pub fn tick(&self) -> u64 {
        match self {
            TickOutcome::Continue(stats) => stats.tick,
            TickOutcome::Quit { tick } => *tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_one() {
        let mut clock = TickClock::new();
        assert_eq!(clock.current(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.current(), 1);
    }

    #[test]
    fn every_matches_multiples_only() {
        let mut clock = TickClock::new();
        let mut hits = Vec::new();
        for _ in 0..30 {
            let tick = clock.advance();
            if clock.every(7) {
                hits.push(tick);
            }
        }
        assert_eq!(hits, vec![7, 14, 21, 28]);
    }

    #[test]
    fn zero_interval_never_fires() {
        let mut clock = TickClock::new();
        clock.advance();
        assert!(!clock.every(0));
    }

    #[test]
    fn outcome_reports_its_tick() {
        assert_eq!(TickOutcome::Quit { tick: 9 }.tick(), 9);
        let stats = TickStats {
            tick: 3,
            ..Default::default()
        };
        assert!(!TickOutcome::Continue(stats).is_quit());
        assert_eq!(TickOutcome::Continue(stats).tick(), 3);
    }
}
