//! Input recording and deterministic replay.
//!
//! A session is a pure function of its starting state and the input events
//! fed to each tick. [`InputRecorder`] captures those events (plus periodic
//! state hash checkpoints) into an [`InputLog`]; [`replay`] feeds the log to
//! a second [`Game`] built the same way and reports the first checkpoint
//! where the two disagree.
//!
//! # Recording
//!
//! ```
//! use tilefall_engine::prelude::*;
//!
//! let mut game = Game::with_default_level(GameConfig::default()).unwrap();
//! game.spawn_player(40, 40).unwrap();
//!
//! let mut recorder = InputRecorder::new(&game, 10).unwrap();
//! let right = game.config().keys.right;
//! for tick in 0..40 {
//!     let events = if tick == 5 { vec![InputEvent::Pressed(right)] } else { vec![] };
//!     game.tick(&events, &mut NullSink).unwrap();
//!     recorder.record(&game, &events).unwrap();
//! }
//! let log = recorder.finish();
//!
//! // A fresh session with the same setup replays to the same state.
//! let mut again = Game::with_default_level(GameConfig::default()).unwrap();
//! again.spawn_player(40, 40).unwrap();
//! let result = replay(&mut again, &log, &mut NullSink).unwrap();
//! assert!(result.first_divergence.is_none());
//! assert_eq!(result.final_hash, game.state_hash().unwrap());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::Game;
use crate::input::InputEvent;
use crate::render::RenderSink;

// ---------------------------------------------------------------------------
// InputLog
// ---------------------------------------------------------------------------

/// Inputs and checkpoints of one recorded run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputLog {
    /// Clock value when recording started.
    pub start_tick: u64,
    /// State hash when recording started.
    pub initial_hash: String,
    /// Ticks recorded. Replay runs exactly this many.
    pub total_ticks: u64,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogEntry {
    /// Events delivered to `tick`. Ticks with no events have no entry.
    Input { tick: u64, events: Vec<InputEvent> },
    /// State hash right after `tick` ran.
    Checkpoint { tick: u64, state_hash: String },
}

// ---------------------------------------------------------------------------
// InputRecorder
// ---------------------------------------------------------------------------

/// Builds an [`InputLog`] one tick at a time.
pub struct InputRecorder {
    log: InputLog,
    /// Checkpoint on ticks divisible by this; 0 disables checkpoints.
    checkpoint_interval: u64,
    last_tick: u64,
}

impl InputRecorder {
    /// Start recording from `game`'s current state.
    pub fn new(game: &Game, checkpoint_interval: u64) -> Result<Self, anyhow::Error> {
        let start_tick = game.clock().current();
        Ok(Self {
            log: InputLog {
                start_tick,
                initial_hash: game.state_hash()?,
                total_ticks: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            last_tick: start_tick,
        })
    }

    /// Record the tick `game` just ran with `events`.
    ///
    /// Call once after every [`Game::tick`]. Skipping or repeating a tick is
    /// an error.
    pub fn record(&mut self, game: &Game, events: &[InputEvent]) -> Result<(), anyhow::Error> {
        let tick = game.clock().current();
        if tick != self.last_tick + 1 {
            anyhow::bail!(
                "recorder expected tick {} but the game is at tick {tick}",
                self.last_tick + 1
            );
        }
        self.last_tick = tick;
        self.log.total_ticks += 1;

        if !events.is_empty() {
            self.log.entries.push(LogEntry::Input {
                tick,
                events: events.to_vec(),
            });
        }
        if self.checkpoint_interval != 0 && tick % self.checkpoint_interval == 0 {
            self.log.entries.push(LogEntry::Checkpoint {
                tick,
                state_hash: game.state_hash()?,
            });
        }
        Ok(())
    }

    pub fn finish(self) -> InputLog {
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub ticks_replayed: u64,
    /// State hash after the last replayed tick.
    pub final_hash: String,
    /// The session asked to quit before the log ran out.
    pub quit: bool,
    pub first_divergence: Option<ReplayDivergence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub tick: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

/// Feed `log` to `game` and compare checkpoints.
///
/// `game` must be in the state recording started from: same clock value and
/// same state hash. Replay stops at the first mismatching checkpoint or at a
/// recorded quit.
///
/// # Errors
///
/// A malformed log (duplicate or out-of-range entries), a starting state
/// that does not match the log, or an engine error raised by a tick. The log
/// is fully validated before `game` is touched.
pub fn replay<S: RenderSink + ?Sized>(
    game: &mut Game,
    log: &InputLog,
    sink: &mut S,
) -> Result<ReplayResult, anyhow::Error> {
    let end_tick = log.start_tick.checked_add(log.total_ticks).ok_or_else(|| {
        anyhow::anyhow!(
            "tick range overflow: start {} + total {}",
            log.start_tick,
            log.total_ticks
        )
    })?;

    let mut inputs: BTreeMap<u64, &[InputEvent]> = BTreeMap::new();
    let mut checkpoints: BTreeMap<u64, &str> = BTreeMap::new();
    for entry in &log.entries {
        let (tick, duplicate) = match entry {
            LogEntry::Input { tick, events } => (*tick, inputs.insert(*tick, events).is_some()),
            LogEntry::Checkpoint { tick, state_hash } => {
                (*tick, checkpoints.insert(*tick, state_hash).is_some())
            }
        };
        if duplicate {
            anyhow::bail!("replay log has two entries of the same kind at tick {tick}");
        }
        if tick <= log.start_tick || tick > end_tick {
            anyhow::bail!(
                "replay log entry at tick {tick} is outside {}..={end_tick}",
                log.start_tick + 1
            );
        }
    }

    if game.clock().current() != log.start_tick {
        anyhow::bail!(
            "game is at tick {} but the log starts at tick {}",
            game.clock().current(),
            log.start_tick
        );
    }
    let initial = game.state_hash()?;
    if initial != log.initial_hash {
        anyhow::bail!(
            "starting state differs from the recording: expected {}, found {initial}",
            log.initial_hash
        );
    }

    let mut ticks_replayed = 0;
    for tick in (log.start_tick + 1)..=end_tick {
        let events = inputs.get(&tick).copied().unwrap_or(&[]);
        let outcome = game.tick(events, sink)?;
        ticks_replayed += 1;

        if let Some(&expected) = checkpoints.get(&tick) {
            let actual = game.state_hash()?;
            if actual != expected {
                tracing::warn!(tick, expected, actual = %actual, "replay diverged");
                return Ok(ReplayResult {
                    ticks_replayed,
                    final_hash: actual.clone(),
                    quit: false,
                    first_divergence: Some(ReplayDivergence {
                        tick,
                        expected_hash: expected.to_owned(),
                        actual_hash: actual,
                    }),
                });
            }
        }
        if outcome.is_quit() {
            return Ok(ReplayResult {
                ticks_replayed,
                final_hash: game.state_hash()?,
                quit: true,
                first_divergence: None,
            });
        }
    }

    Ok(ReplayResult {
        ticks_replayed,
        final_hash: game.state_hash()?,
        quit: false,
        first_divergence: None,
    })
}
