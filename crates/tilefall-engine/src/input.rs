//! Keyboard level and edge tracking.
//!
//! The [`InputTracker`] keeps two sets of raw keys:
//!
//! - **held**: level state, true from press until release.
//! - **pending release edges**: armed on press, survive the release, and are
//!   cleared by the first [`consume_release_edge`](InputTracker::consume_release_edge)
//!   call that sees them. Each press/release cycle therefore yields at most
//!   one "released" answer, to exactly one reader.
//!
//! The tracker is refreshed once per tick, before the update pass, from the
//! discrete [`InputEvent`]s the platform layer delivered since the last tick.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::KeyBindings;

/// A raw platform key identifier. The core never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key(pub u32);

impl Key {
    /// Key identified by a character code (the default bindings use ASCII).
    pub const fn from_char(c: char) -> Self {
        Key(c as u32)
    }
}

/// One discrete event from the platform input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Pressed(Key),
    Released(Key),
    /// The window or terminal asked the session to end.
    Quit,
}

/// Level + edge key state.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    held: BTreeSet<Key>,
    pending_release: BTreeSet<Key>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
        self.pending_release.insert(key);
    }

    /// Drop `key` from the held set. Its pending edge stays armed.
    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Fold one tick's events into the tracker.
    ///
    /// Returns `true` if a [`InputEvent::Quit`] was among them; the events
    /// are still applied in full.
    pub fn apply(&mut self, events: &[InputEvent]) -> bool {
        let mut quit = false;
        for event in events {
            match *event {
                InputEvent::Pressed(key) => self.press(key),
                InputEvent::Released(key) => self.release(key),
                InputEvent::Quit => quit = true,
            }
        }
        quit
    }

    /// Level test; does not consume anything.
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Take the pending release edge for `key`, if there is one.
    ///
    /// Returns `true` once per press/release cycle and `false` on every
    /// later call until the key is pressed again.
    pub fn consume_release_edge(&mut self, key: Key) -> bool {
        self.pending_release.remove(&key)
    }

    /// Disarm the pending edge for `key` without reporting it.
    pub fn invalidate(&mut self, key: Key) {
        self.pending_release.remove(&key);
    }

    /// Disarm every pending edge.
    pub fn flush(&mut self) {
        self.pending_release.clear();
    }

    /// Resolve the gameplay actions for this tick.
    pub fn controls(&self, keys: &KeyBindings) -> Controls {
        Controls {
            left: self.is_held(keys.left),
            right: self.is_held(keys.right),
            jump: self.is_held(keys.jump),
            fire: self.is_held(keys.fire),
        }
    }
}

/// The held state of each bound action for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
}

impl Controls {
    /// `1` for right, `-1` for left, `0` for neither or both.
    pub fn horizontal(&self) -> i32 {
        i32::from(self.right) - i32::from(self.left)
    }
}
