//! Tilefall Engine -- tile-platformer simulation core.
//!
//! This crate builds on [`tilefall_ecs`] to provide the game itself: a static
//! [`TileMap`](tilemap::TileMap) collision oracle, an axis-separated,
//! unit-stepped movement resolver, player physics, projectiles, combat,
//! enemy patrol and a render pass that talks to an external sink.
//!
//! Everything a tick touches lives in one [`Game`](game::Game) context. A
//! tick is:
//!
//! 1. advance the clock and fold the platform's input events into the
//!    [`InputTracker`](input::InputTracker);
//! 2. run every `"update"`-tagged entity once, over a snapshot of the group
//!    taken before the pass, skipping ids removed earlier in the same pass;
//! 3. draw the tile layer and every `"render"`-tagged entity.
//!
//! # Quick Start
//!
//! ```
//! use tilefall_engine::prelude::*;
//!
//! let mut game = Game::with_default_level(GameConfig::default()).unwrap();
//! let player = game.spawn_player(40, 40).unwrap();
//!
//! let mut sink = RecordingSink::new();
//! for _ in 0..120 {
//!     game.tick(&[], &mut sink).unwrap();
//! }
//!
//! let p = game.registry().get(player).unwrap();
//! assert!(matches!(p.behavior, Behavior::Player { .. }));
//! assert_eq!(game.clock().current(), 120);
//! ```

#![deny(unsafe_code)]

pub mod combat;
pub mod config;
pub mod entity;
pub mod game;
pub mod geometry;
pub mod input;
pub mod movement;
pub mod physics;
pub mod render;
pub mod replay;
pub mod snapshot;
pub mod tick;
pub mod tilemap;

use tilefall_ecs::prelude::{EntityId, GroupId, RegistryError};

/// Re-export the ECS crate for convenience.
pub use tilefall_ecs;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced by the engine.
///
/// None of these are gameplay: each one means a caller broke a precondition
/// or the registry lost an invariant, and the frame loop should stop.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("level error: {0}")]
    Map(#[from] tilemap::MapError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// `hurt` on an entity that carries no hit points.
    #[error("entity {0} has no hit points and cannot be damaged")]
    NotDamageable(EntityId),

    /// A behavior ran on an entity lacking the data it drives.
    #[error("entity {entity} has no {capability}")]
    MissingCapability {
        entity: EntityId,
        capability: &'static str,
    },

    #[error("failed to serialize game state: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl EngineError {
    /// `id` is stale or was never added.
    pub(crate) fn not_live(id: EntityId) -> Self {
        RegistryError::NotRegistered {
            entity: id,
            group: GroupId::ALL,
        }
        .into()
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use tilefall_ecs::prelude::*;

    pub use crate::combat::{BulletFate, HurtOutcome};
    pub use crate::config::{GameConfig, KeyBindings, WorldBounds};
    pub use crate::entity::{Behavior, Entity, Facing, Groups, Health, Velocity, Visual};
    pub use crate::game::{Game, SessionSummary};
    pub use crate::geometry::Rect;
    pub use crate::input::{Controls, InputEvent, InputTracker, Key};
    pub use crate::movement::{resolve, Collider, MoveOutcome, Obstacles};
    pub use crate::render::{DrawCall, NullSink, RecordingSink, RenderSink};
    pub use crate::replay::{replay, InputLog, InputRecorder, ReplayResult};
    pub use crate::snapshot::GameSnapshot;
    pub use crate::tick::{TickClock, TickOutcome, TickStats};
    pub use crate::tilemap::{TileMap, DEFAULT_LEVEL};
    pub use crate::EngineError;
}
