//! Game state snapshots with BLAKE3 hashing.
//!
//! A [`GameSnapshot`] lists every live entity in slot order together with
//! the names of its groups and the current tick. Its `hash` is a BLAKE3 hex
//! digest of the JSON encoding of those fields, so two sessions that ran the
//! same level with the same inputs hash identically.
//!
//! ```
//! use tilefall_engine::prelude::*;
//!
//! let mut a = Game::with_default_level(GameConfig::default()).unwrap();
//! let mut b = Game::with_default_level(GameConfig::default()).unwrap();
//! for game in [&mut a, &mut b] {
//!     game.spawn_player(40, 40).unwrap();
//!     game.run_ticks(30, &mut NullSink).unwrap();
//! }
//! assert_eq!(a.state_hash().unwrap(), b.state_hash().unwrap());
//! assert_eq!(a.capture_snapshot().unwrap().hash.len(), 64);
//! ```
//!
//! Snapshots are for comparison and inspection. Nothing reads them back
//! into a running [`Game`].

use serde::{Deserialize, Serialize};
use tilefall_ecs::prelude::*;

use crate::entity::Entity;
use crate::game::Game;
use crate::EngineError;

/// One live entity as captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    /// Explicit group names, in registration order. `"all"` is omitted.
    pub groups: Vec<String>,
    pub entity: Entity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub tick: u64,
    pub entities: Vec<EntityRecord>,
    /// BLAKE3 hex digest (64 lowercase hex chars) of `tick` and `entities`.
    pub hash: String,
}

impl GameSnapshot {
    /// Recompute the digest and compare it with the stored one.
    pub fn verify(&self) -> Result<bool, EngineError> {
        Ok(compute_hash(self.tick, &self.entities)? == self.hash)
    }
}

fn compute_hash(tick: u64, entities: &[EntityRecord]) -> Result<String, EngineError> {
    #[derive(Serialize)]
    struct HashableState<'a> {
        tick: u64,
        entities: &'a [EntityRecord],
    }

    let bytes = serde_json::to_vec(&HashableState { tick, entities }).map_err(EngineError::Serialize)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

fn records(registry: &Registry<Entity>) -> Vec<EntityRecord> {
    let table = registry.group_table();
    registry
        .iter()
        .map(|(id, entity)| {
            let groups = registry
                .groups_of(id)
                .map(|mask| {
                    mask.iter()
                        .filter(|g| *g != GroupId::ALL)
                        .filter_map(|g| table.name(g).map(str::to_owned))
                        .collect()
                })
                .unwrap_or_default();
            EntityRecord {
                id,
                groups,
                entity: entity.clone(),
            }
        })
        .collect()
}

impl Game {
    pub fn capture_snapshot(&self) -> Result<GameSnapshot, EngineError> {
        let tick = self.clock().current();
        let entities = records(self.registry());
        let hash = compute_hash(tick, &entities)?;
        Ok(GameSnapshot { tick, entities, hash })
    }

    /// Equivalent to `capture_snapshot()?.hash`.
    pub fn state_hash(&self) -> Result<String, EngineError> {
        self.capture_snapshot().map(|s| s.hash)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn snapshot_lists_group_names() {
        let mut game = Game::with_default_level(GameConfig::default()).unwrap();
        let player = game.spawn_player(40, 40).unwrap();
        game.spawn_block(200, 200, 20).unwrap();

        let snap = game.capture_snapshot().unwrap();
        assert_eq!(snap.tick, 0);
        assert_eq!(snap.entities.len(), 2);
        assert_eq!(snap.entities[0].id, player);
        assert_eq!(snap.entities[0].groups, vec!["update", "render"]);
        assert_eq!(snap.entities[1].groups, vec!["render", "wall"]);
        assert!(snap.verify().unwrap());
    }

    #[test]
    fn hash_changes_with_state_and_tick() {
        let mut game = Game::with_default_level(GameConfig::default()).unwrap();
        let empty = game.state_hash().unwrap();
        game.run_ticks(1, &mut NullSink).unwrap();
        let ticked = game.state_hash().unwrap();
        assert_ne!(empty, ticked);

        game.spawn_bar(0, 0).unwrap();
        assert_ne!(ticked, game.state_hash().unwrap());
    }

    #[test]
    fn tampered_snapshot_fails_verification() {
        let mut game = Game::with_default_level(GameConfig::default()).unwrap();
        game.spawn_player(40, 40).unwrap();
        let mut snap = game.capture_snapshot().unwrap();
        snap.entities[0].entity.x += 1;
        assert!(!snap.verify().unwrap());
    }
}
