//! The session context and the per-tick driver.
//!
//! [`Game`] owns everything a tick reads or writes: configuration, the tile
//! map, the entity registry and its group ids, input state and the clock.
//! There are no globals; whoever runs the frame loop holds the `Game`.
//!
//! Lifecycle: [`Game::new`] (or [`Game::with_default_level`]) starts a
//! session, [`Game::tick`] is called once per frame, and
//! [`Game::shutdown`] ends it and reports a [`SessionSummary`].

use serde::{Deserialize, Serialize};
use tilefall_ecs::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::combat::{self, BulletFate, HurtOutcome};
use crate::config::{ConfigError, GameConfig};
use crate::entity::{Behavior, Entity, Facing, Groups};
use crate::input::{InputEvent, InputTracker};
use crate::movement::Obstacles;
use crate::physics;
use crate::render::{self, RenderSink};
use crate::tick::{TickClock, TickOutcome, TickStats};
use crate::tilemap::{TileMap, DEFAULT_LEVEL};
use crate::EngineError;

/// Running totals over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub ticks: u64,
    pub live_entities: usize,
    pub shots_fired: u64,
    pub kills: u64,
}

pub struct Game {
    config: GameConfig,
    map: TileMap,
    groups: Groups,
    registry: Registry<Entity>,
    input: InputTracker,
    clock: TickClock,
    shots_fired: u64,
    kills: u64,
}

impl Game {
    /// Start a session on `map`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] if the config is invalid or its tile size
    /// disagrees with the map's.
    pub fn new(config: GameConfig, map: TileMap) -> Result<Self, EngineError> {
        config.validate()?;
        if map.tile_size() != config.tile_size {
            return Err(ConfigError::Invalid(format!(
                "map tile size {} does not match configured tile_size {}",
                map.tile_size(),
                config.tile_size
            ))
            .into());
        }

        let mut registry = Registry::new();
        let groups = Groups::register(&mut registry)?;
        info!(
            width = map.width(),
            height = map.height(),
            tile_size = map.tile_size(),
            solid_tiles = map.solid_tiles().count(),
            "session started"
        );
        Ok(Self {
            config,
            map,
            groups,
            registry,
            input: InputTracker::new(),
            clock: TickClock::new(),
            shots_fired: 0,
            kills: 0,
        })
    }

    /// Start a session on [`DEFAULT_LEVEL`].
    pub fn with_default_level(config: GameConfig) -> Result<Self, EngineError> {
        let map = TileMap::from_level(DEFAULT_LEVEL, config.tile_size)?;
        Self::new(config, map)
    }

    // -- accessors ----------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn groups(&self) -> &Groups {
        &self.groups
    }

    pub fn registry(&self) -> &Registry<Entity> {
        &self.registry
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    /// For edge maintenance (`flush`, `invalidate`) between ticks.
    pub fn input_mut(&mut self) -> &mut InputTracker {
        &mut self.input
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    // -- spawning -----------------------------------------------------------

    /// Add an arbitrary entity under `groups`.
    pub fn spawn(&mut self, entity: Entity, groups: &[GroupId]) -> Result<EntityId, EngineError> {
        let visual = entity.visual;
        let (x, y) = (entity.x, entity.y);
        let id = self.registry.add(entity, groups)?;
        debug!(entity = %id, ?visual, x, y, "spawned");
        Ok(id)
    }

    pub fn spawn_player(&mut self, x: i32, y: i32) -> Result<EntityId, EngineError> {
        let groups = self.groups.player();
        self.spawn(Entity::player(x, y, &self.config), &groups)
    }

    pub fn spawn_enemy(&mut self, x: i32, y: i32, direction: Facing) -> Result<EntityId, EngineError> {
        let groups = self.groups.enemy();
        self.spawn(Entity::enemy(x, y, direction, &self.config), &groups)
    }

    /// A solid `"wall"` entity outside the tile grid.
    pub fn spawn_block(&mut self, x: i32, y: i32, size: i32) -> Result<EntityId, EngineError> {
        let groups = self.groups.block();
        self.spawn(Entity::block(x, y, size), &groups)
    }

    pub fn spawn_bar(&mut self, x: i32, y: i32) -> Result<EntityId, EngineError> {
        let groups = self.groups.bar();
        self.spawn(Entity::bar(x, y), &groups)
    }

    /// Remove `id` from every group it belongs to.
    pub fn despawn(&mut self, id: EntityId) -> Result<Entity, EngineError> {
        let entity = self.registry.remove(id)?;
        debug!(entity = %id, "despawned");
        Ok(entity)
    }

    /// Apply `amount` damage to `id`; see [`combat::hurt`].
    pub fn hurt(&mut self, id: EntityId, amount: i32) -> Result<HurtOutcome, EngineError> {
        let outcome = combat::hurt(&mut self.registry, id, amount)?;
        if matches!(outcome, HurtOutcome::Killed { .. }) {
            self.kills += 1;
        }
        Ok(outcome)
    }

    // -- ticking ------------------------------------------------------------

    /// Run one tick: input, update pass, render pass.
    ///
    /// A [`InputEvent::Quit`] among `events` ends the tick before anything
    /// is updated or drawn.
    ///
    /// # Errors
    ///
    /// Any registry invariant violation or behavior precondition failure
    /// met during the update pass. The tick is abandoned at that point.
    pub fn tick<S: RenderSink + ?Sized>(
        &mut self,
        events: &[InputEvent],
        sink: &mut S,
    ) -> Result<TickOutcome, EngineError> {
        let tick = self.clock.advance();
        if self.input.apply(events) {
            warn!(tick, "quit requested");
            return Ok(TickOutcome::Quit { tick });
        }

        let mut stats = TickStats {
            tick,
            ..TickStats::default()
        };
        for id in self.registry.query_group(self.groups.update) {
            // Removed earlier in this pass.
            if !self.registry.contains(id) {
                continue;
            }
            self.update_entity(id, &mut stats)?;
            stats.updated += 1;
        }

        stats.drawn = render::render_frame(&self.map, &self.registry, self.groups.render, sink);
        trace!(
            tick,
            updated = stats.updated,
            spawned = stats.spawned,
            removed = stats.removed,
            drawn = stats.drawn,
            "tick complete"
        );
        Ok(TickOutcome::Continue(stats))
    }

    /// Run `count` ticks with no input.
    pub fn run_ticks<S: RenderSink + ?Sized>(&mut self, count: u64, sink: &mut S) -> Result<(), EngineError> {
        for _ in 0..count {
            self.tick(&[], sink)?;
        }
        Ok(())
    }

    fn update_entity(&mut self, id: EntityId, stats: &mut TickStats) -> Result<(), EngineError> {
        let behavior = self
            .registry
            .get(id)
            .map(|e| e.behavior)
            .ok_or_else(|| EngineError::not_live(id))?;

        match behavior {
            Behavior::Player { .. } => self.update_player(id, stats),
            Behavior::Patrol => {
                let enemy = self.registry.get_mut(id).ok_or_else(|| EngineError::not_live(id))?;
                if physics::step_patrol(id, enemy, &self.config.world)? {
                    trace!(entity = %id, x = enemy.x, y = enemy.y, "patrol reversed");
                }
                Ok(())
            }
            Behavior::Projectile { .. } => {
                match combat::step_bullet(&mut self.registry, &self.map, &self.groups, &self.config, id)? {
                    BulletFate::Flying => {}
                    BulletFate::Expired => stats.removed += 1,
                    BulletFate::Hit { outcome, .. } => {
                        stats.removed += 1;
                        if matches!(outcome, HurtOutcome::Killed { .. }) {
                            stats.removed += 1;
                            self.kills += 1;
                        }
                    }
                }
                Ok(())
            }
            Behavior::Inert => Ok(()),
        }
    }

    fn update_player(&mut self, id: EntityId, stats: &mut TickStats) -> Result<(), EngineError> {
        let mut player = self.registry.get(id).cloned().ok_or_else(|| EngineError::not_live(id))?;
        let controls = self.input.controls(&self.config.keys);

        let fired = combat::try_fire(
            &mut self.registry,
            &self.groups,
            &self.config,
            &self.clock,
            id,
            &player,
            controls,
        )?;
        if fired.is_some() {
            stats.spawned += 1;
            self.shots_fired += 1;
        }

        let obstacles = Obstacles::new(&self.map, &self.registry, self.groups.wall).excluding(id);
        physics::step_player(id, &mut player, controls, &self.config.player, &obstacles)?;

        let slot = self.registry.get_mut(id).ok_or_else(|| EngineError::not_live(id))?;
        *slot = player;
        Ok(())
    }

    // -- teardown -----------------------------------------------------------

    /// Totals so far, without ending the session.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            ticks: self.clock.current(),
            live_entities: self.registry.len(),
            shots_fired: self.shots_fired,
            kills: self.kills,
        }
    }

    /// End the session.
    pub fn shutdown(self) -> SessionSummary {
        let summary = self.summary();
        info!(
            ticks = summary.ticks,
            live_entities = summary.live_entities,
            shots_fired = summary.shots_fired,
            kills = summary.kills,
            "session ended"
        );
        summary
    }
}
