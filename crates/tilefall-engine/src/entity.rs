//! Entity data and group tags.
//!
//! Entities are data, not subclasses. Every [`Entity`] has a position, a size
//! and a [`Visual`]; the optional capability fields (`velocity`, `facing`,
//! `health`, `owner`) say what else it can do, and its [`Behavior`] picks the
//! update routine. The update pass dispatches on `Behavior`; rendering only
//! needs the `"render"` group; damage only needs `health`.

use serde::{Deserialize, Serialize};
use tilefall_ecs::prelude::*;

use crate::config::GameConfig;
use crate::geometry::Rect;

// ---------------------------------------------------------------------------
// Capability data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

/// Facing direction, each component in `{-1, 0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facing {
    pub dx: i32,
    pub dy: i32,
}

impl Facing {
    pub const RIGHT: Facing = Facing { dx: 1, dy: 0 };
    pub const LEFT: Facing = Facing { dx: -1, dy: 0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }
}

/// Opaque appearance selector handed to the render sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visual {
    Player,
    Enemy,
    Bullet,
    Block,
    Tile,
    Bar,
}

/// Which update routine drives an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Keyboard-driven character. `on_ground` is rewritten by every vertical
    /// resolution pass.
    Player { on_ground: bool },
    /// Constant-velocity walker that reverses at the world bounds.
    Patrol,
    /// Short-lived shot moving along `facing` at `speed` px/tick.
    Projectile { speed: i32, damage: i32 },
    /// Nothing to do per tick.
    Inert,
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub x: i32,
    pub y: i32,
    pub size: i32,
    pub visual: Visual,
    pub behavior: Behavior,
    pub velocity: Option<Velocity>,
    pub facing: Option<Facing>,
    pub health: Option<Health>,
    /// Who fired this entity. Lookup only; the owner may already be gone.
    pub owner: Option<EntityId>,
}

impl Entity {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size)
    }

    pub fn set_position(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
    }

    /// The controllable character, facing right.
    pub fn player(x: i32, y: i32, config: &GameConfig) -> Self {
        Self {
            x,
            y,
            size: config.player.size,
            visual: Visual::Player,
            behavior: Behavior::Player { on_ground: false },
            velocity: Some(Velocity::default()),
            facing: Some(Facing::RIGHT),
            health: None,
            owner: None,
        }
    }

    /// A patrolling enemy walking along `direction` at the configured speed.
    pub fn enemy(x: i32, y: i32, direction: Facing, config: &GameConfig) -> Self {
        let speed = config.enemy.speed as f32;
        Self {
            x,
            y,
            size: config.enemy.size,
            visual: Visual::Enemy,
            behavior: Behavior::Patrol,
            velocity: Some(Velocity {
                vx: direction.dx as f32 * speed,
                vy: direction.dy as f32 * speed,
            }),
            facing: Some(direction),
            health: Some(Health::full(config.enemy.hit_points)),
            owner: None,
        }
    }

    /// A shot spawned at `owner_rect` plus the configured offset.
    pub fn bullet(owner: EntityId, owner_rect: Rect, direction: Facing, config: &GameConfig) -> Self {
        let offset = config.bullet.spawn_offset;
        Self {
            x: owner_rect.x + offset,
            y: owner_rect.y + offset,
            size: config.bullet.size,
            visual: Visual::Bullet,
            behavior: Behavior::Projectile {
                speed: config.bullet.speed,
                damage: config.bullet.damage,
            },
            velocity: None,
            facing: Some(direction),
            health: None,
            owner: Some(owner),
        }
    }

    /// A solid block that is not part of the tile grid.
    pub fn block(x: i32, y: i32, size: i32) -> Self {
        Self::inert(x, y, size, Visual::Block)
    }

    /// The HUD status bar.
    pub fn bar(x: i32, y: i32) -> Self {
        Self::inert(x, y, 50, Visual::Bar)
    }

    fn inert(x: i32, y: i32, size: i32, visual: Visual) -> Self {
        Self {
            x,
            y,
            size,
            visual,
            behavior: Behavior::Inert,
            velocity: None,
            facing: None,
            health: None,
            owner: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// The group tags the engine registers at startup.
#[derive(Debug, Clone, Copy)]
pub struct Groups {
    pub update: GroupId,
    pub render: GroupId,
    pub wall: GroupId,
    pub bullet: GroupId,
    pub enemy: GroupId,
    pub bar: GroupId,
}

impl Groups {
    pub fn register(registry: &mut Registry<Entity>) -> Result<Self, RegistryError> {
        Ok(Self {
            update: registry.register_group("update")?,
            render: registry.register_group("render")?,
            wall: registry.register_group("wall")?,
            bullet: registry.register_group("bullet")?,
            enemy: registry.register_group("enemy")?,
            bar: registry.register_group("bar")?,
        })
    }

    pub fn player(&self) -> [GroupId; 2] {
        [self.update, self.render]
    }

    pub fn enemy(&self) -> [GroupId; 3] {
        [self.update, self.render, self.enemy]
    }

    pub fn bullet(&self) -> [GroupId; 3] {
        [self.update, self.render, self.bullet]
    }

    pub fn block(&self) -> [GroupId; 2] {
        [self.wall, self.render]
    }

    pub fn bar(&self) -> [GroupId; 3] {
        [self.update, self.render, self.bar]
    }
}
