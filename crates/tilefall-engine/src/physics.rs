//! Player control and enemy patrol.
//!
//! Both routines work on a detached copy of the entity: the caller reads it
//! out of the registry, steps it against a [`Collider`] that may borrow the
//! same registry, then writes it back.
//!
//! # Player
//!
//! Velocity is instantaneous on the horizontal axis (`speed * direction`,
//! no inertia) and integrated on the vertical axis:
//!
//! 1. Jump held while grounded sets `vy` to the jump impulse. Jump not held
//!    floors `vy` at zero, cutting an ascent short without touching a fall.
//! 2. Facing follows the sign of a non-zero `vx` and is kept otherwise.
//! 3. The move `(vx, trunc(vy))` is resolved; any vertical contact zeroes
//!    `vy`, and `on_ground` becomes whether that contact was downward.
//! 4. Gravity is added unconditionally. A grounded entity had its `vy`
//!    zeroed by the contact, so it never accumulates speed while resting.
//!
//! # Patrol
//!
//! Enemies move by their velocity with no collision at all, and negate both
//! velocity components when the new position leaves the world bounds.

use tilefall_ecs::prelude::EntityId;

use crate::config::{PlayerConfig, WorldBounds};
use crate::entity::{Behavior, Entity, Facing};
use crate::input::Controls;
use crate::movement::{self, Collider, MoveOutcome};
use crate::EngineError;

/// Advance one player-controlled entity by one tick.
pub fn step_player<C: Collider + ?Sized>(
    id: EntityId,
    player: &mut Entity,
    controls: Controls,
    config: &PlayerConfig,
    collider: &C,
) -> Result<MoveOutcome, EngineError> {
    let Behavior::Player { on_ground } = player.behavior else {
        return Err(EngineError::MissingCapability {
            entity: id,
            capability: "player behavior",
        });
    };
    let mut velocity = player.velocity.ok_or(EngineError::MissingCapability {
        entity: id,
        capability: "velocity",
    })?;

    if controls.jump {
        if on_ground {
            velocity.vy = config.jump_impulse;
        }
    } else {
        velocity.vy = velocity.vy.max(0.0);
    }

    let dx = config.speed * controls.horizontal();
    velocity.vx = dx as f32;
    if dx != 0 {
        player.facing = Some(Facing {
            dx: dx.signum(),
            dy: 0,
        });
    }

    let dy = velocity.vy.trunc() as i32;
    let outcome = movement::resolve(collider, player.rect(), dx, dy);
    player.set_position(outcome.rect);
    if outcome.blocked_y {
        velocity.vy = 0.0;
    }

    velocity.vy += config.gravity;
    player.velocity = Some(velocity);
    player.behavior = Behavior::Player {
        on_ground: outcome.grounded,
    };
    Ok(outcome)
}

/// Advance one patrolling entity. Returns `true` if it bounced this tick.
pub fn step_patrol(id: EntityId, enemy: &mut Entity, bounds: &WorldBounds) -> Result<bool, EngineError> {
    let mut velocity = enemy.velocity.ok_or(EngineError::MissingCapability {
        entity: id,
        capability: "velocity",
    })?;

    enemy.x += velocity.vx.trunc() as i32;
    enemy.y += velocity.vy.trunc() as i32;

    let bounced = !bounds.contains(enemy.x, enemy.y);
    if bounced {
        velocity.vx = -velocity.vx;
        velocity.vy = -velocity.vy;
        enemy.velocity = Some(velocity);
    }
    Ok(bounced)
}
