//! Firing, projectile travel and damage.

use tilefall_ecs::prelude::*;
use tracing::debug;

use crate::config::GameConfig;
use crate::entity::{Behavior, Entity, Groups};
use crate::input::Controls;
use crate::tick::TickClock;
use crate::tilemap::TileMap;
use crate::EngineError;

// ---------------------------------------------------------------------------
// hurt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HurtOutcome {
    /// Hit points dropped but stayed at or above zero.
    Damaged { remaining: i32 },
    /// Hit points went negative and the entity was removed.
    Killed { remaining: i32 },
}

/// Subtract `amount` hit points from `id`, removing it once they go below
/// zero. Exactly zero hit points is still alive.
///
/// # Errors
///
/// [`EngineError::NotDamageable`] if the entity has no hit points, and a
/// registry error if `id` is not live. Both are caller bugs.
pub fn hurt(registry: &mut Registry<Entity>, id: EntityId, amount: i32) -> Result<HurtOutcome, EngineError> {
    let entity = registry.get_mut(id).ok_or_else(|| EngineError::not_live(id))?;
    let health = entity.health.as_mut().ok_or(EngineError::NotDamageable(id))?;
    health.current -= amount;
    let remaining = health.current;

    if remaining < 0 {
        registry.remove(id)?;
        debug!(entity = %id, hp = remaining, "entity killed");
        Ok(HurtOutcome::Killed { remaining })
    } else {
        debug!(entity = %id, hp = remaining, amount, "entity damaged");
        Ok(HurtOutcome::Damaged { remaining })
    }
}

// ---------------------------------------------------------------------------
// Firing
// ---------------------------------------------------------------------------

/// Spawn a bullet from `owner` if fire is held on a fire-interval tick.
///
/// The bullet copies the owner's current facing; the owner must have one.
pub fn try_fire(
    registry: &mut Registry<Entity>,
    groups: &Groups,
    config: &GameConfig,
    clock: &TickClock,
    owner_id: EntityId,
    owner: &Entity,
    controls: Controls,
) -> Result<Option<EntityId>, EngineError> {
    if !controls.fire || !clock.every(config.player.fire_interval) {
        return Ok(None);
    }
    let facing = owner.facing.ok_or(EngineError::MissingCapability {
        entity: owner_id,
        capability: "facing",
    })?;

    let bullet = Entity::bullet(owner_id, owner.rect(), facing, config);
    let id = registry.add(bullet, &groups.bullet())?;
    debug!(owner = %owner_id, bullet = %id, tick = clock.current(), "fired");
    Ok(Some(id))
}

// ---------------------------------------------------------------------------
// Bullet travel
// ---------------------------------------------------------------------------

/// What became of a bullet this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletFate {
    Flying,
    /// Hit a wall or tile, or left the world; removed without dealing damage.
    Expired,
    /// Damaged `target` and was removed.
    Hit { target: EntityId, outcome: HurtOutcome },
}

/// Move a bullet by `facing * speed` in one jump and resolve its contacts.
///
/// Walls and bounds are checked before enemies; a bullet that expires never
/// damages anything. Otherwise the first overlapping enemy in slot order
/// takes the bullet's damage, and the bullet is removed with it.
pub fn step_bullet(
    registry: &mut Registry<Entity>,
    map: &TileMap,
    groups: &Groups,
    config: &GameConfig,
    id: EntityId,
) -> Result<BulletFate, EngineError> {
    let bullet = registry.get_mut(id).ok_or_else(|| EngineError::not_live(id))?;
    let Behavior::Projectile { speed, damage } = bullet.behavior else {
        return Err(EngineError::MissingCapability {
            entity: id,
            capability: "projectile behavior",
        });
    };
    let facing = bullet.facing.ok_or(EngineError::MissingCapability {
        entity: id,
        capability: "facing",
    })?;
    let rect = bullet.rect().offset(facing.dx * speed, facing.dy * speed);
    bullet.set_position(rect);

    let blocked = map.overlaps(&rect)
        || registry.any(&Query::in_group(groups.wall).filter(|_, wall: &Entity| wall.rect().intersects(&rect)));
    if blocked || !config.world.contains(rect.x, rect.y) {
        registry.remove(id)?;
        debug!(bullet = %id, x = rect.x, y = rect.y, "bullet expired");
        return Ok(BulletFate::Expired);
    }

    let target = registry.first(
        &Query::in_group(groups.enemy).filter(|_, enemy: &Entity| enemy.rect().intersects(&rect)),
    );
    match target {
        Some(target) => {
            let outcome = hurt(registry, target, damage)?;
            registry.remove(id)?;
            debug!(bullet = %id, target = %target, "bullet hit");
            Ok(BulletFate::Hit { target, outcome })
        }
        None => Ok(BulletFate::Flying),
    }
}
