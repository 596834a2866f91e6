//! Axis-separated, unit-stepped movement against solid geometry.
//!
//! A displacement `(dx, dy)` is resolved in two passes, horizontal first.
//! Each pass moves the rect one pixel at a time towards the target and asks
//! the [`Collider`] whether the new position is blocked. The first blocked
//! step is undone and the pass ends. Because every intermediate pixel is
//! tested, nothing tunnels through a tile, whatever the speed.
//!
//! The price is `|dx| + |dy|` collider queries per call: a fast entity is
//! proportionally more expensive to move, never less safe.

use tilefall_ecs::prelude::*;

use crate::entity::Entity;
use crate::geometry::Rect;
use crate::tilemap::TileMap;

/// Anything that can say whether a rect is obstructed.
pub trait Collider {
    fn blocks(&self, rect: &Rect) -> bool;
}

impl Collider for TileMap {
    fn blocks(&self, rect: &Rect) -> bool {
        self.overlaps(rect)
    }
}

/// The tile grid plus every `"wall"`-tagged entity except the mover itself.
pub struct Obstacles<'a> {
    map: &'a TileMap,
    registry: &'a Registry<Entity>,
    wall: GroupId,
    mover: Option<EntityId>,
}

impl<'a> Obstacles<'a> {
    pub fn new(map: &'a TileMap, registry: &'a Registry<Entity>, wall: GroupId) -> Self {
        Self {
            map,
            registry,
            wall,
            mover: None,
        }
    }

    /// Ignore `mover` when it is itself tagged `"wall"`.
    #[must_use]
    pub fn excluding(mut self, mover: EntityId) -> Self {
        self.mover = Some(mover);
        self
    }

    /// Whether `rect` touches a wall entity (tiles not included).
    pub fn touches_wall_entity(&self, rect: &Rect) -> bool {
        let mover = self.mover;
        self.registry.any(
            &Query::in_group(self.wall)
                .filter(move |id, wall: &Entity| Some(id) != mover && wall.rect().intersects(rect)),
        )
    }
}

impl Collider for Obstacles<'_> {
    fn blocks(&self, rect: &Rect) -> bool {
        self.map.overlaps(rect) || self.touches_wall_entity(rect)
    }
}

/// Where a resolved move ended and what it ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub rect: Rect,
    pub blocked_x: bool,
    pub blocked_y: bool,
    /// The vertical pass moved down and was stopped. Reflects this call
    /// only, never an earlier one.
    pub grounded: bool,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Resolve `(dx, dy)` for `rect`: full horizontal pass, then vertical.
pub fn resolve<C: Collider + ?Sized>(collider: &C, rect: Rect, dx: i32, dy: i32) -> MoveOutcome {
    let (rect, blocked_x) = step_axis(collider, rect, dx, Axis::X);
    let (rect, blocked_y) = step_axis(collider, rect, dy, Axis::Y);
    MoveOutcome {
        rect,
        blocked_x,
        blocked_y,
        grounded: blocked_y && dy > 0,
    }
}

fn step_axis<C: Collider + ?Sized>(collider: &C, mut rect: Rect, delta: i32, axis: Axis) -> (Rect, bool) {
    let unit = delta.signum();
    for _ in 0..delta.unsigned_abs() {
        let next = match axis {
            Axis::X => rect.offset(unit, 0),
            Axis::Y => rect.offset(0, unit),
        };
        if collider.blocks(&next) {
            return (rect, true);
        }
        rect = next;
    }
    (rect, false)
}
