//! Render pass and the sink contract.
//!
//! The engine never draws pixels. Each tick it hands a [`RenderSink`] one
//! `(visual, x, y, size)` request per solid tile, then one per
//! `"render"`-tagged entity in slot order. What a [`Visual`] looks like is up
//! to the sink.

use serde::{Deserialize, Serialize};
use tilefall_ecs::prelude::*;

use crate::entity::{Entity, Visual};
use crate::tilemap::TileMap;

/// Receiver of draw requests.
pub trait RenderSink {
    fn draw(&mut self, visual: Visual, x: i32, y: i32, size: i32);
}

/// One recorded draw request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCall {
    pub visual: Visual,
    pub x: i32,
    pub y: i32,
    pub size: i32,
}

/// Keeps every request until [`RecordingSink::clear`]. Useful headless and in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    calls: Vec<DrawCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Calls for one visual kind, in draw order.
    pub fn of(&self, visual: Visual) -> impl Iterator<Item = &DrawCall> + '_ {
        self.calls.iter().filter(move |c| c.visual == visual)
    }
}

impl RenderSink for RecordingSink {
    fn draw(&mut self, visual: Visual, x: i32, y: i32, size: i32) {
        self.calls.push(DrawCall { visual, x, y, size });
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn draw(&mut self, _visual: Visual, _x: i32, _y: i32, _size: i32) {}
}

/// Draw the tile layer, then every entity in `render_group`. Returns the
/// number of draw requests issued.
pub fn render_frame<S: RenderSink + ?Sized>(
    map: &TileMap,
    registry: &Registry<Entity>,
    render_group: GroupId,
    sink: &mut S,
) -> usize {
    let tile = map.tile_size();
    let mut drawn = 0;
    for (tx, ty) in map.solid_tiles() {
        sink.draw(Visual::Tile, tx * tile, ty * tile, tile);
        drawn += 1;
    }
    for id in registry.query_group(render_group) {
        if let Some(entity) = registry.get(id) {
            sink.draw(entity.visual, entity.x, entity.y, entity.size);
            drawn += 1;
        }
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Groups;

    #[test]
    fn tiles_are_drawn_before_entities() {
        let map = TileMap::parse(&["10", "01"], 20).unwrap();
        let mut reg = Registry::new();
        let groups = Groups::register(&mut reg).unwrap();
        reg.add(Entity::block(5, 5, 10), &groups.block()).unwrap();
        reg.add(Entity::block(60, 5, 10), &[groups.wall]).unwrap();

        let mut sink = RecordingSink::new();
        let drawn = render_frame(&map, &reg, groups.render, &mut sink);
        assert_eq!(drawn, 3);
        assert_eq!(
            sink.calls(),
            &[
                DrawCall { visual: Visual::Tile, x: 0, y: 0, size: 20 },
                DrawCall { visual: Visual::Tile, x: 20, y: 20, size: 20 },
                DrawCall { visual: Visual::Block, x: 5, y: 5, size: 10 },
            ]
        );
        assert_eq!(sink.of(Visual::Tile).count(), 2);
    }

    #[test]
    fn recording_sink_accumulates_until_cleared() {
        let map = TileMap::parse(&["10"], 20).unwrap();
        let reg: Registry<Entity> = Registry::new();
        let mut sink = RecordingSink::new();
        render_frame(&map, &reg, GroupId::ALL, &mut sink);
        render_frame(&map, &reg, GroupId::ALL, &mut sink);
        assert_eq!(sink.calls().len(), 2);

        sink.clear();
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn null_sink_still_counts() {
        let map = TileMap::parse(&["11"], 20).unwrap();
        let reg: Registry<Entity> = Registry::new();
        assert_eq!(render_frame(&map, &reg, GroupId::ALL, &mut NullSink), 2);
    }
}
