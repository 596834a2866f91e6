//! Property tests for the movement resolver and the input edge tracker.
//!
//! Random tile grids, random wall blocks and random displacements: a
//! resolved move never ends inside solid geometry, and it stops exactly
//! where a pixel-by-pixel scan of every intermediate position says it must.

use proptest::prelude::*;
use tilefall_engine::prelude::*;

const GRID: usize = 8;
const TILE: i32 = 20;

fn grid_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(prop::bool::weighted(0.25), GRID * GRID)
}

fn build_map(cells: &[bool]) -> TileMap {
    let rows: Vec<String> = cells
        .chunks(GRID)
        .map(|row| row.iter().map(|&solid| if solid { '1' } else { '0' }).collect())
        .collect();
    TileMap::parse(&rows, TILE).unwrap()
}

/// Slide along one axis until the next pixel is blocked.
fn scan_axis(blocked: impl Fn(&Rect) -> bool, start: Rect, delta: i32, horizontal: bool) -> Rect {
    let unit = delta.signum();
    let path: Vec<Rect> = (1..=delta.abs())
        .map(|k| {
            if horizontal {
                start.offset(k * unit, 0)
            } else {
                start.offset(0, k * unit)
            }
        })
        .collect();
    path.iter()
        .take_while(|r| !blocked(r))
        .last()
        .copied()
        .unwrap_or(start)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1_000,
        max_global_rejects: 50_000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn resolved_move_never_ends_in_solid(
        cells in grid_strategy(),
        x in 0i32..160,
        y in 0i32..160,
        size in 1i32..=TILE,
        dx in -80i32..80,
        dy in -80i32..80,
        blocks in prop::collection::vec((0i32..160, 0i32..160, 1i32..=TILE), 0..4),
    ) {
        let map = build_map(&cells);
        let mut registry = Registry::new();
        let groups = Groups::register(&mut registry).unwrap();
        for (bx, by, bs) in blocks {
            registry.add(Entity::block(bx, by, bs), &groups.block()).unwrap();
        }
        let obstacles = Obstacles::new(&map, &registry, groups.wall);

        let start = Rect::new(x, y, size);
        prop_assume!(!obstacles.blocks(&start));

        let out = resolve(&obstacles, start, dx, dy);
        prop_assert!(!obstacles.blocks(&out.rect));
        prop_assert!(!out.grounded || (out.blocked_y && dy > 0));
        prop_assert!((out.rect.x - start.x).abs() <= dx.abs());
        prop_assert!((out.rect.y - start.y).abs() <= dy.abs());
    }

    #[test]
    fn stepping_matches_pixel_scan(
        cells in grid_strategy(),
        x in 0i32..160,
        y in 0i32..160,
        size in 1i32..=TILE,
        dx in -120i32..120,
        dy in -120i32..120,
    ) {
        let map = build_map(&cells);
        let start = Rect::new(x, y, size);
        prop_assume!(!map.overlaps(&start));

        let out = resolve(&map, start, dx, dy);

        let after_x = scan_axis(|r| map.overlaps(r), start, dx, true);
        let after_y = scan_axis(|r| map.overlaps(r), after_x, dy, false);
        prop_assert_eq!(out.rect, after_y);
        prop_assert_eq!(out.blocked_x, after_x.x != start.x + dx);
        prop_assert_eq!(out.blocked_y, after_y.y != after_x.y + dy);
    }

    #[test]
    fn release_edge_is_reported_once_per_cycle(
        script in prop::collection::vec((0u8..3, 0u8..4), 1..60),
    ) {
        // (key, action): 0 press, 1 release, 2-3 consume.
        let mut input = InputTracker::new();
        let mut armed = [false; 3];
        for (key, action) in script {
            let k = Key(u32::from(key));
            match action {
                0 => {
                    input.press(k);
                    armed[key as usize] = true;
                }
                1 => input.release(k),
                _ => {
                    let got = input.consume_release_edge(k);
                    prop_assert_eq!(got, armed[key as usize]);
                    armed[key as usize] = false;
                    // A second read in a row is always empty.
                    prop_assert!(!input.consume_release_edge(k));
                }
            }
        }
    }
}
