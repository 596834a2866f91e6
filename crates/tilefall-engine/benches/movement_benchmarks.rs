//! Movement resolver benchmarks.
//!
//! Unit stepping costs one collider query per pixel moved, so resolver time
//! should grow linearly with `|dx| + |dy|` and with the number of wall
//! entities each query scans. These benchmarks show both.
//!
//! Run with: `cargo bench --bench movement_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tilefall_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A 100 x 100 tile grid, empty except for its border.
fn open_field() -> TileMap {
    const N: usize = 100;
    let rows: Vec<String> = (0..N)
        .map(|y| {
            (0..N)
                .map(|x| if x == 0 || y == 0 || x == N - 1 || y == N - 1 { '1' } else { '0' })
                .collect()
        })
        .collect();
    TileMap::parse(&rows, 20).unwrap()
}

fn registry_with_blocks(count: usize) -> (Registry<Entity>, Groups) {
    let mut registry = Registry::new();
    let groups = Groups::register(&mut registry).unwrap();
    for i in 0..count {
        let i = i as i32;
        // Scattered along the bottom, out of the mover's path.
        registry
            .add(Entity::block(40 + (i % 90) * 20, 1900, 20), &groups.block())
            .unwrap();
    }
    (registry, groups)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_resolve_by_distance(c: &mut Criterion) {
    let map = open_field();
    let mut group = c.benchmark_group("resolve_tiles_only");

    for &delta in &[1i32, 10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(delta), &delta, |b, &delta| {
            let start = Rect::new(40, 40, 19);
            b.iter(|| black_box(resolve(&map, black_box(start), delta, delta)));
        });
    }
    group.finish();
}

fn bench_resolve_with_wall_entities(c: &mut Criterion) {
    let map = open_field();
    let mut group = c.benchmark_group("resolve_with_walls");

    for &walls in &[0usize, 10, 100, 500] {
        let (registry, groups) = registry_with_blocks(walls);
        group.bench_with_input(BenchmarkId::from_parameter(walls), &walls, |b, _| {
            let obstacles = Obstacles::new(&map, &registry, groups.wall);
            let start = Rect::new(40, 40, 19);
            b.iter(|| black_box(resolve(&obstacles, black_box(start), 100, 100)));
        });
    }
    group.finish();
}

fn bench_full_tick(c: &mut Criterion) {
    c.bench_function("tick_default_level_10_enemies", |b| {
        let mut game = Game::with_default_level(GameConfig::default()).unwrap();
        game.spawn_player(40, 40).unwrap();
        for i in 0..10 {
            game.spawn_enemy(20 + i * 30, 60, Facing::RIGHT).unwrap();
        }
        let fire = game.config().keys.fire;
        game.tick(&[InputEvent::Pressed(fire)], &mut NullSink).unwrap();
        b.iter(|| black_box(game.tick(&[], &mut NullSink).unwrap()));
    });
}

// ---------------------------------------------------------------------------
// Criterion groups and main
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_resolve_by_distance,
    bench_resolve_with_wall_entities,
    bench_full_tick,
);
criterion_main!(benches);
