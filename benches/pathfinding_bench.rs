use criterion::{black_box, criterion_group, criterion_main, Criterion};
use plunder::core::config::SimulationConfig;
use plunder::core::types::{seeded_rng, TilePos};
use plunder::generation::{generate_building, generate_island};
use plunder::navigation::find_path;
use plunder::spatial::TileGrid;

fn open_grid(size: usize) -> TileGrid<bool> {
    TileGrid::new(size, size, true)
}

/// Serpentine walls with alternating gaps, so the route snakes the whole grid
fn maze_grid(size: usize) -> TileGrid<bool> {
    let mut grid = TileGrid::new(size, size, true);
    for y in (1..size).step_by(2) {
        for x in 0..size {
            let gap = if (y / 2) % 2 == 0 { size - 1 } else { 0 };
            if x != gap {
                grid.set(TilePos::new(x as i32, y as i32), false);
            }
        }
    }
    grid
}

fn bench_bfs(c: &mut Criterion) {
    let mut group = c.benchmark_group("navigation/bfs");

    let open = open_grid(64);
    let far = TilePos::new(63, 63);
    group.bench_function("open_64_corner_to_corner", |b| {
        b.iter(|| {
            let path = find_path(&open, TilePos::new(0, 0), far, |_, &walkable| walkable);
            black_box(path.len());
        })
    });

    let maze = maze_grid(64);
    let end = TilePos::new(0, 62);
    group.bench_function("maze_64_serpentine", |b| {
        b.iter(|| {
            let path = find_path(&maze, TilePos::new(0, 0), end, |_, &walkable| walkable);
            black_box(path.len());
        })
    });

    let config = SimulationConfig::default();
    let island = generate_island(5, &config.island, &mut seeded_rng(3));
    let (spawn, exit) = (island.spawn, island.exit);
    group.bench_function("island_spawn_to_exit", |b| {
        b.iter(|| {
            let path = island.level.find_path(spawn, exit);
            black_box(path.len());
        })
    });

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let mut group = c.benchmark_group("generation");

    group.bench_function("island_difficulty_5", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            let layout = generate_island(5, &config.island, &mut seeded_rng(seed));
            black_box(layout.enemy_spawns.len());
        })
    });

    group.bench_function("building_shift_3", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            let layout = generate_building(3, &config.building, &mut seeded_rng(seed));
            black_box(layout.level.rooms.len());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_bfs, bench_generation);
criterion_main!(benches);
