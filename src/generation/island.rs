//! Island generation: noise-thresholded landmass with walled structures
//!
//! The landmass is an ellipse whose normalized radial distance is perturbed by
//! three sine waves and cut into jungle, grass and beach bands. Structures are
//! placed by capped rejection sampling, joined in placement order by L-shaped
//! trails that only cut through natural terrain, and finally any structure the
//! spawn cannot reach gets a trail carved across the water to the main island.

use std::collections::VecDeque;

use rand::Rng;

use crate::core::config::IslandConfig;
use crate::core::types::{RoomId, SimRng, TilePos};
use crate::navigation::pathfinding::distance_field;
use crate::spatial::grid::TileGrid;
use crate::world::level::{IslandLayout, Level, SpawnPoint};
use crate::world::room::{letter_name, Rect, Room, RoomKind};
use crate::world::tiles::{IslandTile, Tile};

/// Structures never start closer than this to the map edge
const EDGE_CLEARANCE: i32 = 3;

/// Structure placed when sampling produced nothing
const FALLBACK_SIZE: (i32, i32) = (7, 5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    fn from_index(i: u32) -> Self {
        match i % 4 {
            0 => Side::Top,
            1 => Side::Right,
            2 => Side::Bottom,
            _ => Side::Left,
        }
    }

    fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }
}

fn jitter(rng: &mut SimRng, span: u32) -> u32 {
    if span == 0 {
        0
    } else {
        rng.gen_range(0..span)
    }
}

/// Generate one island level. `config` is expected to have passed validation.
pub fn generate_island(difficulty: u32, config: &IslandConfig, rng: &mut SimRng) -> IslandLayout {
    let width = (config.base_width + jitter(rng, config.width_jitter)) as i32;
    let height = (config.base_height + jitter(rng, config.height_jitter)) as i32;

    let mut grid = rasterize_landmass(width, height, config, rng);
    let mut rooms = place_structures(&mut grid, difficulty, config, rng);

    let used_fallback = rooms.is_empty();
    if used_fallback {
        tracing::warn!(width, height, "no island structure placed, using central fallback");
        rooms.push(fallback_structure(&mut grid));
    }

    for pair in rooms.windows(2) {
        carve_trail(&mut grid, &pair[0].rect, &pair[1].rect);
    }

    let spawn = find_spawn(&grid);
    let repaired_tiles = repair_connectivity(&mut grid, &rooms, spawn);
    if repaired_tiles > 0 {
        tracing::debug!(repaired_tiles, "bridged isolated structures");
    }

    // Exit and treasure live in the last structure placed
    let exit = match rooms.last_mut() {
        Some(last) => {
            last.kind = RoomKind::Treasure;
            last.name = "Treasure Hold".to_string();
            last.center()
        }
        None => spawn,
    };

    let mut chests = vec![exit];
    let treasure_idx = rooms.len().saturating_sub(1);
    for room in &rooms[..treasure_idx] {
        if rng.gen_bool(config.chest_chance.clamp(0.0, 1.0)) {
            chests.push(random_interior(&room.rect, rng));
        }
    }

    let enemy_spawns = place_enemy_spawns(&grid, &rooms, difficulty, rng);

    let mut level = Level::new(grid, config.tile_size);
    level.rooms = rooms;

    tracing::debug!(
        width,
        height,
        rooms = level.rooms.len(),
        enemies = enemy_spawns.len(),
        "island generated"
    );

    IslandLayout {
        level,
        difficulty,
        spawn,
        exit,
        chests,
        enemy_spawns,
        used_fallback,
        repaired_tiles,
    }
}

/// Elliptical landmass banded by noisy radial distance
fn rasterize_landmass(
    width: i32,
    height: i32,
    config: &IslandConfig,
    rng: &mut SimRng,
) -> TileGrid<IslandTile> {
    let mut grid = TileGrid::new(width as usize, height as usize, IslandTile::Water);
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let rx = cx - 4.0;
    let ry = cy - 4.0;
    let seed = rng.gen::<f32>() * 1000.0;

    for y in 0..height {
        for x in 0..width {
            let dx = (x as f32 - cx) / rx;
            let dy = (y as f32 - cy) / ry;
            let radial = dx * dx + dy * dy;
            let noise = (x as f32 * 0.3 + seed).sin() * 0.15
                + (y as f32 * 0.4 + seed * 2.0).sin() * 0.12
                + ((x + y) as f32 * 0.2 + seed * 3.0).sin() * 0.1;
            let value = radial + noise;

            let tile = if value < config.jungle_threshold {
                IslandTile::Jungle
            } else if value < config.grass_threshold {
                IslandTile::Grass
            } else if value < config.sand_threshold {
                IslandTile::Sand
            } else {
                IslandTile::Water
            };
            grid.set(TilePos::new(x, y), tile);
        }
    }
    grid
}

/// Rejection-sample structures around the island center
fn place_structures(
    grid: &mut TileGrid<IslandTile>,
    difficulty: u32,
    config: &IslandConfig,
    rng: &mut SimRng,
) -> Vec<Room> {
    let width = grid.width() as i32;
    let height = grid.height() as i32;
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;

    let target = 3 + (difficulty / 2) as usize;
    let attempts = target * config.attempts_per_room as usize;
    let mut rooms: Vec<Room> = Vec::with_capacity(target);

    for _ in 0..attempts {
        if rooms.len() >= target {
            break;
        }
        let rw = 5 + rng.gen_range(0..4);
        let rh = 4 + rng.gen_range(0..4);
        let x = (cx - 12.0 + rng.gen::<f32>() * 24.0).floor() as i32;
        let y = (cy - 10.0 + rng.gen::<f32>() * 16.0).floor() as i32;
        let rect = Rect::new(x, y, rw, rh);

        if x < EDGE_CLEARANCE
            || y < EDGE_CLEARANCE
            || rect.right() >= width - EDGE_CLEARANCE
            || rect.bottom() >= height - EDGE_CLEARANCE
        {
            continue;
        }
        let padded = rect.expanded(config.room_margin);
        if rooms.iter().any(|r| padded.intersects(&r.rect)) {
            continue;
        }
        if grid.get(rect.center()) == Some(&IslandTile::Water) {
            continue;
        }

        let id = RoomId(rooms.len() as u32);
        carve_structure(grid, &rect);
        let first = Side::from_index(rng.gen_range(0..4));
        punch_door(grid, &rect, first, rng);
        if rng.gen_bool(config.second_door_chance.clamp(0.0, 1.0)) {
            punch_door(grid, &rect, first.opposite(), rng);
        }
        rooms.push(Room::new(id, rect, letter_name(id.index())));
    }

    rooms
}

fn carve_structure(grid: &mut TileGrid<IslandTile>, rect: &Rect) {
    for pos in rect.tiles() {
        let on_edge = pos.x == rect.x
            || pos.x == rect.right() - 1
            || pos.y == rect.y
            || pos.y == rect.bottom() - 1;
        grid.set(pos, if on_edge { IslandTile::Wall } else { IslandTile::Wood });
    }
}

/// Open a doorway somewhere along one side, never on a corner
fn punch_door(grid: &mut TileGrid<IslandTile>, rect: &Rect, side: Side, rng: &mut SimRng) -> TilePos {
    let along_x = rect.x + 1 + rng.gen_range(0..(rect.w - 2).max(1));
    let along_y = rect.y + 1 + rng.gen_range(0..(rect.h - 2).max(1));
    let pos = match side {
        Side::Top => TilePos::new(along_x, rect.y),
        Side::Right => TilePos::new(rect.right() - 1, along_y),
        Side::Bottom => TilePos::new(along_x, rect.bottom() - 1),
        Side::Left => TilePos::new(rect.x, along_y),
    };
    grid.set(pos, IslandTile::Path);
    pos
}

fn fallback_structure(grid: &mut TileGrid<IslandTile>) -> Room {
    let (w, h) = FALLBACK_SIZE;
    let center = TilePos::new(grid.width() as i32 / 2, grid.height() as i32 / 2);
    let rect = Rect::new(center.x - w / 2, center.y - h / 2, w, h);
    carve_structure(grid, &rect);
    grid.set(TilePos::new(rect.center().x, rect.bottom() - 1), IslandTile::Path);
    Room::new(RoomId(0), rect, letter_name(0))
}

/// L-shaped trail between structure centers: along the first row, then down
/// the second column. Only natural terrain is converted.
fn carve_trail(grid: &mut TileGrid<IslandTile>, from: &Rect, to: &Rect) {
    let a = from.center();
    let b = to.center();
    let mut convert = |pos: TilePos| {
        if grid.get(pos).is_some_and(|t| t.is_natural_land()) {
            grid.set(pos, IslandTile::Path);
        }
    };

    let mut x = a.x;
    while x != b.x {
        convert(TilePos::new(x, a.y));
        x += if x < b.x { 1 } else { -1 };
    }
    let mut y = a.y;
    while y != b.y {
        convert(TilePos::new(b.x, y));
        y += if y < b.y { 1 } else { -1 };
    }
}

/// Open ground nearest the southern edge, preferring the center column
fn find_spawn(grid: &TileGrid<IslandTile>) -> TilePos {
    let width = grid.width() as i32;
    let height = grid.height() as i32;
    let cx = width / 2;

    for y in (height / 2 + 1..height).rev() {
        let pos = TilePos::new(cx, y);
        if grid
            .get(pos)
            .is_some_and(|t| t.is_natural_land() || *t == IslandTile::Path)
        {
            return pos;
        }
    }

    // Center column is built over or flooded: take the southernmost land anywhere
    for y in (0..height).rev() {
        let best = (0..width)
            .map(|x| TilePos::new(x, y))
            .filter(|p| grid.get(*p).is_some_and(|t| t.is_natural_land()))
            .min_by_key(|p| (p.x - cx).abs());
        if let Some(pos) = best {
            return pos;
        }
    }

    TilePos::new(cx, height / 2)
}

/// Bridge every structure the spawn cannot reach. Returns tiles converted.
fn repair_connectivity(grid: &mut TileGrid<IslandTile>, rooms: &[Room], spawn: TilePos) -> usize {
    let mut converted = 0;
    for room in rooms {
        let reached = distance_field(grid, spawn, |_, t| !t.blocks_route());
        if reached.get(room.center()).copied().flatten().is_some() {
            continue;
        }
        let bridge = bridge_to_reached(grid, &reached, room.center());
        for pos in bridge {
            if grid.get(pos) == Some(&IslandTile::Water) {
                grid.set(pos, IslandTile::Path);
                converted += 1;
            }
        }
    }
    converted
}

/// Shortest route out of a structure, across water if needed, to any tile
/// already connected to the spawn. Walls are never crossed.
fn bridge_to_reached(
    grid: &TileGrid<IslandTile>,
    reached: &TileGrid<Option<u32>>,
    from: TilePos,
) -> Vec<TilePos> {
    let Some(start_idx) = grid.index_of(from) else {
        return Vec::new();
    };
    let mut parent = vec![usize::MAX; grid.len()];
    let mut visited = vec![false; grid.len()];
    visited[start_idx] = true;
    let mut queue = VecDeque::from([start_idx]);

    while let Some(idx) = queue.pop_front() {
        let pos = grid.pos_of(idx);
        if reached.get(pos).copied().flatten().is_some() {
            let mut path = Vec::new();
            let mut cur = idx;
            while cur != start_idx {
                path.push(grid.pos_of(cur));
                cur = parent[cur];
            }
            return path;
        }
        for next in pos.neighbors4() {
            let Some(next_idx) = grid.index_of(next) else {
                continue;
            };
            if visited[next_idx] || grid.get(next) == Some(&IslandTile::Wall) {
                continue;
            }
            visited[next_idx] = true;
            parent[next_idx] = idx;
            queue.push_back(next_idx);
        }
    }
    Vec::new()
}

fn random_interior(rect: &Rect, rng: &mut SimRng) -> TilePos {
    TilePos::new(
        rect.x + 1 + rng.gen_range(0..(rect.w - 2).max(1)),
        rect.y + 1 + rng.gen_range(0..(rect.h - 2).max(1)),
    )
}

fn place_enemy_spawns(
    grid: &TileGrid<IslandTile>,
    rooms: &[Room],
    difficulty: u32,
    rng: &mut SimRng,
) -> Vec<SpawnPoint> {
    let mut spawns = Vec::new();
    for room in rooms {
        let count = 1 + rng.gen_range(0..2) + difficulty * 3 / 10;
        for _ in 0..count {
            spawns.push(SpawnPoint {
                pos: random_interior(&room.rect, rng),
                room: Some(room.id),
            });
        }
    }

    let cx = grid.width() as f32 / 2.0;
    let cy = grid.height() as f32 / 2.0;
    let outdoor = 2 + difficulty / 2;
    for _ in 0..outdoor {
        let pos = TilePos::new(
            (cx - 10.0 + rng.gen::<f32>() * 20.0).floor() as i32,
            (cy - 8.0 + rng.gen::<f32>() * 12.0).floor() as i32,
        );
        if grid.get(pos).is_some_and(|t| t.is_natural_land()) {
            spawns.push(SpawnPoint { pos, room: None });
        }
    }
    spawns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::seeded_rng;

    fn island(seed: u64, difficulty: u32) -> IslandLayout {
        let mut rng = seeded_rng(seed);
        generate_island(difficulty, &IslandConfig::default(), &mut rng)
    }

    #[test]
    fn test_dimensions_in_range() {
        for seed in 0..10 {
            let layout = island(seed, 1);
            assert!((50..60).contains(&layout.level.width()));
            assert!((40..48).contains(&layout.level.height()));
        }
    }

    #[test]
    fn test_same_seed_same_island() {
        let a = island(42, 3);
        let b = island(42, 3);
        assert_eq!(a.level.grid, b.level.grid);
        assert_eq!(a.spawn, b.spawn);
        assert_eq!(a.chests, b.chests);
        assert_eq!(a.enemy_spawns, b.enemy_spawns);
    }

    #[test]
    fn test_structure_count_capped() {
        for seed in 0..20 {
            let layout = island(seed, 4);
            assert!(!layout.level.rooms.is_empty());
            assert!(layout.level.rooms.len() <= 5);
        }
    }

    #[test]
    fn test_structures_have_walls_and_floor() {
        let layout = island(7, 2);
        for room in &layout.level.rooms {
            let r = room.rect;
            let interior = TilePos::new(r.x + 1, r.y + 1);
            assert_eq!(layout.level.tile_at(interior), Some(IslandTile::Wood));
            let corner = TilePos::new(r.x, r.y);
            assert_eq!(layout.level.tile_at(corner), Some(IslandTile::Wall));
        }
    }

    #[test]
    fn test_exit_is_last_structure_center() {
        let layout = island(3, 2);
        let last = layout.level.rooms.last().unwrap();
        assert_eq!(layout.exit, last.center());
        assert_eq!(last.kind, RoomKind::Treasure);
        assert_eq!(layout.chests[0], layout.exit);
    }

    #[test]
    fn test_spawn_is_walkable_land_in_south() {
        for seed in 0..10 {
            let layout = island(seed, 1);
            assert!(layout.level.is_walkable(layout.spawn));
            assert!(layout.spawn.y as usize > layout.level.height() / 2);
        }
    }

    #[test]
    fn test_fallback_structure_when_sampling_fails() {
        let config = IslandConfig::default();
        let mut rng = seeded_rng(5);
        let mut grid = rasterize_landmass(50, 40, &config, &mut rng);
        let room = fallback_structure(&mut grid);
        assert_eq!(room.rect.w, 7);
        assert!(room.rect.contains(TilePos::new(25, 20)));
        let door = TilePos::new(room.rect.center().x, room.rect.bottom() - 1);
        assert_eq!(grid.get(door), Some(&IslandTile::Path));
    }

    #[test]
    fn test_trail_never_cuts_structures() {
        let mut grid = TileGrid::new(20, 10, IslandTile::Grass);
        let a = Rect::new(1, 1, 5, 4);
        let b = Rect::new(12, 4, 5, 4);
        carve_structure(&mut grid, &a);
        carve_structure(&mut grid, &b);
        let walls_before = grid.count(|t| *t == IslandTile::Wall);
        carve_trail(&mut grid, &a, &b);
        assert_eq!(grid.count(|t| *t == IslandTile::Wall), walls_before);
        assert!(grid.count(|t| *t == IslandTile::Path) > 0);
    }
}
