//! Building floor plans: binary space partitioning plus union-find corridors
//!
//! The interior is split recursively into regions, each shrunk by a tile to
//! leave a wall ring. The room nearest the middle becomes the vault. Room
//! pairs are joined closest-first, Kruskal style, with occasional redundant
//! links so the plan has loops; each link is an L-shaped corridor with at most
//! one door where the corridor passes through a wall.

use rand::Rng;

use crate::core::config::BuildingConfig;
use crate::core::types::{RoomId, SimRng, TilePos};
use crate::spatial::grid::TileGrid;
use crate::world::door::Door;
use crate::world::level::{BuildingLayout, EntryPoint, Level};
use crate::world::room::{letter_name, Rect, Room, RoomKind};
use crate::world::tiles::BuildingTile;

/// Hand-authored plan used when partitioning under-produces
const FALLBACK_WIDTH: usize = 30;
const FALLBACK_HEIGHT: usize = 25;

const FALLBACK_ROOMS: [(i32, i32, i32, i32, &str); 9] = [
    (2, 2, 7, 5, "Lobby"),
    (12, 2, 6, 5, "Office A"),
    (21, 2, 6, 5, "Office B"),
    (2, 10, 6, 6, "Storage"),
    (11, 9, 8, 7, "VAULT"),
    (22, 10, 6, 6, "Server Room"),
    (2, 19, 7, 4, "Break Room"),
    (12, 19, 6, 4, "Utility"),
    (21, 19, 6, 4, "Loading Dock"),
];

const FALLBACK_VAULT: usize = 4;

const FALLBACK_LINKS: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (0, 3),
    (3, 4),
    (4, 5),
    (2, 5),
    (3, 6),
    (4, 7),
    (5, 8),
    (6, 7),
    (7, 8),
    (1, 4),
];

const FALLBACK_ENTRY_ROOMS: [usize; 3] = [0, 2, 8];

/// Disjoint-set over room indices
#[derive(Debug, Clone)]
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Returns false when already joined
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// Generate the floor plan for a heist shift (`shift >= 1`)
pub fn generate_building(shift: u32, config: &BuildingConfig, rng: &mut SimRng) -> BuildingLayout {
    let width = config.width as i32;
    let height = config.height as i32;
    let depth = config.base_depth + shift.min(3);

    let mut regions = Vec::new();
    split_space(Rect::new(1, 1, width - 2, height - 2), depth, config, rng, &mut regions);

    let mut grid = TileGrid::new(width as usize, height as usize, BuildingTile::Wall);
    let mut rooms = Vec::new();
    for region in regions {
        let rect = Rect::new(region.x + 1, region.y + 1, region.w - 2, region.h - 2);
        if rect.w < 3 || rect.h < 3 {
            continue;
        }
        let id = RoomId(rooms.len() as u32);
        grid.fill_rect(rect.x, rect.y, rect.w, rect.h, BuildingTile::Floor);
        rooms.push(Room::new(id, rect, letter_name(id.index())));
    }

    if rooms.len() < config.min_rooms {
        tracing::warn!(rooms = rooms.len(), shift, "partition under-produced, using fixed floor plan");
        return fallback_building(shift);
    }

    let mut level = Level::new(grid, 1.0);
    level.rooms = rooms;

    let vault_idx = central_room(&level.rooms, width, height);
    let vault = mark_vault(&mut level, vault_idx);

    connect_rooms(&mut level, config.extra_connection_chance, rng);

    let entry_count = 2 + shift.saturating_sub(1).min(2) as usize;
    let mut candidates: Vec<usize> = (0..level.rooms.len()).filter(|&i| i != vault_idx).collect();
    candidates.sort_by_key(|&i| level.rooms[i].rect.edge_distance(width, height));
    let entries = place_entries(&mut level, &candidates, entry_count);

    tracing::debug!(
        shift,
        rooms = level.rooms.len(),
        doors = level.doors.len(),
        entries = entries.len(),
        "building generated"
    );

    BuildingLayout {
        level,
        shift,
        vault,
        entries,
        used_fallback: false,
    }
}

/// Recursive binary partition of `region` into leaf rectangles
fn split_space(region: Rect, depth: u32, config: &BuildingConfig, rng: &mut SimRng, out: &mut Vec<Rect>) {
    if depth == 0 || region.w < config.min_splittable || region.h < config.min_splittable {
        out.push(region);
        return;
    }

    // Cut across the longer side; square regions pick at random
    let horizontal_cut = match region.w.cmp(&region.h) {
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Equal => rng.gen_bool(0.5),
    };
    let ratio = config.split_min + rng.gen::<f64>() * (config.split_max - config.split_min);
    let side = if horizontal_cut { region.h } else { region.w };
    let split = (side as f64 * ratio).floor() as i32;
    if split < config.min_split_side || side - split < config.min_split_side {
        out.push(region);
        return;
    }

    let (first, second) = if horizontal_cut {
        (
            Rect::new(region.x, region.y, region.w, split),
            Rect::new(region.x, region.y + split, region.w, region.h - split),
        )
    } else {
        (
            Rect::new(region.x, region.y, split, region.h),
            Rect::new(region.x + split, region.y, region.w - split, region.h),
        )
    };
    split_space(first, depth - 1, config, rng, out);
    split_space(second, depth - 1, config, rng, out);
}

/// Room whose center is nearest the grid center; the first one wins ties
fn central_room(rooms: &[Room], width: i32, height: i32) -> usize {
    // Doubled coordinates keep half-tile centers exact
    let score = |r: &Rect| (2 * r.x + r.w - width).abs() + (2 * r.y + r.h - height).abs();
    let mut best = 0;
    for (i, room) in rooms.iter().enumerate() {
        if score(&room.rect) < score(&rooms[best].rect) {
            best = i;
        }
    }
    best
}

fn mark_vault(level: &mut Level<BuildingTile>, idx: usize) -> TilePos {
    let room = &mut level.rooms[idx];
    room.kind = RoomKind::Vault;
    room.name = "VAULT".to_string();
    let center = room.center();
    level.grid.set(center, BuildingTile::Vault);
    center
}

/// Closest-first union-find linking, redundant links by chance, then a sweep
/// that attaches anything still outside the component of room 0
fn connect_rooms(level: &mut Level<BuildingTile>, extra_chance: f64, rng: &mut SimRng) {
    let n = level.rooms.len();
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            pairs.push((i, j, level.rooms[i].rect.manhattan_to(&level.rooms[j].rect)));
        }
    }
    pairs.sort_by_key(|&(_, _, d)| d);

    let mut sets = UnionFind::new(n);
    for (i, j, _) in pairs {
        let joined = sets.union(i, j);
        if !joined && !rng.gen_bool(extra_chance.clamp(0.0, 1.0)) {
            continue;
        }
        let (a, b) = (level.rooms[i].rect, level.rooms[j].rect);
        carve_link(level, &a, &b);
    }

    for i in 1..n {
        if sets.find(i) == sets.find(0) {
            continue;
        }
        let root = sets.find(0);
        let nearest = (0..n)
            .filter(|&k| k != i && sets.find(k) == root)
            .min_by_key(|&k| level.rooms[i].rect.manhattan_to(&level.rooms[k].rect));
        if let Some(k) = nearest {
            let (a, b) = (level.rooms[i].rect, level.rooms[k].rect);
            carve_link(level, &a, &b);
            sets.union(i, k);
        }
    }
}

fn carve_link(level: &mut Level<BuildingTile>, a: &Rect, b: &Rect) {
    if let Some(pos) = carve_corridor(&mut level.grid, a, b) {
        level.doors.insert(Door::new(pos));
    }
}

/// L-shaped corridor: along `b`'s row, then along `a`'s column. Only walls
/// are converted. The first valid door position on the column segment, else on
/// the row segment, becomes a door.
fn carve_corridor(grid: &mut TileGrid<BuildingTile>, a: &Rect, b: &Rect) -> Option<TilePos> {
    let ac = a.center();
    let bc = b.center();
    let (x0, x1) = (ac.x.min(bc.x), ac.x.max(bc.x));
    let (y0, y1) = (ac.y.min(bc.y), ac.y.max(bc.y));

    let row: Vec<TilePos> = (x0..=x1).map(|x| TilePos::new(x, bc.y)).collect();
    let column: Vec<TilePos> = (y0..=y1).map(|y| TilePos::new(ac.x, y)).collect();

    for pos in row.iter().chain(column.iter()) {
        if grid.get(*pos) == Some(&BuildingTile::Wall) {
            grid.set(*pos, BuildingTile::Corridor);
        }
    }

    let door = column
        .iter()
        .chain(row.iter())
        .copied()
        .find(|&pos| is_door_candidate(grid, pos))?;
    grid.set(door, BuildingTile::Door);
    Some(door)
}

/// A corridor tile flanked by walls on two opposite sides, away from the border
fn is_door_candidate(grid: &TileGrid<BuildingTile>, pos: TilePos) -> bool {
    let w = grid.width() as i32;
    let h = grid.height() as i32;
    if pos.x <= 0 || pos.y <= 0 || pos.x >= w - 1 || pos.y >= h - 1 {
        return false;
    }
    if grid.get(pos) != Some(&BuildingTile::Corridor) {
        return false;
    }
    let is_wall = |p: TilePos| grid.get(p) == Some(&BuildingTile::Wall);
    let [n, e, s, west] = pos.neighbors4();
    (is_wall(n) && is_wall(s)) || (is_wall(e) && is_wall(west))
}

fn place_entries(level: &mut Level<BuildingTile>, rooms: &[usize], count: usize) -> Vec<EntryPoint> {
    let mut entries = Vec::new();
    for &idx in rooms.iter().take(count) {
        let room = &level.rooms[idx];
        let pos = room.center();
        let id = room.id;
        level.grid.set(pos, BuildingTile::Entry);
        entries.push(EntryPoint { pos, room: id });
    }
    entries
}

/// The fixed nine-room plan
pub fn fallback_building(shift: u32) -> BuildingLayout {
    let grid = TileGrid::new(FALLBACK_WIDTH, FALLBACK_HEIGHT, BuildingTile::Wall);
    let mut level = Level::new(grid, 1.0);

    for (i, &(x, y, w, h, name)) in FALLBACK_ROOMS.iter().enumerate() {
        let rect = Rect::new(x, y, w, h);
        level.grid.fill_rect(x, y, w, h, BuildingTile::Floor);
        let mut room = Room::new(RoomId(i as u32), rect, name);
        if i == FALLBACK_VAULT {
            room.kind = RoomKind::Vault;
        }
        level.rooms.push(room);
    }
    let vault = mark_vault(&mut level, FALLBACK_VAULT);

    for (a, b) in FALLBACK_LINKS {
        let (ra, rb) = (level.rooms[a].rect, level.rooms[b].rect);
        carve_link(&mut level, &ra, &rb);
    }

    let entry_count = 2 + shift.saturating_sub(1).min(1) as usize;
    let entries = place_entries(&mut level, &FALLBACK_ENTRY_ROOMS, entry_count);

    BuildingLayout {
        level,
        shift,
        vault,
        entries,
        used_fallback: true,
    }
}
