//! Generated level state and its query surface
//!
//! A `Level` couples the tile grid with the rooms and doors carved into it.
//! All queries are total: positions outside the grid are simply not walkable
//! and have no tile or room.

use serde::Serialize;

use crate::core::types::{RoomId, TilePos, Vec2};
use crate::navigation::pathfinding;
use crate::spatial::grid::TileGrid;
use crate::world::door::DoorSet;
use crate::world::room::{Room, RoomKind};
use crate::world::tiles::{BuildingTile, IslandTile, Tile};

/// Pick progress that opens a locked door unless a level overrides it
pub const DEFAULT_DOOR_THRESHOLD: u32 = 3;

#[derive(Debug, Clone)]
pub struct Level<T: Tile> {
    pub grid: TileGrid<T>,
    pub rooms: Vec<Room>,
    pub doors: DoorSet,
    /// World units per tile, for continuous-space callers
    pub tile_size: f32,
    /// Pick progress at which a locked door stops blocking movement
    pub door_threshold: u32,
}

impl<T: Tile> Level<T> {
    pub fn new(grid: TileGrid<T>, tile_size: f32) -> Self {
        Self {
            grid,
            rooms: Vec::new(),
            doors: DoorSet::new(),
            tile_size,
            door_threshold: DEFAULT_DOOR_THRESHOLD,
        }
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn tile_at(&self, pos: TilePos) -> Option<T> {
        self.grid.get(pos).copied()
    }

    pub fn room_at(&self, pos: TilePos) -> Option<&Room> {
        self.rooms.iter().find(|r| r.contains(pos))
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    pub fn rooms_of_kind(&self, kind: RoomKind) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(move |r| r.kind == kind)
    }

    /// Passable for route planning. Doors count as passable whatever their lock.
    pub fn is_routable(&self, pos: TilePos) -> bool {
        self.grid.get(pos).is_some_and(|t| !t.blocks_route())
    }

    /// Movement legality: routable, and not a locked door below the pick threshold
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        let Some(tile) = self.grid.get(pos) else {
            return false;
        };
        if tile.blocks_route() {
            return false;
        }
        if tile.is_door() {
            if let Some(door) = self.doors.get(pos) {
                return !door.blocks_movement(self.door_threshold);
            }
        }
        true
    }

    pub fn tile_at_world(&self, pos: Vec2) -> Option<T> {
        self.tile_at(TilePos::from_world(pos, self.tile_size))
    }

    pub fn is_walkable_world(&self, pos: Vec2) -> bool {
        self.is_walkable(TilePos::from_world(pos, self.tile_size))
    }

    /// Route between tiles, passing through doors regardless of lock state
    pub fn find_path(&self, start: TilePos, goal: TilePos) -> Vec<TilePos> {
        pathfinding::find_path(&self.grid, start, goal, |_, t| !t.blocks_route())
    }

    /// Route that only uses tiles an agent may legally step on right now
    pub fn find_walkable_path(&self, start: TilePos, goal: TilePos) -> Vec<TilePos> {
        pathfinding::find_path(&self.grid, start, goal, |pos, _| self.is_walkable(pos))
    }
}

/// A position agents appear at, optionally tied to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpawnPoint {
    pub pos: TilePos,
    pub room: Option<RoomId>,
}

/// Island level with its spawn metadata
#[derive(Debug, Clone)]
pub struct IslandLayout {
    pub level: Level<IslandTile>,
    pub difficulty: u32,
    /// Player start, on land nearest the southern edge
    pub spawn: TilePos,
    /// Treasure/exit, at the center of the last placed structure
    pub exit: TilePos,
    pub chests: Vec<TilePos>,
    pub enemy_spawns: Vec<SpawnPoint>,
    /// No structure could be placed and the fixed central one was used
    pub used_fallback: bool,
    /// Water tiles turned into trail to connect isolated structures
    pub repaired_tiles: usize,
}

/// Intruder entry tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryPoint {
    pub pos: TilePos,
    pub room: RoomId,
}

/// Building floor plan with its vault and entries
#[derive(Debug, Clone)]
pub struct BuildingLayout {
    pub level: Level<BuildingTile>,
    pub shift: u32,
    pub vault: TilePos,
    pub entries: Vec<EntryPoint>,
    /// Partitioning under-produced and the hand-authored plan was used
    pub used_fallback: bool,
}

impl BuildingLayout {
    pub fn vault_room(&self) -> Option<&Room> {
        self.level.rooms_of_kind(RoomKind::Vault).next()
    }
}

/// Tile of either vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTile {
    Island(IslandTile),
    Building(BuildingTile),
}

/// Output of level generation
#[derive(Debug, Clone)]
pub enum LevelState {
    Island(IslandLayout),
    Building(BuildingLayout),
}

impl LevelState {
    pub fn tile_at(&self, pos: TilePos) -> Option<LevelTile> {
        match self {
            LevelState::Island(l) => l.level.tile_at(pos).map(LevelTile::Island),
            LevelState::Building(l) => l.level.tile_at(pos).map(LevelTile::Building),
        }
    }

    pub fn room_at(&self, pos: TilePos) -> Option<&Room> {
        match self {
            LevelState::Island(l) => l.level.room_at(pos),
            LevelState::Building(l) => l.level.room_at(pos),
        }
    }

    pub fn rooms(&self) -> &[Room] {
        match self {
            LevelState::Island(l) => &l.level.rooms,
            LevelState::Building(l) => &l.level.rooms,
        }
    }

    pub fn doors(&self) -> &DoorSet {
        match self {
            LevelState::Island(l) => &l.level.doors,
            LevelState::Building(l) => &l.level.doors,
        }
    }

    pub fn is_walkable(&self, pos: TilePos) -> bool {
        match self {
            LevelState::Island(l) => l.level.is_walkable(pos),
            LevelState::Building(l) => l.level.is_walkable(pos),
        }
    }

    pub fn find_path(&self, start: TilePos, goal: TilePos) -> Vec<TilePos> {
        match self {
            LevelState::Island(l) => l.level.find_path(start, goal),
            LevelState::Building(l) => l.level.find_path(start, goal),
        }
    }

    /// Where the player or intruders enter the level
    pub fn spawn_points(&self) -> Vec<TilePos> {
        match self {
            LevelState::Island(l) => vec![l.spawn],
            LevelState::Building(l) => l.entries.iter().map(|e| e.pos).collect(),
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            LevelState::Island(l) => (l.level.width(), l.level.height()),
            LevelState::Building(l) => (l.level.width(), l.level.height()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::door::Door;
    use crate::world::room::Rect;

    /// Two rooms joined through a door at (4, 2)
    fn corridor_level() -> Level<BuildingTile> {
        let mut grid = TileGrid::new(9, 5, BuildingTile::Wall);
        grid.fill_rect(1, 1, 3, 3, BuildingTile::Floor);
        grid.fill_rect(5, 1, 3, 3, BuildingTile::Floor);
        grid.set(TilePos::new(4, 2), BuildingTile::Door);
        let mut level = Level::new(grid, 16.0);
        level.rooms.push(Room::new(RoomId(0), Rect::new(1, 1, 3, 3), "West"));
        level.rooms.push(Room::new(RoomId(1), Rect::new(5, 1, 3, 3), "East"));
        level.doors.insert(Door::new(TilePos::new(4, 2)));
        level
    }

    #[test]
    fn test_out_of_bounds_queries() {
        let level = corridor_level();
        assert!(!level.is_walkable(TilePos::new(-1, 0)));
        assert!(!level.is_walkable(TilePos::new(9, 0)));
        assert_eq!(level.tile_at(TilePos::new(0, 99)), None);
        assert!(level.room_at(TilePos::new(100, 100)).is_none());
    }

    #[test]
    fn test_room_at() {
        let level = corridor_level();
        assert_eq!(level.room_at(TilePos::new(2, 2)).map(|r| r.id), Some(RoomId(0)));
        assert_eq!(level.room_at(TilePos::new(6, 3)).map(|r| r.id), Some(RoomId(1)));
        assert!(level.room_at(TilePos::new(4, 2)).is_none());
    }

    #[test]
    fn test_locked_door_blocks_movement_but_not_routing() {
        let mut level = corridor_level();
        let door = TilePos::new(4, 2);
        level.doors.get_mut(door).unwrap().lock();

        assert!(!level.is_walkable(door));
        assert!(level.is_routable(door));

        let route = level.find_path(TilePos::new(2, 2), TilePos::new(6, 2));
        assert!(route.contains(&door));
        assert!(level.find_walkable_path(TilePos::new(2, 2), TilePos::new(6, 2)).is_empty());

        // Progress at the threshold allows passage
        level.doors.get_mut(door).unwrap().pick_progress = DEFAULT_DOOR_THRESHOLD;
        assert!(level.is_walkable(door));
    }

    #[test]
    fn test_world_queries_use_tile_size() {
        let level = corridor_level();
        assert_eq!(level.tile_at_world(Vec2::new(40.0, 40.0)), Some(BuildingTile::Floor));
        assert!(!level.is_walkable_world(Vec2::new(1.0, 1.0)));
    }
}
