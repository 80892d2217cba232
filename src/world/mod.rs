//! Level data model: tiles, rooms, doors and the generated level state

pub mod door;
pub mod level;
pub mod room;
pub mod terrain;
pub mod tiles;

pub use door::{Door, DoorSet};
pub use level::{
    BuildingLayout, EntryPoint, IslandLayout, Level, LevelState, LevelTile, SpawnPoint,
    DEFAULT_DOOR_THRESHOLD,
};
pub use room::{Rect, Room, RoomKind};
pub use terrain::{slide, OpenWater, Terrain};
pub use tiles::{BuildingTile, IslandTile, Tile};
