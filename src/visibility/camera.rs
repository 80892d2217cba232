//! Camera coverage and intruder detection for the heist
//!
//! Coverage is derived state: it is rebuilt from the current camera placement
//! every turn and never read back as a source of truth.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{RoomId, SimRng, TilePos};
use crate::spatial::grid::TileGrid;
use crate::world::level::Level;
use crate::world::room::RoomKind;
use crate::world::tiles::BuildingTile;

/// Boolean visibility over the grid
pub type VisibilityMask = TileGrid<bool>;

/// A sensor assigned to at most one room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    pub id: usize,
    pub room: Option<RoomId>,
}

/// Upgrade switches that change what the cameras see
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorFlags {
    /// Coverage spreads into every non-wall tile near the room
    pub night_vision: bool,
    /// Stealth rolls never hide an intruder in a camera room
    pub motion_detection: bool,
    /// Intruders near a camera room center are seen even outside it
    pub predictive_pathing: bool,
    /// Intruders standing on covered tiles outside rooms are seen
    pub security_drone: bool,
}

/// Radii the detection rules use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorRanges {
    pub night_vision_reach: i32,
    pub predictive_radius: i32,
}

impl Default for SensorRanges {
    fn default() -> Self {
        Self {
            night_vision_reach: 3,
            predictive_radius: 4,
        }
    }
}

/// The player's set of cameras
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraRig {
    pub cameras: Vec<Camera>,
}

impl CameraRig {
    /// `count` cameras spread over the level's non-vault rooms in order
    pub fn install(level: &Level<BuildingTile>, count: usize) -> Self {
        let mut rooms = level.rooms.iter().filter(|r| r.kind != RoomKind::Vault).map(|r| r.id);
        let cameras = (0..count)
            .map(|id| Camera { id, room: rooms.next() })
            .collect();
        Self { cameras }
    }

    pub fn get(&self, id: usize) -> Option<&Camera> {
        self.cameras.get(id)
    }

    /// Point a camera at a room. Returns false for an unknown camera.
    pub fn aim(&mut self, id: usize, room: RoomId) -> bool {
        match self.cameras.get_mut(id) {
            Some(cam) => {
                cam.room = Some(room);
                true
            }
            None => false,
        }
    }

    pub fn covers_room(&self, room: RoomId) -> bool {
        self.cameras.iter().any(|c| c.room == Some(room))
    }

    pub fn covered_rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.cameras.iter().filter_map(|c| c.room)
    }

    /// Tiles visible through at least one camera
    pub fn coverage(
        &self,
        level: &Level<BuildingTile>,
        flags: SensorFlags,
        ranges: SensorRanges,
    ) -> VisibilityMask {
        let mut mask = TileGrid::new(level.width(), level.height(), false);
        for room_id in self.covered_rooms() {
            let Some(room) = level.room(room_id) else {
                continue;
            };
            for pos in room.rect.tiles() {
                mask.set(pos, true);
            }
            // One-tile halo onto adjoining corridors and doors
            for pos in room.rect.expanded(1).tiles() {
                if matches!(
                    level.tile_at(pos),
                    Some(BuildingTile::Door) | Some(BuildingTile::Corridor)
                ) {
                    mask.set(pos, true);
                }
            }
            if flags.night_vision {
                for pos in room.rect.expanded(ranges.night_vision_reach).tiles() {
                    if level.tile_at(pos).is_some_and(|t| t != BuildingTile::Wall) {
                        mask.set(pos, true);
                    }
                }
            }
        }
        mask
    }

    /// Whether an intruder at `pos` with the given stealth chance is seen this
    /// turn. Stealth rolls are only drawn for stealthy intruders in camera rooms.
    pub fn detects(
        &self,
        level: &Level<BuildingTile>,
        coverage: &VisibilityMask,
        flags: SensorFlags,
        ranges: SensorRanges,
        pos: TilePos,
        stealth: f64,
        rng: &mut SimRng,
    ) -> bool {
        if let Some(room) = level.room_at(pos) {
            if self.covers_room(room.id) {
                if stealth > 0.0 && rng.gen::<f64>() < stealth {
                    return flags.motion_detection;
                }
                return true;
            }
        } else if flags.security_drone && coverage.get(pos).copied().unwrap_or(false) {
            return true;
        }

        if flags.predictive_pathing {
            return self.covered_rooms().any(|id| {
                level
                    .room(id)
                    .is_some_and(|r| r.center().chebyshev(&pos) <= ranges.predictive_radius)
            });
        }
        false
    }
}
