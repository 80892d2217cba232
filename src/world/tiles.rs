//! Tile vocabularies for each generator variant
//!
//! The kind set is closed per variant. Kind decides routing; movement
//! legality for doors additionally consults the door's lock state.

use serde::{Deserialize, Serialize};

/// Behavior every tile vocabulary exposes to pathing and queries
pub trait Tile: Copy + Eq + std::fmt::Debug {
    /// Never passable, for routing or movement
    fn blocks_route(&self) -> bool;

    /// Passability may depend on a lock
    fn is_door(&self) -> bool {
        false
    }
}

/// Island terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IslandTile {
    #[default]
    Water,
    Sand,
    Grass,
    Jungle,
    /// Structure wall
    Wall,
    /// Carved trail or door opening
    Path,
    /// Structure floor
    Wood,
}

impl IslandTile {
    /// Untouched landmass (not carved, not built)
    pub fn is_natural_land(&self) -> bool {
        matches!(self, IslandTile::Sand | IslandTile::Grass | IslandTile::Jungle)
    }
}

impl Tile for IslandTile {
    fn blocks_route(&self) -> bool {
        matches!(self, IslandTile::Water | IslandTile::Wall)
    }
}

/// Building floor plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildingTile {
    #[default]
    Wall,
    Floor,
    Door,
    Vault,
    Entry,
    Corridor,
}

impl Tile for BuildingTile {
    fn blocks_route(&self) -> bool {
        matches!(self, BuildingTile::Wall)
    }

    fn is_door(&self) -> bool {
        matches!(self, BuildingTile::Door)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_island_routing() {
        assert!(IslandTile::Water.blocks_route());
        assert!(IslandTile::Wall.blocks_route());
        for t in [IslandTile::Sand, IslandTile::Grass, IslandTile::Jungle, IslandTile::Path, IslandTile::Wood] {
            assert!(!t.blocks_route(), "{t:?}");
        }
        assert!(IslandTile::Jungle.is_natural_land());
        assert!(!IslandTile::Path.is_natural_land());
    }

    #[test]
    fn test_building_routing() {
        assert!(BuildingTile::Wall.blocks_route());
        assert!(!BuildingTile::Door.blocks_route());
        assert!(BuildingTile::Door.is_door());
        assert!(!BuildingTile::Corridor.is_door());
    }
}
