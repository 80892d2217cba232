//! Continuous-space passability for agents that move in world units

use crate::core::types::Vec2;
use crate::world::level::Level;
use crate::world::tiles::Tile;

pub trait Terrain {
    fn is_passable(&self, pos: Vec2) -> bool;
}

impl<T: Tile> Terrain for Level<T> {
    fn is_passable(&self, pos: Vec2) -> bool {
        self.is_walkable_world(pos)
    }
}

/// Unobstructed rectangle of sea with its origin at zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenWater {
    pub width: f32,
    pub height: f32,
}

impl Terrain for OpenWater {
    fn is_passable(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x < self.width && pos.y < self.height
    }
}

/// Axis-separated move: each axis is applied only if the result is passable,
/// so agents slide along obstacles instead of sticking to them.
pub fn slide(terrain: &dyn Terrain, pos: Vec2, delta: Vec2) -> Vec2 {
    let mut out = pos;
    let along_x = Vec2::new(out.x + delta.x, out.y);
    if terrain.is_passable(along_x) {
        out = along_x;
    }
    let along_y = Vec2::new(out.x, out.y + delta.y);
    if terrain.is_passable(along_y) {
        out = along_y;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_water_bounds() {
        let sea = OpenWater { width: 100.0, height: 50.0 };
        assert!(sea.is_passable(Vec2::new(0.0, 0.0)));
        assert!(!sea.is_passable(Vec2::new(100.0, 10.0)));
        assert!(!sea.is_passable(Vec2::new(10.0, -1.0)));
    }

    #[test]
    fn test_slide_along_wall() {
        let sea = OpenWater { width: 100.0, height: 50.0 };
        let moved = slide(&sea, Vec2::new(50.0, 48.0), Vec2::new(5.0, 5.0));
        assert_eq!(moved, Vec2::new(55.0, 48.0));
    }
}
