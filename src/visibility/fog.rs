//! Exploration fog for open-world sailing
//!
//! Unlike camera coverage this is persistent run state: tiles only ever go
//! from hidden to revealed.

use serde::{Deserialize, Serialize};

use crate::core::types::{TilePos, Vec2};
use crate::spatial::grid::TileGrid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationFog {
    revealed: TileGrid<bool>,
    tile_size: f32,
    revealed_count: usize,
}

impl ExplorationFog {
    pub fn new(width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            revealed: TileGrid::new(width, height, false),
            tile_size,
            revealed_count: 0,
        }
    }

    /// Out-of-bounds tiles read as hidden
    pub fn is_revealed(&self, pos: TilePos) -> bool {
        self.revealed.get(pos).copied().unwrap_or(false)
    }

    pub fn is_revealed_world(&self, pos: Vec2) -> bool {
        self.is_revealed(TilePos::from_world(pos, self.tile_size))
    }

    /// Reveal every tile whose center lies within `radius` world units of
    /// `center`. Returns the number of tiles newly revealed.
    pub fn reveal_disc(&mut self, center: Vec2, radius: f32) -> usize {
        if radius <= 0.0 {
            return 0;
        }
        // Scan only the part of the bounding box that lies on the grid
        let min = TilePos::from_world(center - Vec2::new(radius, radius), self.tile_size);
        let max = TilePos::from_world(center + Vec2::new(radius, radius), self.tile_size);
        let (x0, y0) = (min.x.max(0), min.y.max(0));
        let x1 = max.x.min(self.revealed.width() as i32 - 1);
        let y1 = max.y.min(self.revealed.height() as i32 - 1);
        let mut newly = 0;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let pos = TilePos::new(x, y);
                if pos.center(self.tile_size).distance(&center) > radius {
                    continue;
                }
                if let Some(cell) = self.revealed.get_mut(pos) {
                    if !*cell {
                        *cell = true;
                        newly += 1;
                    }
                }
            }
        }
        self.revealed_count += newly;
        newly
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    pub fn revealed_fraction(&self) -> f32 {
        if self.revealed.is_empty() {
            0.0
        } else {
            self.revealed_count as f32 / self.revealed.len() as f32
        }
    }

    pub fn mask(&self) -> &TileGrid<bool> {
        &self.revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_is_monotonic() {
        let mut fog = ExplorationFog::new(20, 20, 16.0);
        let first = fog.reveal_disc(Vec2::new(80.0, 80.0), 40.0);
        assert!(first > 0);
        let snapshot = fog.mask().clone();

        fog.reveal_disc(Vec2::new(250.0, 250.0), 40.0);
        for (pos, was) in snapshot.iter() {
            if *was {
                assert!(fog.is_revealed(pos));
            }
        }
        // Re-revealing the same disc adds nothing
        assert_eq!(fog.reveal_disc(Vec2::new(80.0, 80.0), 40.0), 0);
    }

    #[test]
    fn test_disc_shape() {
        let mut fog = ExplorationFog::new(20, 20, 16.0);
        fog.reveal_disc(TilePos::new(10, 10).center(16.0), 32.0);
        assert!(fog.is_revealed(TilePos::new(10, 10)));
        assert!(fog.is_revealed(TilePos::new(12, 10)));
        assert!(!fog.is_revealed(TilePos::new(12, 12)));
        assert!(!fog.is_revealed(TilePos::new(13, 10)));
    }

    #[test]
    fn test_larger_radius_reveals_more() {
        let mut small = ExplorationFog::new(30, 30, 16.0);
        let mut large = ExplorationFog::new(30, 30, 16.0);
        let at = Vec2::new(240.0, 240.0);
        let a = small.reveal_disc(at, 60.0);
        let b = large.reveal_disc(at, 120.0);
        assert!(b > a);
        assert_eq!(large.revealed_count(), b);
        assert!(large.revealed_fraction() > small.revealed_fraction());
    }

    #[test]
    fn test_edge_reveal_clips() {
        let mut fog = ExplorationFog::new(4, 4, 16.0);
        fog.reveal_disc(Vec2::new(0.0, 0.0), 1000.0);
        assert_eq!(fog.revealed_count(), 16);
        assert!((fog.revealed_fraction() - 1.0).abs() < 1e-6);
        assert!(!fog.is_revealed(TilePos::new(-1, 0)));
    }

    #[test]
    fn test_huge_radius_scans_only_the_grid() {
        let mut fog = ExplorationFog::new(8, 6, 16.0);
        assert_eq!(fog.reveal_disc(Vec2::new(64.0, 48.0), 1.0e7), 48);
        assert_eq!(fog.reveal_disc(Vec2::new(64.0, 48.0), 1.0e7), 0);
    }

    #[test]
    fn test_off_map_center_reveals_nothing() {
        let mut fog = ExplorationFog::new(8, 6, 16.0);
        assert_eq!(fog.reveal_disc(Vec2::new(-5000.0, -5000.0), 100.0), 0);
        assert_eq!(fog.reveal_disc(Vec2::new(9000.0, 20.0), 100.0), 0);
        assert_eq!(fog.revealed_count(), 0);
        // A disc overlapping the corner from outside still reveals the overlap
        assert!(fog.reveal_disc(Vec2::new(-8.0, -8.0), 24.0) > 0);
    }
}
