//! Spatial primitives: continuous geometry and the tile grid

pub mod geometry;
pub mod grid;

pub use geometry::{circle_collide, direction, distance, melee_arc_hit, point_in_rect};
pub use grid::TileGrid;
