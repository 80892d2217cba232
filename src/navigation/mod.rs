//! Grid navigation for autonomous agents

pub mod pathfinding;

pub use pathfinding::{distance_field, find_path, is_reachable, should_replan};
