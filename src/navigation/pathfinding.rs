//! Breadth-first pathfinding over the tile grid
//!
//! 4-connected, unweighted. The caller supplies the passability predicate so
//! routing (doors admitted) and movement legality (locked doors rejected) can
//! share one search.

use std::collections::VecDeque;

use rand::Rng;

use crate::core::types::{SimRng, TilePos};
use crate::spatial::grid::TileGrid;

const NO_PARENT: usize = usize::MAX;

/// Shortest 4-connected path from `start` to `goal`.
///
/// The returned tiles run from the first step to `goal` inclusive; `start`
/// itself is never included. The result is empty both when `start == goal`
/// and when no route exists, so callers that care must compare the endpoints
/// first. Neighbors are expanded in N, E, S, W order.
pub fn find_path<T>(
    grid: &TileGrid<T>,
    start: TilePos,
    goal: TilePos,
    mut passable: impl FnMut(TilePos, &T) -> bool,
) -> Vec<TilePos> {
    if start == goal {
        return Vec::new();
    }
    let (Some(start_idx), Some(goal_idx)) = (grid.index_of(start), grid.index_of(goal)) else {
        return Vec::new();
    };

    let mut visited = vec![false; grid.len()];
    let mut parent = vec![NO_PARENT; grid.len()];
    let mut queue = VecDeque::new();
    visited[start_idx] = true;
    queue.push_back(start_idx);

    while let Some(current_idx) = queue.pop_front() {
        let current = grid.pos_of(current_idx);
        for next in current.neighbors4() {
            let Some(next_idx) = grid.index_of(next) else {
                continue;
            };
            if visited[next_idx] {
                continue;
            }
            let Some(tile) = grid.get(next) else {
                continue;
            };
            if !passable(next, tile) {
                continue;
            }
            visited[next_idx] = true;
            parent[next_idx] = current_idx;
            if next_idx == goal_idx {
                return reconstruct_path(grid, &parent, start_idx, goal_idx);
            }
            queue.push_back(next_idx);
        }
    }

    Vec::new()
}

fn reconstruct_path<T>(
    grid: &TileGrid<T>,
    parent: &[usize],
    start_idx: usize,
    goal_idx: usize,
) -> Vec<TilePos> {
    let mut path = Vec::new();
    let mut idx = goal_idx;
    while idx != start_idx && idx != NO_PARENT {
        path.push(grid.pos_of(idx));
        idx = parent[idx];
    }
    path.reverse();
    path
}

/// BFS step distance from `start` to every reachable tile
pub fn distance_field<T>(
    grid: &TileGrid<T>,
    start: TilePos,
    mut passable: impl FnMut(TilePos, &T) -> bool,
) -> TileGrid<Option<u32>> {
    let mut dist = TileGrid::new(grid.width(), grid.height(), None);
    if !grid.in_bounds(start) {
        return dist;
    }
    dist.set(start, Some(0));
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        let d = dist.get(current).copied().flatten().unwrap_or(0);
        for next in current.neighbors4() {
            match dist.get(next) {
                Some(None) => {}
                _ => continue,
            }
            let Some(tile) = grid.get(next) else {
                continue;
            };
            if !passable(next, tile) {
                continue;
            }
            dist.set(next, Some(d + 1));
            queue.push_back(next);
        }
    }
    dist
}

/// Whether a route from `start` to `goal` exists (trivially true when equal)
pub fn is_reachable<T>(
    grid: &TileGrid<T>,
    start: TilePos,
    goal: TilePos,
    passable: impl FnMut(TilePos, &T) -> bool,
) -> bool {
    start == goal || !find_path(grid, start, goal, passable).is_empty()
}

/// Replanning policy for agents following a cached route.
///
/// BFS costs O(grid), so a route is only recomputed when it has run out or on
/// a small per-step chance that lets the agent notice a changed world.
pub fn should_replan(path: &[TilePos], replan_chance: f64, rng: &mut SimRng) -> bool {
    // Always draw so the random stream does not depend on path state
    let roll = rng.gen::<f64>();
    path.is_empty() || roll < replan_chance
}
