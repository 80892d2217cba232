//! Lockable doors and their pick state

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::TilePos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub pos: TilePos,
    pub locked: bool,
    pub pick_progress: u32,
}

impl Door {
    pub fn new(pos: TilePos) -> Self {
        Self {
            pos,
            locked: false,
            pick_progress: 0,
        }
    }

    /// Movement legality: a locked door blocks until picked to `threshold`
    pub fn blocks_movement(&self, threshold: u32) -> bool {
        self.locked && self.pick_progress < threshold
    }

    pub fn lock(&mut self) {
        self.locked = true;
        self.pick_progress = 0;
    }

    /// Add one turn of picking. Returns true when this attempt opened the door.
    pub fn pick(&mut self, skill: u32, threshold: u32) -> bool {
        if !self.locked {
            return false;
        }
        self.pick_progress += skill;
        if self.pick_progress >= threshold {
            self.locked = false;
            self.pick_progress = 0;
            true
        } else {
            false
        }
    }
}

/// Doors of one level, indexed by tile
#[derive(Debug, Clone, Default)]
pub struct DoorSet {
    doors: Vec<Door>,
    by_pos: AHashMap<TilePos, usize>,
}

impl DoorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a door. A second door on the same tile is ignored.
    pub fn insert(&mut self, door: Door) -> bool {
        if self.by_pos.contains_key(&door.pos) {
            return false;
        }
        self.by_pos.insert(door.pos, self.doors.len());
        self.doors.push(door);
        true
    }

    pub fn get(&self, pos: TilePos) -> Option<&Door> {
        self.by_pos.get(&pos).map(|&i| &self.doors[i])
    }

    pub fn get_mut(&mut self, pos: TilePos) -> Option<&mut Door> {
        match self.by_pos.get(&pos) {
            Some(&i) => Some(&mut self.doors[i]),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Door> {
        self.doors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Door> {
        self.doors.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.doors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    /// Unlock everything and clear progress
    pub fn reset(&mut self) {
        for door in &mut self.doors {
            door.locked = false;
            door.pick_progress = 0;
        }
    }
}
