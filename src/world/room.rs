//! Rectangular rooms

use serde::{Deserialize, Serialize};

use crate::core::types::{RoomId, TilePos};

/// Axis-aligned tile rectangle with origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Center tile, rounding toward the origin
    pub fn center(&self) -> TilePos {
        TilePos::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.x && pos.x < self.right() && pos.y >= self.y && pos.y < self.bottom()
    }

    /// Grow by `margin` tiles on every side
    pub fn expanded(&self, margin: i32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.w + margin * 2,
            self.h + margin * 2,
        )
    }

    /// Strict overlap (shared edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Tiles between this rectangle and the nearest edge of a `width` x `height` grid
    pub fn edge_distance(&self, width: i32, height: i32) -> i32 {
        self.x
            .min(self.y)
            .min(width - self.right())
            .min(height - self.bottom())
    }

    pub fn manhattan_to(&self, other: &Rect) -> i32 {
        self.center().manhattan(&other.center())
    }

    pub fn tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| TilePos::new(x, y)))
    }
}

/// Semantic role of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    Normal,
    /// Intruder goal in the heist
    Vault,
    /// Exit structure on an island
    Treasure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub rect: Rect,
    pub kind: RoomKind,
    pub name: String,
}

impl Room {
    pub fn new(id: RoomId, rect: Rect, name: impl Into<String>) -> Self {
        Self {
            id,
            rect,
            kind: RoomKind::Normal,
            name: name.into(),
        }
    }

    pub fn center(&self) -> TilePos {
        self.rect.center()
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        self.rect.contains(pos)
    }
}

/// Spreadsheet-style room label: A..Z, then AA, AB, ...
pub fn letter_name(index: usize) -> String {
    let mut n = index;
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label.reverse();
    format!("Room {}", String::from_utf8_lossy(&label))
}
