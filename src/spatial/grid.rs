//! Fixed-size 2D tile grid

use serde::{Deserialize, Serialize};

use crate::core::types::TilePos;

/// Row-major 2D grid addressed by `TilePos`.
///
/// Dimensions are fixed at construction. Out-of-bounds reads return `None`
/// and out-of-bounds writes are ignored, so callers never need to bounds-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone> TileGrid<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    /// Overwrite every cell in the inclusive-exclusive rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, value: T) {
        for ty in y..y + h {
            for tx in x..x + w {
                self.set(TilePos::new(tx, ty), value.clone());
            }
        }
    }
}

impl<T> TileGrid<T> {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Flat index of an in-bounds position
    #[inline]
    pub fn index_of(&self, pos: TilePos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn pos_of(&self, index: usize) -> TilePos {
        TilePos::new((index % self.width) as i32, (index / self.width) as i32)
    }

    #[inline]
    pub fn get(&self, pos: TilePos) -> Option<&T> {
        self.index_of(pos).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, pos: TilePos) -> Option<&mut T> {
        self.index_of(pos).map(move |i| &mut self.data[i])
    }

    /// Returns false when `pos` is outside the grid
    #[inline]
    pub fn set(&mut self, pos: TilePos, value: T) -> bool {
        match self.index_of(pos) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TilePos, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.pos_of(i), v))
    }

    pub fn count(&self, mut pred: impl FnMut(&T) -> bool) -> usize {
        self.data.iter().filter(|v| pred(v)).count()
    }
}
