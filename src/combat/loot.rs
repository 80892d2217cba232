//! Dropped items and drop tables

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::constants::{LOOT_SCATTER, PICKUP_REACH};
use crate::combat::weapons::WeaponKind;
use crate::core::types::{SimRng, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Gold(u32),
    Heart,
    Ammo(u32),
    Weapon(WeaponKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    pub pos: Vec2,
    pub kind: ItemKind,
    /// Seconds until the item can be collected
    pub delay: f32,
}

impl LootItem {
    pub fn new(pos: Vec2, kind: ItemKind, delay: f32) -> Self {
        Self { pos, kind, delay }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.delay > 0.0 {
            self.delay -= dt;
        }
    }

    pub fn can_pickup(&self, collector: Vec2, collector_radius: f32) -> bool {
        self.delay <= 0.0 && self.pos.distance(&collector) < collector_radius + PICKUP_REACH
    }
}

fn scattered(pos: Vec2, rng: &mut SimRng) -> Vec2 {
    pos + Vec2::new(
        rng.gen_range(-LOOT_SCATTER..=LOOT_SCATTER),
        rng.gen_range(-LOOT_SCATTER..=LOOT_SCATTER),
    )
}

/// Items a slain enemy leaves behind
pub fn enemy_drop(pos: Vec2, delay: f32, rng: &mut SimRng) -> Vec<LootItem> {
    let mut items = Vec::new();
    if rng.gen::<f32>() < 0.7 {
        let amount = 3 + rng.gen_range(0..8);
        items.push(LootItem::new(scattered(pos, rng), ItemKind::Gold(amount), delay));
    }
    if rng.gen::<f32>() < 0.15 {
        items.push(LootItem::new(scattered(pos, rng), ItemKind::Heart, delay));
    }
    if rng.gen::<f32>() < 0.2 {
        let amount = 3 + rng.gen_range(0..3);
        items.push(LootItem::new(scattered(pos, rng), ItemKind::Ammo(amount), delay));
    }
    items
}

/// Contents of an opened chest. The first weapon in the catalog is the
/// starting weapon and never drops.
pub fn chest_drop(pos: Vec2, difficulty: u32, delay: f32, rng: &mut SimRng) -> Vec<LootItem> {
    let mut items = Vec::new();
    let big = 15 + (rng.gen::<f32>() * 20.0 * difficulty as f32).floor() as u32;
    items.push(LootItem::new(scattered(pos, rng), ItemKind::Gold(big), delay));
    let small = 10 + rng.gen_range(0..15);
    items.push(LootItem::new(scattered(pos, rng), ItemKind::Gold(small), delay));
    if rng.gen::<f32>() < 0.6 {
        items.push(LootItem::new(scattered(pos, rng), ItemKind::Heart, delay));
    }
    if rng.gen::<f32>() < 0.5 {
        let amount = 3 + rng.gen_range(0..3);
        items.push(LootItem::new(scattered(pos, rng), ItemKind::Ammo(amount), delay));
    }
    if rng.gen::<f32>() < 0.3 {
        let weapon = WeaponKind::ALL[rng.gen_range(1..WeaponKind::ALL.len())];
        items.push(LootItem::new(scattered(pos, rng), ItemKind::Weapon(weapon), delay));
    }
    items
}
