//! Timed status effects: knockback and bleed

use serde::{Deserialize, Serialize};

use crate::combat::constants::{BLEED_DPS, BLEED_DURATION};
use crate::core::types::Vec2;
use crate::spatial::geometry::direction;

/// Physics-driven shove. While active it overrides the agent's own movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    pub velocity: Vec2,
    pub remaining: f32,
}

impl Knockback {
    /// Shove away from `source`, scaled by `force`
    pub fn from_source(source: Vec2, target: Vec2, force: f32, duration: f32) -> Self {
        Self {
            velocity: direction(source, target) * force,
            remaining: duration,
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Advance one step. Returns the displacement for this step, then decays
    /// the velocity geometrically.
    pub fn step(&mut self, dt: f32, decay: f32) -> Vec2 {
        if !self.is_active() {
            return Vec2::ZERO;
        }
        let displacement = self.velocity * dt;
        self.velocity *= decay;
        self.remaining -= dt;
        displacement
    }
}

/// Damage over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bleed {
    pub dps: f32,
    pub remaining: f32,
}

impl Default for Bleed {
    fn default() -> Self {
        Self {
            dps: BLEED_DPS,
            remaining: BLEED_DURATION,
        }
    }
}

impl Bleed {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Damage dealt over `dt`, never past the end of the effect
    pub fn tick(&mut self, dt: f32) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        let span = dt.min(self.remaining);
        self.remaining -= dt;
        self.dps * span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knockback_decays_geometrically() {
        let initial = 100.0;
        let decay = 0.9;
        let mut kb = Knockback::from_source(Vec2::ZERO, Vec2::new(1.0, 0.0), initial, 1.0);
        let n = 10;
        for _ in 0..n {
            kb.step(1.0 / 60.0, decay);
        }
        let expected = initial * decay.powi(n);
        assert!((kb.velocity.length() - expected).abs() < 1e-3);
        assert!(kb.is_active());
    }

    #[test]
    fn test_knockback_direction_and_expiry() {
        let mut kb = Knockback::from_source(Vec2::new(10.0, 0.0), Vec2::ZERO, 50.0, 0.15);
        let first = kb.step(0.1, 0.9);
        assert!(first.x < 0.0);
        assert!(first.y.abs() < 1e-6);
        kb.step(0.1, 0.9);
        assert!(!kb.is_active());
        assert_eq!(kb.step(0.1, 0.9), Vec2::ZERO);
    }

    #[test]
    fn test_bleed_total_damage() {
        let mut bleed = Bleed::default();
        let mut total = 0.0;
        for _ in 0..30 {
            total += bleed.tick(0.1);
        }
        assert!((total - BLEED_DPS * BLEED_DURATION).abs() < 1e-3);
        assert!(!bleed.is_active());
        assert_eq!(bleed.tick(0.1), 0.0);
    }
}
