//! Melee swing activation and arc hit resolution

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::spatial::geometry::melee_arc_hit;

/// One activation of a melee attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeleeSwing {
    pub facing: Vec2,
    pub range: f32,
    pub damage: f32,
    pub remaining: f32,
    pub has_hit: bool,
}

impl MeleeSwing {
    pub fn new(facing: Vec2, range: f32, damage: f32, duration: f32) -> Self {
        Self {
            facing,
            range,
            damage,
            remaining: duration,
            has_hit: false,
        }
    }

    /// Still able to connect: active and no target taken yet
    pub fn is_live(&self) -> bool {
        self.remaining > 0.0 && !self.has_hit
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining -= dt;
    }

    /// Resolve against candidates `(key, position, radius)` in iteration order.
    /// At most one target is returned per swing.
    pub fn resolve<K>(
        &mut self,
        attacker: Vec2,
        arc_degrees: f32,
        targets: impl IntoIterator<Item = (K, Vec2, f32)>,
    ) -> Option<K> {
        if !self.is_live() {
            return None;
        }
        for (key, pos, radius) in targets {
            if melee_arc_hit(attacker, self.facing, self.range, arc_degrees, pos, radius) {
                self.has_hit = true;
                return Some(key);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_only() {
        let mut swing = MeleeSwing::new(Vec2::new(1.0, 0.0), 28.0, 8.0, 0.2);
        let targets = vec![
            (0usize, Vec2::new(-20.0, 0.0), 7.0),
            (1, Vec2::new(20.0, 0.0), 7.0),
            (2, Vec2::new(15.0, 5.0), 7.0),
        ];
        assert_eq!(swing.resolve(Vec2::ZERO, 120.0, targets.clone()), Some(1));
        assert!(swing.has_hit);
        // Same activation cannot connect again
        assert_eq!(swing.resolve(Vec2::ZERO, 120.0, targets), None);
    }

    #[test]
    fn test_out_of_reach_misses() {
        let mut swing = MeleeSwing::new(Vec2::new(0.0, 1.0), 28.0, 8.0, 0.2);
        let targets = [(0usize, Vec2::new(0.0, 40.0), 7.0)];
        assert_eq!(swing.resolve(Vec2::ZERO, 120.0, targets), None);
        assert!(!swing.has_hit);
    }

    #[test]
    fn test_expired_swing_is_inert() {
        let mut swing = MeleeSwing::new(Vec2::new(1.0, 0.0), 28.0, 8.0, 0.2);
        swing.tick(0.25);
        let targets = [(0usize, Vec2::new(10.0, 0.0), 7.0)];
        assert_eq!(swing.resolve(Vec2::ZERO, 120.0, targets), None);
    }
}
