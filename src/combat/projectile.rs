//! Projectiles: pistol shots, pirate bullets and cannonballs

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::spatial::geometry::{circle_collide, direction};

/// Who a projectile can hurt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    /// Fired by the player; hits enemies
    Friendly,
    /// Fired by enemies; hits the player
    Hostile,
}

/// Result of advancing a projectile one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    Flying,
    Expired,
    HitWall,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub radius: f32,
    pub remaining: f32,
    pub knockback: f32,
    pub faction: Faction,
    /// Splash radius on impact, zero for a single-target shot
    pub splash: f32,
}

impl Projectile {
    /// Fire from `origin` toward `target`, spawning `offset` units along the line
    #[allow(clippy::too_many_arguments)]
    pub fn aimed(
        origin: Vec2,
        target: Vec2,
        offset: f32,
        speed: f32,
        damage: f32,
        lifetime: f32,
        radius: f32,
        faction: Faction,
    ) -> Self {
        let dir = direction(origin, target);
        Self {
            pos: origin + dir * offset,
            vel: dir * speed,
            damage,
            radius,
            remaining: lifetime,
            knockback: 0.0,
            faction,
            splash: 0.0,
        }
    }

    pub fn with_knockback(mut self, force: f32) -> Self {
        self.knockback = force;
        self
    }

    pub fn with_splash(mut self, radius: f32) -> Self {
        self.splash = radius;
        self
    }

    /// Move one step. Projectiles die on lifetime expiry or when they leave
    /// passable terrain.
    pub fn advance(&mut self, dt: f32, passable: impl Fn(Vec2) -> bool) -> Flight {
        self.pos += self.vel * dt;
        self.remaining -= dt;
        if !passable(self.pos) {
            Flight::HitWall
        } else if self.remaining <= 0.0 {
            Flight::Expired
        } else {
            Flight::Flying
        }
    }

    pub fn hits(&self, pos: Vec2, radius: f32) -> bool {
        circle_collide(self.pos, self.radius, pos, radius)
    }
}
