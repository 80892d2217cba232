//! Hit points and damage application
//!
//! Death is a transition, not a state check: `Health::apply` reports `Killed`
//! only for the hit that takes a living pool to zero. Every later hit in the
//! same step sees `AlreadyDead`, so kill bookkeeping and loot drops that key
//! off `Killed` happen exactly once.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// What a damage application did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    Wounded,
    Killed,
    /// The target was already dead; nothing changed
    AlreadyDead,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    pub fn apply(&mut self, amount: f32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::AlreadyDead;
        }
        self.current -= amount.max(0.0);
        if self.current <= 0.0 {
            self.current = 0.0;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Heal up to max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - before
    }

    /// Raise the ceiling and fill the new headroom
    pub fn raise_max(&mut self, amount: f32) {
        self.max += amount;
        self.current += amount;
    }
}
