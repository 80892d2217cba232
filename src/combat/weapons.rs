//! Melee weapon catalog

use serde::{Deserialize, Serialize};

use crate::combat::constants::{
    HEAVY_MELEE_KNOCKBACK, MELEE_KNOCKBACK, SWING_DURATION, SWING_RECOVERY,
};

/// Trait a weapon adds on top of raw damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponSpecial {
    None,
    /// Every third consecutive hit deals double damage
    ComboCrit,
    /// Hits that do not kill apply bleed
    Bleed,
    /// Double knockback
    Knockback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    RustyCutlass,
    CaptainsSaber,
    BoardingAxe,
    SharkBlade,
    CoralMace,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 5] = [
        WeaponKind::RustyCutlass,
        WeaponKind::CaptainsSaber,
        WeaponKind::BoardingAxe,
        WeaponKind::SharkBlade,
        WeaponKind::CoralMace,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::RustyCutlass => "Rusty Cutlass",
            WeaponKind::CaptainsSaber => "Captain's Saber",
            WeaponKind::BoardingAxe => "Boarding Axe",
            WeaponKind::SharkBlade => "Shark-Tooth Blade",
            WeaponKind::CoralMace => "Coral Mace",
        }
    }

    pub fn damage(&self) -> f32 {
        match self {
            WeaponKind::RustyCutlass => 8.0,
            WeaponKind::CaptainsSaber => 12.0,
            WeaponKind::BoardingAxe => 18.0,
            WeaponKind::SharkBlade => 10.0,
            WeaponKind::CoralMace => 15.0,
        }
    }

    /// Swing speed multiplier; higher recovers faster
    pub fn speed(&self) -> f32 {
        match self {
            WeaponKind::RustyCutlass => 1.0,
            WeaponKind::CaptainsSaber => 1.3,
            WeaponKind::BoardingAxe => 0.6,
            WeaponKind::SharkBlade => 1.0,
            WeaponKind::CoralMace => 0.7,
        }
    }

    pub fn range(&self) -> f32 {
        match self {
            WeaponKind::RustyCutlass => 28.0,
            WeaponKind::CaptainsSaber => 30.0,
            WeaponKind::BoardingAxe => 24.0,
            WeaponKind::SharkBlade => 26.0,
            WeaponKind::CoralMace => 26.0,
        }
    }

    pub fn special(&self) -> WeaponSpecial {
        match self {
            WeaponKind::CaptainsSaber => WeaponSpecial::ComboCrit,
            WeaponKind::SharkBlade => WeaponSpecial::Bleed,
            WeaponKind::CoralMace => WeaponSpecial::Knockback,
            WeaponKind::RustyCutlass | WeaponKind::BoardingAxe => WeaponSpecial::None,
        }
    }

    pub fn knockback(&self) -> f32 {
        if self.special() == WeaponSpecial::Knockback {
            HEAVY_MELEE_KNOCKBACK
        } else {
            MELEE_KNOCKBACK
        }
    }

    /// Seconds from the start of one swing to the next
    pub fn swing_cooldown(&self) -> f32 {
        SWING_DURATION + SWING_RECOVERY / self.speed()
    }
}
