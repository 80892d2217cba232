//! Real-time combat resolution
//!
//! Everything here is pure state transition: hits are computed and reported,
//! and the simulation step decides what to do with the results.

pub mod constants;
pub mod damage;
pub mod loot;
pub mod melee;
pub mod projectile;
pub mod status;
pub mod weapons;

pub use damage::{DamageOutcome, Health};
pub use loot::{chest_drop, enemy_drop, ItemKind, LootItem};
pub use melee::MeleeSwing;
pub use projectile::{Faction, Flight, Projectile};
pub use status::{Bleed, Knockback};
pub use weapons::{WeaponKind, WeaponSpecial};
