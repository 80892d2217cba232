//! Run-persistent player state: the avatar on foot, the ship at sea, and meta unlocks

pub mod avatar;
pub mod meta;
pub mod ship;

pub use avatar::{ActionKind, CrewBonuses, Player, PlayerAction, PlayerIntent, PLAYER_BASE_HP};
pub use meta::{MetaProgress, MetaUnlock};
pub use ship::{Broadside, HelmIntent, PlayerShip, ShipUpgrade};
