//! Step orchestrators
//!
//! Each simulation owns its world state and advances it one tick or turn at
//! a time in a fixed order, returning the events that step produced.

pub mod events;
pub mod heist;
pub mod island;
pub mod run;
pub mod sea;

pub use events::{EventLog, EventTally, SimEvent, SimEventKind};
pub use heist::{HeistLoadout, HeistSim, HeistUpgrade, ShiftOutcome, UpgradeCategory};
pub use island::{Chest, IslandOutcome, IslandSim};
pub use run::{RunOutcome, RunState};
pub use sea::{IslandMarker, SeaOutcome, SeaSim};
