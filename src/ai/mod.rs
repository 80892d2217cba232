//! Agent AI for both game modes
//!
//! - `enemy`: real-time FSM for island enemies, the boss and enemy ships
//! - `intruder`: turn-based FSM for heist intruders
//! - `waves`: when intruders arrive and who comes

pub mod enemy;
pub mod intruder;
pub mod waves;

pub use enemy::{Archetype, Enemy, EnemyContext, EnemyIntent, EnemyKind, EnemyState};
pub use intruder::{Intruder, IntruderKind, IntruderStats, IntruderStatus, TurnOutcome};
pub use waves::{wave_composition, WaveSchedule};
