pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{ActionRejection, PlunderError, Result, TargetError};
pub use types::{seeded_rng, AgentId, IdAllocator, RoomId, SimRng, TilePos, Tick, Vec2};
