//! Procedural level generation
//!
//! Both variants are deterministic for a given random source and always
//! produce a playable level: under-production falls back to a fixed layout
//! instead of retrying without bound.

pub mod building;
pub mod island;

pub use building::{fallback_building, generate_building};
pub use island::generate_island;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{PlunderError, Result};
use crate::core::types::SimRng;
use crate::world::level::LevelState;

/// Highest difficulty the island tables are tuned for
pub const MAX_DIFFICULTY: u32 = 20;

/// What to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationParams {
    Island { difficulty: u32 },
    Building { shift: u32 },
}

/// Generate a level. Impossible inputs fail here rather than being coerced.
pub fn generate(
    params: GenerationParams,
    config: &SimulationConfig,
    rng: &mut SimRng,
) -> Result<LevelState> {
    config.validate().map_err(PlunderError::InvalidConfig)?;
    match params {
        GenerationParams::Island { difficulty } => {
            if difficulty > MAX_DIFFICULTY {
                return Err(PlunderError::InvalidGenerationParams(format!(
                    "difficulty {difficulty} exceeds {MAX_DIFFICULTY}"
                )));
            }
            Ok(LevelState::Island(generate_island(difficulty, &config.island, rng)))
        }
        GenerationParams::Building { shift } => {
            if shift == 0 {
                return Err(PlunderError::InvalidGenerationParams(
                    "shifts are numbered from 1".into(),
                ));
            }
            Ok(LevelState::Building(generate_building(shift, &config.building, rng)))
        }
    }
}
