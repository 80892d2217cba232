//! Simulation configuration with documented constants
//!
//! Tunable numbers for generation, combat, the heist shift and the sea live
//! here. Every section deserializes with `#[serde(default)]`, so a TOML file
//! only needs to name the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{PlunderError, Result};

/// Top-level configuration handed to every simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub island: IslandConfig,
    pub building: BuildingConfig,
    pub combat: CombatConfig,
    pub heist: HeistConfig,
    pub sea: SeaConfig,
}

/// Island terrain and structure placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    /// World units per tile
    pub tile_size: f32,

    /// Minimum grid width; a random jitter in `0..width_jitter` is added
    pub base_width: u32,
    pub width_jitter: u32,
    pub base_height: u32,
    pub height_jitter: u32,

    /// Noise-perturbed radial distance bands. Below `jungle_threshold` is deep
    /// interior, then grass, then beach; anything past `sand_threshold` is water.
    pub jungle_threshold: f32,
    pub grass_threshold: f32,
    pub sand_threshold: f32,

    /// Gap in tiles kept between structures
    pub room_margin: i32,

    /// Placement attempts per requested structure before giving up
    pub attempts_per_room: u32,

    /// Chance that a structure gets a second door on the opposite side
    pub second_door_chance: f64,

    /// Chance each non-treasure structure holds a chest
    pub chest_chance: f64,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            tile_size: 16.0,
            base_width: 50,
            width_jitter: 10,
            base_height: 40,
            height_jitter: 8,
            jungle_threshold: 0.3,
            grass_threshold: 0.6,
            sand_threshold: 0.85,
            room_margin: 2,
            attempts_per_room: 3,
            second_door_chance: 0.6,
            chest_chance: 0.5,
        }
    }
}

/// Building floor-plan partitioning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub width: u32,
    pub height: u32,

    /// Partition depth before the shift bonus (`+ min(shift, 3)`)
    pub base_depth: u32,

    /// Split position as a fraction of the side being cut
    pub split_min: f64,
    pub split_max: f64,

    /// Neither half of a split may be thinner than this
    pub min_split_side: i32,

    /// Regions narrower than this on either axis are not split further
    pub min_splittable: i32,

    /// Survivors below this count trigger the hand-authored layout
    pub min_rooms: usize,

    /// Chance to add a redundant connection between already-joined rooms
    pub extra_connection_chance: f64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 25,
            base_depth: 4,
            split_min: 0.35,
            split_max: 0.65,
            min_split_side: 5,
            min_splittable: 7,
            min_rooms: 4,
            extra_connection_chance: 0.3,
        }
    }
}

/// Real-time combat feel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Knockback velocity multiplier applied every step
    pub knockback_decay: f32,

    /// Seconds an agent stays physics-driven after a hit
    pub knockback_duration: f32,

    /// Chasing agents give up beyond `aggro_range * deaggro_multiplier`
    pub deaggro_multiplier: f32,

    /// Full width of the melee swing in degrees
    pub melee_arc_degrees: f32,

    /// Seconds of invulnerability after the player is hit
    pub player_invulnerability: f32,

    /// Seconds a dead agent stays in storage before removal
    pub corpse_grace: f32,

    /// Seconds before a dropped item can be picked up
    pub pickup_delay: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            knockback_decay: 0.9,
            knockback_duration: 0.15,
            deaggro_multiplier: 1.5,
            melee_arc_degrees: 120.0,
            player_invulnerability: 0.5,
            corpse_grace: 0.5,
            pickup_delay: 0.3,
        }
    }
}

/// Turn-based heist shift rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeistConfig {
    pub max_action_points: u32,
    pub lock_cost: u32,
    pub alarm_cost: u32,

    /// Turns before the alarm can fire again
    pub alarm_cooldown: u32,

    /// Turns intruders stay stunned after an alarm
    pub alarm_stun: u32,

    /// Pick progress needed to open a locked door
    pub door_strength: u32,

    pub cameras: usize,
    pub max_cameras: usize,

    /// Per-turn chance an intruder throws away its route and replans
    pub replan_chance: f64,

    /// Chebyshev radius around a camera room center seen with predictive pathing
    pub predictive_radius: i32,

    /// Manhattan radius at which auto-lock reacts to a visible intruder
    pub auto_lock_radius: i32,

    /// Extra tiles night vision reaches past each room edge
    pub night_vision_reach: i32,

    /// Turns to hold out after the last wave arrives
    pub grace_turns: u32,

    pub max_shifts: u32,
}

impl Default for HeistConfig {
    fn default() -> Self {
        Self {
            max_action_points: 3,
            lock_cost: 1,
            alarm_cost: 2,
            alarm_cooldown: 5,
            alarm_stun: 2,
            door_strength: 3,
            cameras: 4,
            max_cameras: 6,
            replan_chance: 0.1,
            predictive_radius: 4,
            auto_lock_radius: 3,
            night_vision_reach: 3,
            grace_turns: 20,
            max_shifts: 5,
        }
    }
}

/// Open-sea sailing map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeaConfig {
    pub width: u32,
    pub height: u32,
    pub tile_size: f32,

    /// Base fog reveal radius in world units, before the crow's nest bonus
    pub reveal_radius: f32,

    pub islands: u32,

    /// Enemy ships before the difficulty bonus
    pub base_enemy_ships: u32,

    /// Distance at which the ship may land on an island marker
    pub landing_radius: f32,
}

impl Default for SeaConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 60,
            tile_size: 16.0,
            reveal_radius: 150.0,
            islands: 6,
            base_enemy_ships: 2,
            landing_radius: 24.0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document and validate it
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(source)?;
        config.validate().map_err(PlunderError::InvalidConfig)?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let island = &self.island;
        if island.tile_size <= 0.0 {
            return Err(format!("island.tile_size ({}) must be positive", island.tile_size));
        }
        if island.base_width < 16 || island.base_height < 16 {
            return Err(format!(
                "island grid ({}x{}) must be at least 16x16",
                island.base_width, island.base_height
            ));
        }
        if !(island.jungle_threshold < island.grass_threshold
            && island.grass_threshold < island.sand_threshold)
        {
            return Err("island terrain thresholds must be strictly increasing".into());
        }
        if island.attempts_per_room == 0 {
            return Err("island.attempts_per_room must be at least 1".into());
        }

        let building = &self.building;
        if building.width < 12 || building.height < 12 {
            return Err(format!(
                "building grid ({}x{}) must be at least 12x12",
                building.width, building.height
            ));
        }
        if !(0.0 < building.split_min
            && building.split_min <= building.split_max
            && building.split_max < 1.0)
        {
            return Err("building split ratios must satisfy 0 < min <= max < 1".into());
        }

        let combat = &self.combat;
        if !(combat.knockback_decay > 0.0 && combat.knockback_decay <= 1.0) {
            return Err(format!(
                "combat.knockback_decay ({}) must be in (0, 1]",
                combat.knockback_decay
            ));
        }
        // Hysteresis needs the de-aggro band strictly outside the aggro band
        if combat.deaggro_multiplier <= 1.0 {
            return Err(format!(
                "combat.deaggro_multiplier ({}) must exceed 1",
                combat.deaggro_multiplier
            ));
        }
        if combat.melee_arc_degrees <= 0.0 || combat.melee_arc_degrees > 360.0 {
            return Err("combat.melee_arc_degrees must be in (0, 360]".into());
        }

        let heist = &self.heist;
        if heist.door_strength == 0 {
            return Err("heist.door_strength must be at least 1".into());
        }
        if heist.cameras > heist.max_cameras {
            return Err(format!(
                "heist.cameras ({}) exceeds heist.max_cameras ({})",
                heist.cameras, heist.max_cameras
            ));
        }
        if !(0.0..=1.0).contains(&heist.replan_chance) {
            return Err("heist.replan_chance must be a probability".into());
        }

        let sea = &self.sea;
        if sea.width == 0 || sea.height == 0 || sea.tile_size <= 0.0 {
            return Err("sea dimensions must be positive".into());
        }

        Ok(())
    }
}
