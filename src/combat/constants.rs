//! Combat numbers that are part of the game's identity rather than tuning
//!
//! Anything a designer is expected to tweak per run lives in `CombatConfig`.

// Knockback forces (world units per second at impact)
pub const MELEE_KNOCKBACK: f32 = 100.0;
pub const HEAVY_MELEE_KNOCKBACK: f32 = 200.0;
pub const BULLET_KNOCKBACK: f32 = 60.0;
pub const PLAYER_KNOCKBACK: f32 = 150.0;

// Bleed
pub const BLEED_DPS: f32 = 3.0;
pub const BLEED_DURATION: f32 = 2.0;

// Projectiles
pub const BULLET_RADIUS: f32 = 3.0;
pub const ENEMY_BULLET_SPEED: f32 = 180.0;
pub const ENEMY_BULLET_LIFETIME: f32 = 1.2;
pub const MUZZLE_OFFSET: f32 = 8.0;
pub const PISTOL_DAMAGE: f32 = 15.0;
pub const PISTOL_SPEED: f32 = 300.0;
pub const PISTOL_LIFETIME: f32 = 1.0;
pub const PISTOL_COOLDOWN: f32 = 0.8;
pub const CANNONBALL_RADIUS: f32 = 4.0;
pub const CANNONBALL_SPEED: f32 = 200.0;
pub const GRAPESHOT_RADIUS: f32 = 24.0;

// Melee swing timing
pub const SWING_DURATION: f32 = 0.2;
pub const SWING_RECOVERY: f32 = 0.15;
pub const COMBO_WINDOW: f32 = 0.6;
pub const COMBO_CRIT_HITS: u32 = 3;

/// Extra reach the boss's sweeping attack has over its listed range
pub const BOSS_SWEEP_BONUS: f32 = 10.0;

// Loot
pub const PICKUP_REACH: f32 = 10.0;
pub const HEART_HEAL: f32 = 15.0;
pub const LOOT_SCATTER: f32 = 8.0;
