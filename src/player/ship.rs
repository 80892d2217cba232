//! The player's ship: sailing physics, broadside cannons and the upgrade pool

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::combat::constants::{CANNONBALL_RADIUS, CANNONBALL_SPEED, GRAPESHOT_RADIUS};
use crate::combat::damage::Health;
use crate::combat::projectile::{Faction, Projectile};
use crate::core::error::ActionRejection;
use crate::core::types::{SimRng, Vec2};
use crate::player::avatar::{cooldown_check, CrewBonuses};
use crate::world::terrain::Terrain;

const BASE_HULL: f32 = 100.0;
const BASE_SAIL_SPEED: f32 = 80.0;
const BASE_TURN_SPEED: f32 = 2.5;
const DRAG: f32 = 0.97;
const MAX_SPEED_FACTOR: f32 = 1.2;
const REVERSE_THRUST: f32 = -0.4;
const BASE_CANNON_DAMAGE: f32 = 15.0;
const BASE_CANNON_RANGE: f32 = 120.0;
const BASE_CANNON_COOLDOWN: f32 = 1.2;
const BROADSIDE_OFFSET: f32 = 12.0;
const RAM_PROW_DAMAGE: f32 = 30.0;

/// Upgrade choices offered after clearing an island
pub const UPGRADE_CHOICES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipUpgrade {
    HullPlating,
    HullPatch,
    SwiftSails,
    NimbleHelm,
    ExtraCannons,
    FastReload,
    Grapeshot,
    RamProw,
    CrowsNest,
    BoardingParty,
    CrewMorale,
    Surgeon,
    LuckyCharm,
    PowderStores,
    GunnerTraining,
}

impl ShipUpgrade {
    pub const ALL: [ShipUpgrade; 15] = [
        ShipUpgrade::HullPlating,
        ShipUpgrade::HullPatch,
        ShipUpgrade::SwiftSails,
        ShipUpgrade::NimbleHelm,
        ShipUpgrade::ExtraCannons,
        ShipUpgrade::FastReload,
        ShipUpgrade::Grapeshot,
        ShipUpgrade::RamProw,
        ShipUpgrade::CrowsNest,
        ShipUpgrade::BoardingParty,
        ShipUpgrade::CrewMorale,
        ShipUpgrade::Surgeon,
        ShipUpgrade::LuckyCharm,
        ShipUpgrade::PowderStores,
        ShipUpgrade::GunnerTraining,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShipUpgrade::HullPlating => "Hull Plating",
            ShipUpgrade::HullPatch => "Hull Patch",
            ShipUpgrade::SwiftSails => "Swift Sails",
            ShipUpgrade::NimbleHelm => "Nimble Helm",
            ShipUpgrade::ExtraCannons => "Extra Cannons",
            ShipUpgrade::FastReload => "Fast Reload",
            ShipUpgrade::Grapeshot => "Grapeshot",
            ShipUpgrade::RamProw => "Ram Prow",
            ShipUpgrade::CrowsNest => "Crow's Nest",
            ShipUpgrade::BoardingParty => "Boarding Party",
            ShipUpgrade::CrewMorale => "Crew Morale",
            ShipUpgrade::Surgeon => "Ship Surgeon",
            ShipUpgrade::LuckyCharm => "Lucky Charm",
            ShipUpgrade::PowderStores => "Powder Stores",
            ShipUpgrade::GunnerTraining => "Gunner Training",
        }
    }

    /// One-of-a-kind upgrades are not offered again once owned
    pub fn stackable(&self) -> bool {
        !matches!(self, ShipUpgrade::Grapeshot | ShipUpgrade::RamProw)
    }
}

/// Which side of the hull fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Broadside {
    Port,
    Starboard,
}

/// Helm input for one sailing step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HelmIntent {
    /// -1 turns to port, +1 to starboard
    pub turn: f32,
    /// Forward when positive, reverse when negative
    pub thrust: f32,
    pub fire: Option<Broadside>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerShip {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in radians
    pub heading: f32,
    pub radius: f32,
    pub hull: Health,
    pub sail_speed: f32,
    pub turn_speed: f32,
    pub cannon_damage: f32,
    pub cannon_range: f32,
    pub cannon_cooldown: f32,
    pub cannon_timer: f32,
    pub ram_damage: f32,
    /// World units added to the fog reveal radius
    pub scout_range: f32,
    /// Extra max hp for the avatar on islands
    pub crew_morale: f32,
    pub boarding_bonus: f32,
    pub gunner_bonus: f32,
    pub gold_bonus: f32,
    pub surgeon_heal: f32,
    pub extra_ammo: u32,
    pub upgrades: Vec<ShipUpgrade>,
}

impl Default for PlayerShip {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            heading: -std::f32::consts::FRAC_PI_2,
            radius: 12.0,
            hull: Health::new(BASE_HULL),
            sail_speed: BASE_SAIL_SPEED,
            turn_speed: BASE_TURN_SPEED,
            cannon_damage: BASE_CANNON_DAMAGE,
            cannon_range: BASE_CANNON_RANGE,
            cannon_cooldown: BASE_CANNON_COOLDOWN,
            cannon_timer: 0.0,
            ram_damage: 0.0,
            scout_range: 0.0,
            crew_morale: 0.0,
            boarding_bonus: 0.0,
            gunner_bonus: 0.0,
            gold_bonus: 0.0,
            surgeon_heal: 0.0,
            extra_ammo: 0,
            upgrades: Vec::new(),
        }
    }
}

impl PlayerShip {
    pub fn is_afloat(&self) -> bool {
        self.hull.is_alive()
    }

    pub fn has_upgrade(&self, upgrade: ShipUpgrade) -> bool {
        self.upgrades.contains(&upgrade)
    }

    /// Bonuses the crew carries ashore
    pub fn crew_bonuses(&self) -> CrewBonuses {
        CrewBonuses {
            melee: self.boarding_bonus,
            pistol: self.gunner_bonus,
            gold_find: self.gold_bonus,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Thrust, turn, drag and speed cap; the hull only moves onto passable water
    pub fn sail(&mut self, dt: f32, helm: &HelmIntent, terrain: &dyn Terrain) {
        self.cannon_timer -= dt;
        self.heading += helm.turn.clamp(-1.0, 1.0) * self.turn_speed * dt;

        let thrust = if helm.thrust > 0.0 {
            1.0
        } else if helm.thrust < 0.0 {
            REVERSE_THRUST
        } else {
            0.0
        };
        self.vel += Vec2::from_angle(self.heading) * (thrust * self.sail_speed * dt);
        self.vel *= DRAG;

        let max_speed = self.sail_speed * MAX_SPEED_FACTOR;
        let speed = self.vel.length();
        if speed > max_speed {
            self.vel *= max_speed / speed;
        }

        let next = self.pos + self.vel * dt;
        if terrain.is_passable(next) {
            self.pos = next;
        } else {
            self.vel = Vec2::ZERO;
        }
    }

    /// Fire one broadside perpendicular to the heading. Refused while reloading.
    pub fn fire(&mut self, side: Broadside) -> Result<Projectile, ActionRejection> {
        cooldown_check(self.cannon_timer)?;
        self.cannon_timer = self.cannon_cooldown;
        let angle = match side {
            Broadside::Port => self.heading - std::f32::consts::FRAC_PI_2,
            Broadside::Starboard => self.heading + std::f32::consts::FRAC_PI_2,
        };
        let dir = Vec2::from_angle(angle);
        let shot = Projectile::aimed(
            self.pos,
            self.pos + dir,
            BROADSIDE_OFFSET,
            CANNONBALL_SPEED,
            self.cannon_damage,
            self.cannon_range / CANNONBALL_SPEED,
            CANNONBALL_RADIUS,
            Faction::Friendly,
        );
        Ok(if self.has_upgrade(ShipUpgrade::Grapeshot) {
            shot.with_splash(GRAPESHOT_RADIUS)
        } else {
            shot
        })
    }

    /// Apply an upgrade's effect and record it
    pub fn apply_upgrade(&mut self, upgrade: ShipUpgrade) {
        match upgrade {
            ShipUpgrade::HullPlating => self.hull.raise_max(30.0),
            ShipUpgrade::HullPatch => {
                self.hull.heal(40.0);
            }
            ShipUpgrade::SwiftSails => self.sail_speed *= 1.15,
            ShipUpgrade::NimbleHelm => self.turn_speed *= 1.2,
            ShipUpgrade::ExtraCannons => self.cannon_damage = (self.cannon_damage * 1.25).floor(),
            ShipUpgrade::FastReload => self.cannon_cooldown *= 0.8,
            ShipUpgrade::Grapeshot => {}
            ShipUpgrade::RamProw => self.ram_damage = RAM_PROW_DAMAGE,
            ShipUpgrade::CrowsNest => self.scout_range += 60.0,
            ShipUpgrade::BoardingParty => self.boarding_bonus += 0.2,
            ShipUpgrade::CrewMorale => self.crew_morale += 20.0,
            ShipUpgrade::Surgeon => self.surgeon_heal += 25.0,
            ShipUpgrade::LuckyCharm => self.gold_bonus += 0.3,
            ShipUpgrade::PowderStores => self.extra_ammo += 5,
            ShipUpgrade::GunnerTraining => self.gunner_bonus += 0.2,
        }
        self.upgrades.push(upgrade);
        tracing::debug!(upgrade = upgrade.name(), "Ship upgrade applied");
    }

    /// Up to three distinct choices, leaving out one-of-a-kind upgrades already owned
    pub fn upgrade_choices(&self, rng: &mut SimRng) -> Vec<ShipUpgrade> {
        let available: Vec<ShipUpgrade> = ShipUpgrade::ALL
            .into_iter()
            .filter(|u| u.stackable() || !self.has_upgrade(*u))
            .collect();
        available
            .choose_multiple(rng, UPGRADE_CHOICES)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::seeded_rng;
    use crate::world::terrain::OpenWater;

    const SEA: OpenWater = OpenWater {
        width: 5000.0,
        height: 5000.0,
    };

    fn afloat() -> PlayerShip {
        PlayerShip {
            pos: Vec2::new(2500.0, 2500.0),
            ..PlayerShip::default()
        }
    }

    #[test]
    fn test_speed_capped() {
        let mut ship = afloat();
        let helm = HelmIntent {
            thrust: 1.0,
            ..Default::default()
        };
        for _ in 0..600 {
            ship.sail(1.0 / 60.0, &helm, &SEA);
        }
        assert!(ship.speed() <= BASE_SAIL_SPEED * MAX_SPEED_FACTOR + 1e-3);
        // Heading starts north
        assert!(ship.pos.y < 2500.0);
    }

    #[test]
    fn test_drag_slows_idle_ship() {
        let mut ship = afloat();
        ship.vel = Vec2::new(50.0, 0.0);
        ship.sail(0.016, &HelmIntent::default(), &SEA);
        assert!((ship.speed() - 50.0 * DRAG).abs() < 1e-3);
    }

    #[test]
    fn test_broadside_perpendicular_and_reload() {
        let mut ship = afloat();
        ship.heading = 0.0;
        let shot = ship.fire(Broadside::Starboard);
        assert!(matches!(shot, Ok(p) if p.vel.y > 0.0 && p.vel.x.abs() < 1e-3));
        assert_eq!(
            ship.fire(Broadside::Port).err(),
            Some(ActionRejection::OnCooldown {
                remaining: BASE_CANNON_COOLDOWN
            })
        );
        assert_eq!(ship.cannon_timer, BASE_CANNON_COOLDOWN);
        ship.sail(BASE_CANNON_COOLDOWN, &HelmIntent::default(), &SEA);
        let port = ship.fire(Broadside::Port);
        assert!(matches!(port, Ok(p) if p.vel.y < 0.0 && p.splash == 0.0));
    }

    #[test]
    fn test_upgrades_apply() {
        let mut ship = afloat();
        ship.apply_upgrade(ShipUpgrade::HullPlating);
        assert_eq!(ship.hull.max, 130.0);
        assert_eq!(ship.hull.current, 130.0);
        ship.apply_upgrade(ShipUpgrade::ExtraCannons);
        assert_eq!(ship.cannon_damage, 18.0);
        ship.apply_upgrade(ShipUpgrade::Grapeshot);
        ship.cannon_timer = 0.0;
        assert!(matches!(ship.fire(Broadside::Port), Ok(p) if p.splash > 0.0));
    }

    #[test]
    fn test_choices_skip_owned_unique() {
        let mut ship = afloat();
        ship.apply_upgrade(ShipUpgrade::Grapeshot);
        ship.apply_upgrade(ShipUpgrade::RamProw);
        let mut rng = seeded_rng(11);
        for _ in 0..50 {
            let choices = ship.upgrade_choices(&mut rng);
            assert_eq!(choices.len(), UPGRADE_CHOICES);
            assert!(!choices.contains(&ShipUpgrade::Grapeshot));
            assert!(!choices.contains(&ShipUpgrade::RamProw));
            let mut dedup = choices.clone();
            dedup.sort_by_key(|u| *u as u8);
            dedup.dedup();
            assert_eq!(dedup.len(), UPGRADE_CHOICES);
        }
    }
}
