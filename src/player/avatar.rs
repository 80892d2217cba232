//! The player's on-foot avatar for island levels

use serde::{Deserialize, Serialize};

use crate::combat::constants::{
    BULLET_KNOCKBACK, BULLET_RADIUS, COMBO_CRIT_HITS, COMBO_WINDOW, HEART_HEAL, PISTOL_COOLDOWN,
    PISTOL_DAMAGE, PISTOL_LIFETIME, PISTOL_SPEED, PLAYER_KNOCKBACK, SWING_DURATION,
};
use crate::combat::damage::{DamageOutcome, Health};
use crate::combat::loot::ItemKind;
use crate::combat::melee::MeleeSwing;
use crate::combat::projectile::{Faction, Projectile};
use crate::combat::status::Knockback;
use crate::combat::weapons::{WeaponKind, WeaponSpecial};
use crate::core::config::CombatConfig;
use crate::core::error::ActionRejection;
use crate::core::types::Vec2;
use crate::world::terrain::{slide, Terrain};

pub const PLAYER_RADIUS: f32 = 6.0;
pub const PLAYER_SPEED: f32 = 120.0;
pub const PLAYER_BASE_HP: f32 = 80.0;
pub const STARTING_AMMO: u32 = 10;
pub const STARTING_MAX_AMMO: u32 = 15;

const DODGE_DURATION: f32 = 0.2;
const DODGE_SPEED: f32 = 350.0;
const DODGE_COOLDOWN: f32 = 0.5;
const DODGE_INVULNERABILITY_PAD: f32 = 0.05;

/// Input for one real-time step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// Desired movement direction; any length, zero to stand still
    pub move_dir: Vec2,
    /// Direction to face for attacks; falls back to the movement direction
    pub aim: Option<Vec2>,
    pub attack: bool,
    pub fire: bool,
    pub dodge: bool,
}

/// Real-time actions a player can attempt on foot or at the helm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Swing,
    Pistol,
    Dodge,
    Broadside,
}

/// Something the avatar did this step that the world must resolve
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerAction {
    Swung,
    Fired(Projectile),
    Dodged,
    /// An attempted action was refused; nothing about the avatar changed for it
    Rejected {
        action: ActionKind,
        reason: ActionRejection,
    },
}

/// Percentage bonuses the ship's crew grants on land
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewBonuses {
    pub melee: f32,
    pub pistol: f32,
    pub gold_find: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub facing: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub health: Health,
    pub weapon: WeaponKind,
    pub ammo: u32,
    pub max_ammo: u32,
    pub gold: u32,
    pub kills: u32,
    pub bonuses: CrewBonuses,
    pub swing: Option<MeleeSwing>,
    pub swing_cooldown: f32,
    pub combo: u32,
    pub combo_timer: f32,
    pub shoot_cooldown: f32,
    pub dodge_timer: f32,
    pub dodge_cooldown: f32,
    pub dodge_dir: Vec2,
    pub invulnerable: f32,
    pub knockback: Knockback,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PLAYER_BASE_HP)
    }
}

impl Player {
    pub fn new(max_hp: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            facing: Vec2::new(1.0, 0.0),
            radius: PLAYER_RADIUS,
            speed: PLAYER_SPEED,
            health: Health::new(max_hp),
            weapon: WeaponKind::RustyCutlass,
            ammo: STARTING_AMMO,
            max_ammo: STARTING_MAX_AMMO,
            gold: 0,
            kills: 0,
            bonuses: CrewBonuses::default(),
            swing: None,
            swing_cooldown: 0.0,
            combo: 0,
            combo_timer: 0.0,
            shoot_cooldown: 0.0,
            dodge_timer: 0.0,
            dodge_cooldown: 0.0,
            dodge_dir: Vec2::ZERO,
            invulnerable: 0.0,
            knockback: Knockback::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    pub fn is_dodging(&self) -> bool {
        self.dodge_timer > 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0 || self.is_dodging()
    }

    /// Put the avatar at a level's spawn and clear per-level transients
    pub fn enter_level(&mut self, pos: Vec2) {
        self.pos = pos;
        self.swing = None;
        self.knockback = Knockback::default();
        self.dodge_timer = 0.0;
        self.invulnerable = 0.0;
    }

    /// Advance one step. Dead avatars do nothing.
    pub fn update(
        &mut self,
        dt: f32,
        intent: &PlayerIntent,
        terrain: &dyn Terrain,
        config: &CombatConfig,
    ) -> Vec<PlayerAction> {
        let mut actions = Vec::new();
        if !self.is_alive() {
            return actions;
        }
        self.tick_timers(dt);

        if self.knockback.is_active() {
            let delta = self.knockback.step(dt, config.knockback_decay);
            self.pos = slide(terrain, self.pos, delta);
            return actions;
        }

        if self.is_dodging() {
            self.dodge_timer -= dt;
            self.pos = slide(terrain, self.pos, self.dodge_dir * (DODGE_SPEED * dt));
            if !self.is_dodging() {
                self.dodge_cooldown = DODGE_COOLDOWN;
            }
            return actions;
        }

        let move_dir = intent.move_dir.normalize();
        if let Some(aim) = intent.aim.filter(|a| !a.is_zero()) {
            self.facing = aim.normalize();
        } else if !move_dir.is_zero() {
            self.facing = move_dir;
        }

        if intent.dodge {
            match cooldown_check(self.dodge_cooldown) {
                Ok(()) => {
                    self.dodge_dir = if move_dir.is_zero() { self.facing } else { move_dir };
                    self.dodge_timer = DODGE_DURATION;
                    self.invulnerable =
                        self.invulnerable.max(DODGE_DURATION + DODGE_INVULNERABILITY_PAD);
                    actions.push(PlayerAction::Dodged);
                    return actions;
                }
                Err(reason) => actions.push(PlayerAction::Rejected {
                    action: ActionKind::Dodge,
                    reason,
                }),
            }
        }

        self.pos = slide(terrain, self.pos, move_dir * (self.speed * dt));

        if intent.attack {
            match cooldown_check(self.swing_cooldown) {
                Ok(()) => {
                    self.combo += 1;
                    self.combo_timer = COMBO_WINDOW;
                    let damage = self.melee_damage();
                    self.swing =
                        Some(MeleeSwing::new(self.facing, self.weapon.range(), damage, SWING_DURATION));
                    self.swing_cooldown = self.weapon.swing_cooldown();
                    actions.push(PlayerAction::Swung);
                }
                Err(reason) => actions.push(PlayerAction::Rejected {
                    action: ActionKind::Swing,
                    reason,
                }),
            }
        }

        if intent.fire {
            match self.fire_pistol() {
                Ok(shot) => actions.push(PlayerAction::Fired(shot)),
                Err(reason) => actions.push(PlayerAction::Rejected {
                    action: ActionKind::Pistol,
                    reason,
                }),
            }
        }
        actions
    }

    /// Ammo is checked before the reload timer
    fn fire_pistol(&mut self) -> Result<Projectile, ActionRejection> {
        if self.ammo == 0 {
            return Err(ActionRejection::InsufficientResource {
                resource: "ammo",
                needed: 1,
                available: 0,
            });
        }
        cooldown_check(self.shoot_cooldown)?;
        self.ammo -= 1;
        self.shoot_cooldown = PISTOL_COOLDOWN;
        let shot = Projectile::aimed(
            self.pos,
            self.pos + self.facing,
            0.0,
            PISTOL_SPEED,
            PISTOL_DAMAGE * (1.0 + self.bonuses.pistol),
            PISTOL_LIFETIME,
            BULLET_RADIUS,
            Faction::Friendly,
        )
        .with_knockback(BULLET_KNOCKBACK);
        Ok(shot)
    }

    fn tick_timers(&mut self, dt: f32) {
        self.swing_cooldown -= dt;
        self.shoot_cooldown -= dt;
        self.dodge_cooldown -= dt;
        self.invulnerable -= dt;
        if self.combo_timer > 0.0 {
            self.combo_timer -= dt;
            if self.combo_timer <= 0.0 {
                self.combo = 0;
            }
        }
        if let Some(swing) = &mut self.swing {
            swing.tick(dt);
            if swing.remaining <= 0.0 {
                self.swing = None;
            }
        }
    }

    /// Damage of the swing being started. A combo-crit weapon doubles the
    /// hit that completes a combo and starts counting again.
    fn melee_damage(&mut self) -> f32 {
        let mut damage = self.weapon.damage() * (1.0 + self.bonuses.melee);
        if self.weapon.special() == WeaponSpecial::ComboCrit && self.combo >= COMBO_CRIT_HITS {
            damage *= 2.0;
            self.combo = 0;
        }
        damage
    }

    /// Take a hit. Ignored while invulnerable; otherwise grants a short
    /// invulnerability window and a shove away from `source`.
    pub fn take_damage(
        &mut self,
        amount: f32,
        source: Vec2,
        config: &CombatConfig,
    ) -> Option<DamageOutcome> {
        if self.is_invulnerable() || !self.is_alive() {
            return None;
        }
        let outcome = self.health.apply(amount);
        self.invulnerable = config.player_invulnerability;
        if outcome == DamageOutcome::Wounded {
            self.knockback =
                Knockback::from_source(source, self.pos, PLAYER_KNOCKBACK, config.knockback_duration);
        }
        Some(outcome)
    }

    /// Apply a picked-up item. Returns the gold actually credited, if any.
    pub fn collect(&mut self, item: ItemKind) -> u32 {
        match item {
            ItemKind::Gold(amount) => {
                let credited = (amount as f32 * (1.0 + self.bonuses.gold_find)).floor() as u32;
                self.gold += credited;
                credited
            }
            ItemKind::Heart => {
                self.health.heal(HEART_HEAL);
                0
            }
            ItemKind::Ammo(amount) => {
                self.ammo = (self.ammo + amount).min(self.max_ammo);
                0
            }
            ItemKind::Weapon(weapon) => {
                self.weapon = weapon;
                0
            }
        }
    }
}

/// `Ok` once a cooldown timer has run out
pub(crate) fn cooldown_check(timer: f32) -> Result<(), ActionRejection> {
    if timer > 0.0 {
        Err(ActionRejection::OnCooldown { remaining: timer })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::terrain::OpenWater;

    const FIELD: OpenWater = OpenWater {
        width: 1000.0,
        height: 1000.0,
    };

    fn placed() -> Player {
        let mut p = Player::default();
        p.enter_level(Vec2::new(500.0, 500.0));
        p
    }

    #[test]
    fn test_moves_at_speed() {
        let config = CombatConfig::default();
        let mut p = placed();
        let intent = PlayerIntent {
            move_dir: Vec2::new(2.0, 0.0),
            ..Default::default()
        };
        p.update(0.5, &intent, &FIELD, &config);
        assert!((p.pos.x - 560.0).abs() < 1e-3);
    }

    #[test]
    fn test_dodge_grants_invulnerability() {
        let config = CombatConfig::default();
        let mut p = placed();
        let intent = PlayerIntent {
            move_dir: Vec2::new(0.0, 1.0),
            dodge: true,
            ..Default::default()
        };
        let actions = p.update(0.016, &intent, &FIELD, &config);
        assert_eq!(actions, vec![PlayerAction::Dodged]);
        assert!(p.is_invulnerable());
        assert_eq!(p.take_damage(10.0, Vec2::ZERO, &config), None);
        assert_eq!(p.health.current, PLAYER_BASE_HP);

        let idle = PlayerIntent::default();
        for _ in 0..5 {
            p.update(0.05, &idle, &FIELD, &config);
        }
        assert!(!p.is_dodging());
        assert!(p.pos.y > 560.0);
        // Cooldown blocks an immediate second roll
        let again = p.update(0.016, &intent, &FIELD, &config);
        assert!(matches!(
            again.as_slice(),
            [PlayerAction::Rejected {
                action: ActionKind::Dodge,
                reason: ActionRejection::OnCooldown { .. },
            }]
        ));
        assert!(!p.is_dodging());
    }

    #[test]
    fn test_damage_then_invulnerability_window() {
        let config = CombatConfig::default();
        let mut p = placed();
        assert_eq!(
            p.take_damage(10.0, Vec2::new(490.0, 500.0), &config),
            Some(DamageOutcome::Wounded)
        );
        assert_eq!(p.take_damage(10.0, Vec2::ZERO, &config), None);
        assert!(p.knockback.is_active());
        p.update(0.6, &PlayerIntent::default(), &FIELD, &config);
        assert!(p.pos.x > 500.0);
        assert!(p.take_damage(10.0, Vec2::ZERO, &config).is_some());
    }

    #[test]
    fn test_saber_third_hit_crits() {
        let config = CombatConfig::default();
        let mut p = placed();
        p.weapon = WeaponKind::CaptainsSaber;
        let attack = PlayerIntent {
            attack: true,
            ..Default::default()
        };
        let mut damages = Vec::new();
        for _ in 0..3 {
            p.update(0.0, &attack, &FIELD, &config);
            damages.push(p.swing.map(|s| s.damage).unwrap_or(0.0));
            p.swing_cooldown = 0.0;
        }
        assert_eq!(damages, vec![12.0, 12.0, 24.0]);
        assert_eq!(p.combo, 0);
    }

    #[test]
    fn test_combo_resets_after_window() {
        let config = CombatConfig::default();
        let mut p = placed();
        let attack = PlayerIntent {
            attack: true,
            ..Default::default()
        };
        p.update(0.0, &attack, &FIELD, &config);
        assert_eq!(p.combo, 1);
        p.update(0.7, &PlayerIntent::default(), &FIELD, &config);
        assert_eq!(p.combo, 0);
    }

    #[test]
    fn test_pistol_consumes_ammo() {
        let config = CombatConfig::default();
        let mut p = placed();
        p.ammo = 1;
        let fire = PlayerIntent {
            fire: true,
            aim: Some(Vec2::new(0.0, -1.0)),
            ..Default::default()
        };
        let actions = p.update(0.016, &fire, &FIELD, &config);
        assert!(matches!(actions.as_slice(), [PlayerAction::Fired(shot)] if shot.vel.y < 0.0));
        assert_eq!(p.ammo, 0);
        p.shoot_cooldown = 0.0;
        assert_eq!(
            p.update(0.016, &fire, &FIELD, &config),
            vec![PlayerAction::Rejected {
                action: ActionKind::Pistol,
                reason: ActionRejection::InsufficientResource {
                    resource: "ammo",
                    needed: 1,
                    available: 0,
                },
            }]
        );
        assert_eq!(p.ammo, 0);
        assert!(p.shoot_cooldown <= 0.0);
    }

    #[test]
    fn test_pistol_on_cooldown_keeps_ammo() {
        let config = CombatConfig::default();
        let mut p = placed();
        let fire = PlayerIntent {
            fire: true,
            ..Default::default()
        };
        p.update(0.0, &fire, &FIELD, &config);
        assert_eq!(p.ammo, STARTING_AMMO - 1);

        let actions = p.update(0.1, &fire, &FIELD, &config);
        let [PlayerAction::Rejected {
            action: ActionKind::Pistol,
            reason: ActionRejection::OnCooldown { remaining },
        }] = actions.as_slice()
        else {
            panic!("expected a cooldown rejection, got {actions:?}");
        };
        assert!((remaining - (PISTOL_COOLDOWN - 0.1)).abs() < 1e-4);
        assert_eq!(p.ammo, STARTING_AMMO - 1);
        assert!((p.shoot_cooldown - (PISTOL_COOLDOWN - 0.1)).abs() < 1e-4);
    }

    #[test]
    fn test_swing_on_cooldown_is_rejected() {
        let config = CombatConfig::default();
        let mut p = placed();
        let attack = PlayerIntent {
            attack: true,
            ..Default::default()
        };
        assert_eq!(p.update(0.0, &attack, &FIELD, &config), vec![PlayerAction::Swung]);
        let cooldown = p.swing_cooldown;

        let actions = p.update(0.0, &attack, &FIELD, &config);
        assert_eq!(
            actions,
            vec![PlayerAction::Rejected {
                action: ActionKind::Swing,
                reason: ActionRejection::OnCooldown { remaining: cooldown },
            }]
        );
        assert_eq!(p.combo, 1);
        assert_eq!(p.swing_cooldown, cooldown);
    }

    #[test]
    fn test_collect_items() {
        let mut p = placed();
        p.bonuses.gold_find = 0.5;
        assert_eq!(p.collect(ItemKind::Gold(10)), 15);
        p.collect(ItemKind::Ammo(10));
        assert_eq!(p.ammo, STARTING_MAX_AMMO);
        p.collect(ItemKind::Weapon(WeaponKind::CoralMace));
        assert_eq!(p.weapon, WeaponKind::CoralMace);
    }
}
