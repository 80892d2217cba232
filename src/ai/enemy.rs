//! Continuous-space enemy FSM
//!
//! All archetypes share `AgentBase` and the same idle/chase/attack loop.
//! Archetype payloads add flee and shooting (ranged pirates), phases with
//! dash and summon (the boss), and cannon fire (enemy ships).
//!
//! `Enemy::update` never touches the target. Damage, projectiles and
//! reinforcements come back as `EnemyIntent`s for the simulation step to apply.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::constants::{
    BOSS_SWEEP_BONUS, BULLET_KNOCKBACK, BULLET_RADIUS, CANNONBALL_RADIUS, CANNONBALL_SPEED,
    ENEMY_BULLET_LIFETIME, ENEMY_BULLET_SPEED, MUZZLE_OFFSET,
};
use crate::combat::damage::{DamageOutcome, Health};
use crate::combat::projectile::{Faction, Projectile};
use crate::combat::status::{Bleed, Knockback};
use crate::core::config::CombatConfig;
use crate::core::types::{AgentId, SimRng, Vec2};
use crate::spatial::geometry::direction;
use crate::world::terrain::{slide, Terrain};

const FLEE_DURATION: f32 = 0.8;
const FLEE_SPEED_FACTOR: f32 = 1.2;

const BOSS_PHASE_TWO_AT: f32 = 0.6;
const BOSS_PHASE_THREE_AT: f32 = 0.25;
const BOSS_DASH_DISTANCE: f32 = 200.0;
const BOSS_DASH_MIN: f32 = 50.0;
const BOSS_DASH_MAX: f32 = 150.0;
const BOSS_DASH_COOLDOWN: f32 = 2.5;
const BOSS_SUMMON_INTERVAL: f32 = 8.0;
const BOSS_MAX_ADDS: usize = 4;
const BOSS_ADD_DIFFICULTY: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    Idle,
    Chase,
    Attack,
    Flee,
    Dead,
}

/// Archetype tag used for spawning and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Crab,
    MeleePirate,
    RangedPirate,
    Boss,
    Ship,
}

impl Archetype {
    /// Island spawn roll: 40% crab, 35% melee, 25% ranged
    pub fn roll(rng: &mut SimRng) -> Self {
        let roll: f32 = rng.gen();
        if roll < 0.4 {
            Archetype::Crab
        } else if roll < 0.75 {
            Archetype::MeleePirate
        } else {
            Archetype::RangedPirate
        }
    }

    /// Share of base damage dealt each contact tick
    pub fn contact_factor(&self) -> f32 {
        match self {
            Archetype::Crab | Archetype::Boss => 0.5,
            Archetype::MeleePirate | Archetype::RangedPirate => 0.25,
            Archetype::Ship => 0.0,
        }
    }
}

/// State shared by every archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentBase {
    pub id: AgentId,
    pub pos: Vec2,
    pub facing: Vec2,
    pub radius: f32,
    pub health: Health,
    pub speed: f32,
    pub damage: f32,
    pub aggro_range: f32,
    pub attack_range: f32,
    /// Wind-up between committing to an attack and resolving it
    pub attack_duration: f32,
    pub attack_cooldown: f32,
    pub cooldown_timer: f32,
    pub state: EnemyState,
    pub state_timer: f32,
    pub knockback: Knockback,
    pub bleed: Option<Bleed>,
    /// Seconds a dead agent lingers before removal
    pub corpse_timer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangedKit {
    pub flee_range: f32,
    pub shoot_cooldown: f32,
    pub shoot_timer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossKit {
    pub phase: u8,
    pub dash_timer: f32,
    pub summon_timer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipKit {
    pub cannon_cooldown: f32,
    pub cannon_timer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    Crab,
    MeleePirate,
    RangedPirate(RangedKit),
    Boss(BossKit),
    Ship(ShipKit),
}

/// What the world should do on behalf of an enemy this step
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyIntent {
    /// A wound-up attack connected. Range was checked at resolution time.
    Strike { damage: f32, from: Vec2 },
    Fire(Projectile),
    Summon {
        archetype: Archetype,
        pos: Vec2,
        difficulty: u32,
    },
    PhaseShift { phase: u8 },
    Dash { from: Vec2, to: Vec2 },
}

/// Read-only view of the world an enemy reacts to
pub struct EnemyContext<'a> {
    pub target: Vec2,
    pub target_radius: f32,
    /// Living enemies other than bosses
    pub allies_alive: usize,
    pub terrain: &'a dyn Terrain,
    pub config: &'a CombatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub base: AgentBase,
    pub kind: EnemyKind,
}

impl Enemy {
    /// Build an archetype with stats scaled by difficulty
    pub fn spawn(id: AgentId, archetype: Archetype, pos: Vec2, difficulty: u32) -> Self {
        let d = difficulty as f32;
        let mut base = AgentBase {
            id,
            pos,
            facing: Vec2::new(1.0, 0.0),
            radius: 7.0,
            health: Health::new(1.0),
            speed: 0.0,
            damage: 0.0,
            aggro_range: 120.0 + d * 10.0,
            attack_range: 24.0,
            attack_duration: 0.3,
            attack_cooldown: 1.0,
            cooldown_timer: 0.0,
            state: EnemyState::Idle,
            state_timer: 0.0,
            knockback: Knockback::default(),
            bleed: None,
            corpse_timer: 0.0,
        };
        let kind = match archetype {
            Archetype::Crab => {
                base.health = Health::new(20.0 + d * 5.0);
                base.speed = 40.0 + d * 3.0;
                base.damage = 8.0 + d * 2.0;
                base.attack_range = 18.0;
                base.attack_cooldown = 1.2;
                EnemyKind::Crab
            }
            Archetype::MeleePirate => {
                base.health = Health::new(30.0 + d * 8.0);
                base.speed = 55.0 + d * 4.0;
                base.damage = 10.0 + d * 3.0;
                base.attack_range = 26.0;
                base.attack_cooldown = 0.9;
                EnemyKind::MeleePirate
            }
            Archetype::RangedPirate => {
                base.health = Health::new(20.0 + d * 5.0);
                base.speed = 45.0 + d * 3.0;
                base.damage = 12.0 + d * 2.0;
                base.attack_range = 130.0;
                base.attack_cooldown = 1.5;
                EnemyKind::RangedPirate(RangedKit {
                    flee_range: 60.0,
                    shoot_cooldown: 1.5,
                    shoot_timer: 0.0,
                })
            }
            Archetype::Boss => {
                base.health = Health::new(200.0);
                base.speed = 65.0;
                base.damage = 18.0;
                base.aggro_range = 200.0;
                base.attack_range = 35.0;
                base.attack_duration = 0.4;
                base.attack_cooldown = 0.7;
                base.radius = 12.0;
                EnemyKind::Boss(BossKit {
                    phase: 1,
                    dash_timer: 0.0,
                    summon_timer: 0.0,
                })
            }
            Archetype::Ship => {
                base.health = Health::new(60.0 + d * 20.0);
                base.speed = 50.0 + d * 3.0;
                base.damage = 8.0 + d * 2.0;
                base.aggro_range = 220.0 + d * 10.0;
                base.attack_range = 120.0;
                base.attack_cooldown = 2.5;
                base.radius = 12.0;
                EnemyKind::Ship(ShipKit {
                    cannon_cooldown: 2.5,
                    cannon_timer: 1.0,
                })
            }
        };
        Self { base, kind }
    }

    pub fn archetype(&self) -> Archetype {
        match self.kind {
            EnemyKind::Crab => Archetype::Crab,
            EnemyKind::MeleePirate => Archetype::MeleePirate,
            EnemyKind::RangedPirate(_) => Archetype::RangedPirate,
            EnemyKind::Boss(_) => Archetype::Boss,
            EnemyKind::Ship(_) => Archetype::Ship,
        }
    }

    pub fn id(&self) -> AgentId {
        self.base.id
    }

    pub fn pos(&self) -> Vec2 {
        self.base.pos
    }

    pub fn state(&self) -> EnemyState {
        self.base.state
    }

    pub fn is_alive(&self) -> bool {
        self.base.state != EnemyState::Dead
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss(_))
    }

    pub fn boss_phase(&self) -> Option<u8> {
        match self.kind {
            EnemyKind::Boss(kit) => Some(kit.phase),
            _ => None,
        }
    }

    /// Dead and past its grace period
    pub fn is_removable(&self) -> bool {
        !self.is_alive() && self.base.corpse_timer <= 0.0
    }

    /// Damage dealt per contact tick with the target
    pub fn contact_damage(&self) -> f32 {
        (self.base.damage * self.archetype().contact_factor()).floor()
    }

    /// Take a hit from `source`. A surviving idle enemy is provoked into a chase.
    pub fn hit(
        &mut self,
        damage: f32,
        source: Vec2,
        knockback: f32,
        config: &CombatConfig,
    ) -> DamageOutcome {
        let outcome = self.base.health.apply(damage);
        match outcome {
            DamageOutcome::AlreadyDead => {}
            DamageOutcome::Killed => self.die(config),
            DamageOutcome::Wounded => {
                if knockback > 0.0 {
                    self.base.knockback = Knockback::from_source(
                        source,
                        self.base.pos,
                        knockback,
                        config.knockback_duration,
                    );
                }
                if self.base.state == EnemyState::Idle {
                    self.base.state = EnemyState::Chase;
                }
            }
        }
        outcome
    }

    pub fn apply_bleed(&mut self, bleed: Bleed) {
        if self.is_alive() {
            self.base.bleed = Some(bleed);
        }
    }

    /// Advance bleed. Returns the outcome when any damage was dealt.
    pub fn tick_bleed(&mut self, dt: f32, config: &CombatConfig) -> Option<DamageOutcome> {
        let bleed = self.base.bleed.as_mut()?;
        let amount = bleed.tick(dt);
        if !bleed.is_active() {
            self.base.bleed = None;
        }
        if amount <= 0.0 {
            return None;
        }
        let outcome = self.base.health.apply(amount);
        if outcome == DamageOutcome::Killed {
            self.die(config);
        }
        Some(outcome)
    }

    fn die(&mut self, config: &CombatConfig) {
        self.base.state = EnemyState::Dead;
        self.base.corpse_timer = config.corpse_grace;
        self.base.knockback = Knockback::default();
        self.base.bleed = None;
    }

    /// One step of AI. Dead enemies only count down their corpse timer.
    pub fn update(&mut self, dt: f32, ctx: &EnemyContext, rng: &mut SimRng) -> Vec<EnemyIntent> {
        let mut intents = Vec::new();
        if !self.is_alive() {
            self.base.corpse_timer -= dt;
            return intents;
        }

        self.tick_timers(dt);
        self.escalate(&mut intents);

        if self.base.knockback.is_active() {
            let delta = self.base.knockback.step(dt, ctx.config.knockback_decay);
            self.base.pos = slide(ctx.terrain, self.base.pos, delta);
            return intents;
        }

        let dist = self.base.pos.distance(&ctx.target);
        if self.is_boss() {
            self.update_boss(dt, dist, ctx, rng, &mut intents);
        } else {
            self.update_normal(dt, dist, ctx, rng, &mut intents);
        }
        intents
    }

    fn tick_timers(&mut self, dt: f32) {
        let base = &mut self.base;
        base.cooldown_timer = (base.cooldown_timer - dt).max(0.0);
        match &mut self.kind {
            EnemyKind::RangedPirate(kit) => kit.shoot_timer -= dt,
            EnemyKind::Boss(kit) => {
                kit.dash_timer -= dt;
                kit.summon_timer -= dt;
            }
            EnemyKind::Ship(kit) => kit.cannon_timer -= dt,
            EnemyKind::Crab | EnemyKind::MeleePirate => {}
        }
    }

    /// Boss phase changes. Each escalation is permanent and brings two adds.
    fn escalate(&mut self, intents: &mut Vec<EnemyIntent>) {
        let EnemyKind::Boss(kit) = &mut self.kind else {
            return;
        };
        let base = &mut self.base;
        let fraction = base.health.fraction();
        let mut escalated = false;
        if fraction < BOSS_PHASE_TWO_AT && kit.phase < 2 {
            kit.phase = 2;
            base.speed = 80.0;
            escalated = true;
            intents.push(EnemyIntent::PhaseShift { phase: 2 });
            push_flanking_adds(base.pos, intents);
        }
        if fraction < BOSS_PHASE_THREE_AT && kit.phase < 3 {
            kit.phase = 3;
            base.speed = 100.0;
            base.damage = 25.0;
            base.attack_cooldown = 0.5;
            escalated = true;
            intents.push(EnemyIntent::PhaseShift { phase: 3 });
            push_flanking_adds(base.pos, intents);
        }
        if escalated {
            tracing::info!(boss = base.id.0, phase = kit.phase, hp = base.health.current, "Boss escalated");
        }
    }

    fn update_normal(
        &mut self,
        dt: f32,
        dist: f32,
        ctx: &EnemyContext,
        rng: &mut SimRng,
        intents: &mut Vec<EnemyIntent>,
    ) {
        match self.base.state {
            EnemyState::Idle => {
                if dist < self.base.aggro_range {
                    self.base.state = EnemyState::Chase;
                }
            }
            EnemyState::Chase => {
                if dist > self.base.aggro_range * ctx.config.deaggro_multiplier {
                    self.base.state = EnemyState::Idle;
                    return;
                }
                if let EnemyKind::RangedPirate(kit) = self.kind {
                    if dist < kit.flee_range {
                        self.base.state = EnemyState::Flee;
                        self.base.state_timer = FLEE_DURATION;
                        return;
                    }
                }
                if dist > self.base.attack_range {
                    self.step_toward(ctx.target, self.base.speed, dt, ctx.terrain);
                    return;
                }
                match self.kind {
                    EnemyKind::RangedPirate(_) | EnemyKind::Ship(_) => {
                        self.face(ctx.target);
                        self.try_fire(ctx.target, rng, intents);
                    }
                    _ => {
                        if self.base.cooldown_timer <= 0.0 {
                            self.face(ctx.target);
                            self.base.state = EnemyState::Attack;
                            self.base.state_timer = self.base.attack_duration;
                            self.base.cooldown_timer = self.base.attack_cooldown;
                        }
                    }
                }
            }
            EnemyState::Attack => {
                self.base.state_timer -= dt;
                if self.base.state_timer <= 0.0 {
                    if dist < self.base.attack_range + ctx.target_radius {
                        intents.push(EnemyIntent::Strike {
                            damage: self.base.damage,
                            from: self.base.pos,
                        });
                    }
                    self.base.state = EnemyState::Chase;
                }
            }
            EnemyState::Flee => {
                self.base.state_timer -= dt;
                let away = direction(ctx.target, self.base.pos);
                let delta = away * (self.base.speed * FLEE_SPEED_FACTOR * dt);
                self.base.pos = slide(ctx.terrain, self.base.pos, delta);
                if !away.is_zero() {
                    self.base.facing = away;
                }
                if self.base.state_timer <= 0.0 {
                    self.base.state = EnemyState::Chase;
                }
                self.try_fire(ctx.target, rng, intents);
            }
            EnemyState::Dead => {}
        }
    }

    fn update_boss(
        &mut self,
        dt: f32,
        dist: f32,
        ctx: &EnemyContext,
        rng: &mut SimRng,
        intents: &mut Vec<EnemyIntent>,
    ) {
        let EnemyKind::Boss(kit) = self.kind else {
            return;
        };
        if self.base.state == EnemyState::Idle {
            if dist < self.base.aggro_range {
                self.base.state = EnemyState::Chase;
            }
            return;
        }

        if kit.phase >= 3 && kit.summon_timer <= 0.0 {
            if let EnemyKind::Boss(kit) = &mut self.kind {
                kit.summon_timer = BOSS_SUMMON_INTERVAL;
            }
            if ctx.allies_alive < BOSS_MAX_ADDS {
                let offset = Vec2::new((rng.gen::<f32>() - 0.5) * 60.0, 30.0);
                intents.push(EnemyIntent::Summon {
                    archetype: Archetype::MeleePirate,
                    pos: self.base.pos + offset,
                    difficulty: BOSS_ADD_DIFFICULTY,
                });
            }
        }

        match self.base.state {
            EnemyState::Attack => {
                self.base.state_timer -= dt;
                if self.base.state_timer <= 0.0 {
                    let reach = self.base.attack_range + ctx.target_radius + BOSS_SWEEP_BONUS;
                    if dist < reach {
                        intents.push(EnemyIntent::Strike {
                            damage: self.base.damage,
                            from: self.base.pos,
                        });
                    }
                    self.base.state = EnemyState::Chase;
                }
            }
            _ => {
                if kit.phase >= 3
                    && kit.dash_timer <= 0.0
                    && dist > BOSS_DASH_MIN
                    && dist < BOSS_DASH_MAX
                {
                    if let Some(to) = self.dash_target(ctx) {
                        intents.push(EnemyIntent::Dash {
                            from: self.base.pos,
                            to,
                        });
                        self.base.pos = to;
                    }
                    if let EnemyKind::Boss(kit) = &mut self.kind {
                        kit.dash_timer = BOSS_DASH_COOLDOWN;
                    }
                    return;
                }
                if dist > self.base.attack_range {
                    self.step_toward(ctx.target, self.base.speed, dt, ctx.terrain);
                } else if self.base.cooldown_timer <= 0.0 {
                    self.face(ctx.target);
                    self.base.state = EnemyState::Attack;
                    self.base.state_timer = self.base.attack_duration;
                    self.base.cooldown_timer = self.base.attack_cooldown;
                }
            }
        }
    }

    /// Farthest passable landing point along the dash line
    fn dash_target(&self, ctx: &EnemyContext) -> Option<Vec2> {
        let dir = direction(self.base.pos, ctx.target);
        [1.0, 0.75, 0.5, 0.25]
            .into_iter()
            .map(|f| self.base.pos + dir * (BOSS_DASH_DISTANCE * f))
            .find(|p| ctx.terrain.is_passable(*p))
    }

    fn try_fire(&mut self, target: Vec2, rng: &mut SimRng, intents: &mut Vec<EnemyIntent>) {
        match &mut self.kind {
            EnemyKind::RangedPirate(kit) if kit.shoot_timer <= 0.0 => {
                kit.shoot_timer = kit.shoot_cooldown;
                let shot = Projectile::aimed(
                    self.base.pos,
                    target,
                    MUZZLE_OFFSET,
                    ENEMY_BULLET_SPEED,
                    self.base.damage,
                    ENEMY_BULLET_LIFETIME,
                    BULLET_RADIUS,
                    Faction::Hostile,
                )
                .with_knockback(BULLET_KNOCKBACK);
                intents.push(EnemyIntent::Fire(shot));
            }
            EnemyKind::Ship(kit) if kit.cannon_timer <= 0.0 => {
                kit.cannon_timer = kit.cannon_cooldown;
                let damage = self.base.damage + rng.gen_range(0..12) as f32;
                let lifetime = self.base.attack_range / CANNONBALL_SPEED;
                let shot = Projectile::aimed(
                    self.base.pos,
                    target,
                    self.base.radius,
                    CANNONBALL_SPEED,
                    damage,
                    lifetime,
                    CANNONBALL_RADIUS,
                    Faction::Hostile,
                );
                intents.push(EnemyIntent::Fire(shot));
            }
            _ => {}
        }
    }

    fn face(&mut self, target: Vec2) {
        let dir = direction(self.base.pos, target);
        if !dir.is_zero() {
            self.base.facing = dir;
        }
    }

    fn step_toward(&mut self, target: Vec2, speed: f32, dt: f32, terrain: &dyn Terrain) {
        let dir = direction(self.base.pos, target);
        if dir.is_zero() {
            return;
        }
        self.base.facing = dir;
        self.base.pos = slide(terrain, self.base.pos, dir * (speed * dt));
    }
}

fn push_flanking_adds(at: Vec2, intents: &mut Vec<EnemyIntent>) {
    for dx in [-40.0, 40.0] {
        intents.push(EnemyIntent::Summon {
            archetype: Archetype::MeleePirate,
            pos: at + Vec2::new(dx, 20.0),
            difficulty: BOSS_ADD_DIFFICULTY,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::seeded_rng;
    use crate::world::terrain::OpenWater;

    const SEA: OpenWater = OpenWater {
        width: 2000.0,
        height: 2000.0,
    };

    fn ctx<'a>(target: Vec2, config: &'a CombatConfig) -> EnemyContext<'a> {
        EnemyContext {
            target,
            target_radius: 6.0,
            allies_alive: 0,
            terrain: &SEA,
            config,
        }
    }

    fn at_origin(archetype: Archetype) -> Enemy {
        Enemy::spawn(AgentId(0), archetype, Vec2::new(500.0, 500.0), 0)
    }

    #[test]
    fn test_aggro_and_deaggro() {
        let config = CombatConfig::default();
        let mut rng = seeded_rng(1);
        let mut crab = at_origin(Archetype::Crab);
        assert_eq!(crab.base.aggro_range, 120.0);

        crab.update(0.016, &ctx(Vec2::new(600.0, 500.0), &config), &mut rng);
        assert_eq!(crab.state(), EnemyState::Chase);

        let far = crab.pos() + Vec2::new(190.0, 0.0);
        crab.update(0.016, &ctx(far, &config), &mut rng);
        assert_eq!(crab.state(), EnemyState::Idle);
    }

    #[test]
    fn test_no_oscillation_at_boundary() {
        let config = CombatConfig::default();
        let mut rng = seeded_rng(1);
        let mut crab = at_origin(Archetype::Crab);
        let target = crab.pos() + Vec2::new(120.0, 0.0);
        for _ in 0..20 {
            crab.update(0.016, &ctx(target, &config), &mut rng);
            assert_eq!(crab.state(), EnemyState::Idle);
        }

        // Once chasing, hovering anywhere inside the de-aggro band never drops it
        crab.base.state = EnemyState::Chase;
        crab.base.speed = 0.0;
        for _ in 0..20 {
            crab.update(0.016, &ctx(target, &config), &mut rng);
            assert_eq!(crab.state(), EnemyState::Chase);
        }
    }

    #[test]
    fn test_attack_resolves_after_windup_with_live_range() {
        let config = CombatConfig::default();
        let mut rng = seeded_rng(1);
        let mut pirate = at_origin(Archetype::MeleePirate);
        pirate.base.state = EnemyState::Chase;
        let close = pirate.pos() + Vec2::new(20.0, 0.0);

        let intents = pirate.update(0.016, &ctx(close, &config), &mut rng);
        assert!(intents.is_empty());
        assert_eq!(pirate.state(), EnemyState::Attack);

        // Target steps out of reach during the wind-up
        let gone = pirate.pos() + Vec2::new(60.0, 0.0);
        let intents = pirate.update(0.31, &ctx(gone, &config), &mut rng);
        assert!(intents.is_empty());
        assert_eq!(pirate.state(), EnemyState::Chase);

        // Next cycle the target stays put and the strike lands
        pirate.base.cooldown_timer = 0.0;
        pirate.update(0.016, &ctx(close, &config), &mut rng);
        let intents = pirate.update(0.31, &ctx(close, &config), &mut rng);
        assert!(matches!(intents.as_slice(), [EnemyIntent::Strike { .. }]));
    }

    #[test]
    fn test_ranged_flees_and_shoots() {
        let config = CombatConfig::default();
        let mut rng = seeded_rng(1);
        let mut gunner = at_origin(Archetype::RangedPirate);
        gunner.base.state = EnemyState::Chase;
        let start = gunner.pos();
        let player = start + Vec2::new(30.0, 0.0);

        gunner.update(0.016, &ctx(player, &config), &mut rng);
        assert_eq!(gunner.state(), EnemyState::Flee);

        let intents = gunner.update(0.1, &ctx(player, &config), &mut rng);
        assert!(gunner.pos().x < start.x);
        assert!(matches!(intents.as_slice(), [EnemyIntent::Fire(p)] if p.faction == Faction::Hostile));

        for _ in 0..8 {
            gunner.update(0.1, &ctx(player, &config), &mut rng);
        }
        assert_eq!(gunner.state(), EnemyState::Chase);
    }

    #[test]
    fn test_knockback_overrides_fsm() {
        let config = CombatConfig::default();
        let mut rng = seeded_rng(1);
        let mut pirate = at_origin(Archetype::MeleePirate);
        let before = pirate.pos();
        let player = before + Vec2::new(-20.0, 0.0);
        let outcome = pirate.hit(5.0, player, 100.0, &config);
        assert_eq!(outcome, DamageOutcome::Wounded);
        assert_eq!(pirate.state(), EnemyState::Chase);

        let intents = pirate.update(0.016, &ctx(player, &config), &mut rng);
        assert!(intents.is_empty());
        assert!(pirate.pos().x > before.x);
        assert_eq!(pirate.state(), EnemyState::Chase);
    }

    #[test]
    fn test_double_kill_in_one_step() {
        let config = CombatConfig::default();
        let mut crab = at_origin(Archetype::Crab);
        assert_eq!(crab.hit(100.0, Vec2::ZERO, 100.0, &config), DamageOutcome::Killed);
        assert_eq!(crab.hit(100.0, Vec2::ZERO, 100.0, &config), DamageOutcome::AlreadyDead);
        assert!(!crab.is_alive());
        assert!(!crab.is_removable());
    }

    #[test]
    fn test_corpse_grace() {
        let config = CombatConfig::default();
        let mut rng = seeded_rng(1);
        let mut crab = at_origin(Archetype::Crab);
        crab.hit(100.0, Vec2::ZERO, 0.0, &config);
        crab.update(0.3, &ctx(Vec2::ZERO, &config), &mut rng);
        assert!(!crab.is_removable());
        crab.update(0.3, &ctx(Vec2::ZERO, &config), &mut rng);
        assert!(crab.is_removable());
    }

    #[test]
    fn test_boss_escalates_with_adds() {
        let config = CombatConfig::default();
        let mut rng = seeded_rng(1);
        let mut boss = at_origin(Archetype::Boss);
        boss.hit(90.0, Vec2::ZERO, 0.0, &config);
        let intents = boss.update(0.016, &ctx(Vec2::ZERO, &config), &mut rng);
        assert_eq!(boss.boss_phase(), Some(2));
        assert_eq!(boss.base.speed, 80.0);
        let adds = intents
            .iter()
            .filter(|i| matches!(i, EnemyIntent::Summon { .. }))
            .count();
        assert_eq!(adds, 2);

        boss.hit(70.0, Vec2::ZERO, 0.0, &config);
        boss.update(0.016, &ctx(Vec2::ZERO, &config), &mut rng);
        assert_eq!(boss.boss_phase(), Some(3));
        assert_eq!(boss.base.damage, 25.0);
        assert_eq!(boss.base.attack_cooldown, 0.5);
    }

    #[test]
    fn test_boss_dash_in_band() {
        let config = CombatConfig::default();
        let mut rng = seeded_rng(1);
        let mut boss = at_origin(Archetype::Boss);
        boss.hit(160.0, Vec2::ZERO, 0.0, &config);
        boss.base.state = EnemyState::Chase;
        boss.update(0.016, &ctx(boss.pos() + Vec2::new(-500.0, 0.0), &config), &mut rng);
        assert_eq!(boss.boss_phase(), Some(3));

        let start = boss.pos();
        let player = start + Vec2::new(100.0, 0.0);
        let intents = boss.update(0.016, &ctx(player, &config), &mut rng);
        assert!(intents.iter().any(|i| matches!(i, EnemyIntent::Dash { .. })));
        assert!((boss.pos().x - (start.x + 200.0)).abs() < 1e-3);
    }

    #[test]
    fn test_summon_capped() {
        let config = CombatConfig::default();
        let mut rng = seeded_rng(1);
        let mut boss = at_origin(Archetype::Boss);
        boss.hit(160.0, Vec2::ZERO, 0.0, &config);
        boss.base.state = EnemyState::Chase;
        let far = boss.pos() + Vec2::new(0.0, 400.0);
        let mut crowded = ctx(far, &config);
        crowded.allies_alive = BOSS_MAX_ADDS;
        let intents = boss.update(0.016, &crowded, &mut rng);
        // Only the escalation adds, no periodic summon
        let adds = intents
            .iter()
            .filter(|i| matches!(i, EnemyIntent::Summon { .. }))
            .count();
        assert_eq!(adds, 4);

        let mut sparse = ctx(far, &config);
        sparse.allies_alive = 1;
        let intents = boss.update(BOSS_SUMMON_INTERVAL, &sparse, &mut rng);
        assert!(intents.iter().any(|i| matches!(i, EnemyIntent::Summon { .. })));
    }

    #[test]
    fn test_bleed_kill_reports_once() {
        let config = CombatConfig::default();
        let mut crab = at_origin(Archetype::Crab);
        crab.base.health = Health::new(1.0);
        crab.apply_bleed(Bleed::default());
        assert_eq!(crab.tick_bleed(0.5, &config), Some(DamageOutcome::Killed));
        assert_eq!(crab.tick_bleed(0.5, &config), None);
    }

    #[test]
    fn test_contact_damage_reduced() {
        let crab = at_origin(Archetype::Crab);
        assert_eq!(crab.contact_damage(), 4.0);
        let ship = at_origin(Archetype::Ship);
        assert_eq!(ship.contact_damage(), 0.0);
    }
}
