//! Open-sea sailing between islands
//!
//! The ship sails over open water under persistent exploration fog. Enemy
//! ships run the same continuous FSM as island enemies and answer with
//! cannon fire. Coming within landing range of an unvisited island ends the
//! leg so the run can play that island.

use rand::Rng;
use serde::Serialize;

use crate::ai::enemy::{Archetype, Enemy, EnemyContext, EnemyIntent};
use crate::combat::damage::DamageOutcome;
use crate::combat::projectile::{Faction, Flight, Projectile};
use crate::core::config::{CombatConfig, SeaConfig};
use crate::core::types::{seeded_rng, AgentId, IdAllocator, SimRng, Tick, Vec2};
use crate::player::avatar::ActionKind;
use crate::player::ship::{HelmIntent, PlayerShip};
use crate::simulation::events::{EventLog, SimEventKind};
use crate::spatial::geometry::circle_collide;
use crate::visibility::fog::ExplorationFog;
use crate::world::terrain::{OpenWater, Terrain};

/// Tiles kept clear between the map edge and an island marker
const ISLAND_EDGE_MARGIN: f32 = 4.0;
/// Minimum spacing between island markers, in tiles
const ISLAND_SPACING: f32 = 10.0;
const PLACEMENT_ATTEMPTS: u32 = 50;
/// Enemy ships keep at least this far from the starting position
const ENEMY_START_CLEARANCE: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IslandMarker {
    pub index: usize,
    pub pos: Vec2,
    pub sighted: bool,
    pub visited: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeaOutcome {
    Sailing,
    Landed { island: usize },
    Sunk,
}

pub struct SeaSim {
    pub ship: PlayerShip,
    pub fog: ExplorationFog,
    pub enemies: Vec<Enemy>,
    pub cannonballs: Vec<Projectile>,
    pub islands: Vec<IslandMarker>,
    pub outcome: SeaOutcome,
    /// Gold taken from sunk enemy ships, credited by the run
    pub plunder: u32,
    pub tick: Tick,
    water: OpenWater,
    sea: SeaConfig,
    combat: CombatConfig,
    ram_cooldown: f32,
    ids: IdAllocator,
    rng: SimRng,
}

impl SeaSim {
    pub fn new(mut ship: PlayerShip, difficulty: u32, sea: SeaConfig, combat: CombatConfig, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let water = OpenWater {
            width: sea.width as f32 * sea.tile_size,
            height: sea.height as f32 * sea.tile_size,
        };
        let start = Vec2::new(water.width * 0.5, water.height - sea.tile_size * ISLAND_EDGE_MARGIN);
        ship.pos = start;
        ship.vel = Vec2::ZERO;

        let islands = place_islands(&sea, water, start, &mut rng);
        let mut ids = IdAllocator::default();
        let count = sea.base_enemy_ships + difficulty / 2;
        let mut enemies = Vec::new();
        for _ in 0..count {
            let pos = random_point(water, sea.tile_size * ISLAND_EDGE_MARGIN, &mut rng);
            if pos.distance(&start) < ENEMY_START_CLEARANCE {
                continue;
            }
            enemies.push(Enemy::spawn(ids.next_id(), Archetype::Ship, pos, difficulty));
        }
        tracing::debug!(islands = islands.len(), enemy_ships = enemies.len(), "Sea chart drawn");

        Self {
            ship,
            fog: ExplorationFog::new(sea.width as usize, sea.height as usize, sea.tile_size),
            enemies,
            cannonballs: Vec::new(),
            islands,
            outcome: SeaOutcome::Sailing,
            plunder: 0,
            tick: 0,
            water,
            sea,
            combat,
            ram_cooldown: 0.0,
            ids,
            rng,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome != SeaOutcome::Sailing
    }

    /// Mark the landed island visited and put the ship back to sea
    pub fn resume(&mut self) {
        if let SeaOutcome::Landed { island } = self.outcome {
            if let Some(marker) = self.islands.get_mut(island) {
                marker.visited = true;
            }
            self.outcome = SeaOutcome::Sailing;
        }
    }

    /// Add an enemy ship, for scripted encounters
    pub fn spawn_enemy(&mut self, pos: Vec2, difficulty: u32) {
        let id = self.ids.next_id();
        self.enemies.push(Enemy::spawn(id, Archetype::Ship, pos, difficulty));
    }

    fn reveal_radius(&self) -> f32 {
        self.sea.reveal_radius + self.ship.scout_range
    }

    pub fn step(&mut self, dt: f32, helm: &HelmIntent) -> EventLog {
        let mut log = EventLog::new();
        if self.is_over() {
            return log;
        }
        self.tick += 1;
        self.ram_cooldown -= dt;

        self.ship.sail(dt, helm, &self.water);
        if let Some(side) = helm.fire {
            match self.ship.fire(side) {
                Ok(shot) => self.cannonballs.push(shot),
                Err(reason) => log.push(
                    SimEventKind::ActionRejected {
                        action: ActionKind::Broadside,
                        reason: reason.to_string(),
                    },
                    self.tick,
                ),
            }
        }

        self.run_enemy_ai(dt, &mut log);
        self.resolve_cannonballs(dt, &mut log);
        self.resolve_ramming(&mut log);
        self.enemies.retain(|e| !e.is_removable());

        let revealed = self.fog.reveal_disc(self.ship.pos, self.reveal_radius());
        if revealed > 0 {
            log.push(SimEventKind::FogRevealed { tiles: revealed }, self.tick);
        }
        for marker in self.islands.iter_mut().filter(|m| !m.sighted) {
            if self.fog.is_revealed_world(marker.pos) {
                marker.sighted = true;
                log.push(SimEventKind::IslandSighted { island: marker.index }, self.tick);
            }
        }

        self.check_outcome(&mut log);
        log
    }

    fn run_enemy_ai(&mut self, dt: f32, log: &mut EventLog) {
        let ctx = EnemyContext {
            target: self.ship.pos,
            target_radius: self.ship.radius,
            allies_alive: 0,
            terrain: &self.water,
            config: &self.combat,
        };
        let mut strikes = Vec::new();
        for enemy in &mut self.enemies {
            for intent in enemy.update(dt, &ctx, &mut self.rng) {
                match intent {
                    EnemyIntent::Fire(shot) => self.cannonballs.push(shot),
                    EnemyIntent::Strike { damage, .. } => strikes.push(damage),
                    // Boss behavior never applies to ships
                    EnemyIntent::Summon { .. } | EnemyIntent::PhaseShift { .. } | EnemyIntent::Dash { .. } => {}
                }
            }
        }
        for damage in strikes {
            self.damage_ship(damage, log);
        }
    }

    fn damage_ship(&mut self, amount: f32, log: &mut EventLog) {
        match self.ship.hull.apply(amount) {
            DamageOutcome::Wounded => log.push(SimEventKind::ShipDamaged { amount }, self.tick),
            DamageOutcome::Killed => {
                log.push(SimEventKind::ShipDamaged { amount }, self.tick);
                log.push(SimEventKind::ShipSunk, self.tick);
            }
            DamageOutcome::AlreadyDead => {}
        }
    }

    fn resolve_cannonballs(&mut self, dt: f32, log: &mut EventLog) {
        let water = self.water;
        let mut flying = Vec::with_capacity(self.cannonballs.len());
        for mut ball in std::mem::take(&mut self.cannonballs) {
            if ball.advance(dt, |p| water.is_passable(p)) != Flight::Flying {
                continue;
            }
            match ball.faction {
                Faction::Friendly => {
                    let struck = self
                        .enemies
                        .iter()
                        .position(|e| e.is_alive() && ball.hits(e.pos(), e.base.radius));
                    let Some(first) = struck else {
                        flying.push(ball);
                        continue;
                    };
                    let impact = ball.pos;
                    let mut sunk = Vec::new();
                    for (i, enemy) in self.enemies.iter_mut().enumerate() {
                        let in_blast = i == first
                            || (ball.splash > 0.0
                                && enemy.is_alive()
                                && impact.distance(&enemy.pos()) <= ball.splash + enemy.base.radius);
                        if !in_blast {
                            continue;
                        }
                        log.push(SimEventKind::DamageDealt { pos: enemy.pos(), amount: ball.damage }, self.tick);
                        if enemy.hit(ball.damage, impact, 0.0, &self.combat) == DamageOutcome::Killed {
                            sunk.push(enemy.id());
                        }
                    }
                    for id in sunk {
                        self.on_sunk(id, log);
                    }
                }
                Faction::Hostile => {
                    if ball.hits(self.ship.pos, self.ship.radius) {
                        self.damage_ship(ball.damage, log);
                    } else {
                        flying.push(ball);
                    }
                }
            }
        }
        self.cannonballs = flying;
    }

    /// A ram prow hurts every enemy hull it touches, at most once per
    /// invulnerability window
    fn resolve_ramming(&mut self, log: &mut EventLog) {
        if self.ship.ram_damage <= 0.0 || self.ram_cooldown > 0.0 {
            return;
        }
        let damage = self.ship.ram_damage;
        let mut rammed_any = false;
        let mut sunk = Vec::new();
        for enemy in self.enemies.iter_mut().filter(|e| e.is_alive()) {
            if !circle_collide(enemy.pos(), enemy.base.radius, self.ship.pos, self.ship.radius) {
                continue;
            }
            rammed_any = true;
            log.push(SimEventKind::Rammed { id: enemy.id(), damage }, self.tick);
            if enemy.hit(damage, self.ship.pos, 0.0, &self.combat) == DamageOutcome::Killed {
                sunk.push(enemy.id());
            }
        }
        if rammed_any {
            self.ram_cooldown = self.combat.player_invulnerability;
        }
        for id in sunk {
            self.on_sunk(id, log);
        }
    }

    fn on_sunk(&mut self, id: AgentId, log: &mut EventLog) {
        let gold = 20 + self.rng.gen_range(0..30);
        self.plunder += gold;
        log.push(SimEventKind::EnemyShipSunk { id }, self.tick);
        tracing::debug!(ship = id.0, gold, "Enemy ship sunk");
    }

    fn check_outcome(&mut self, log: &mut EventLog) {
        if !self.ship.is_afloat() {
            self.outcome = SeaOutcome::Sunk;
            tracing::info!(tick = self.tick, "Ship sunk");
            return;
        }
        let reach = self.sea.landing_radius + self.ship.radius;
        let landing = self
            .islands
            .iter()
            .find(|m| !m.visited && m.pos.distance(&self.ship.pos) <= reach)
            .map(|m| m.index);
        if let Some(island) = landing {
            self.outcome = SeaOutcome::Landed { island };
            self.ship.vel = Vec2::ZERO;
            self.cannonballs.clear();
            log.push(SimEventKind::Landed { island }, self.tick);
            tracing::info!(island, tick = self.tick, "Landed on island");
        }
    }
}

fn random_point(water: OpenWater, margin: f32, rng: &mut SimRng) -> Vec2 {
    Vec2::new(
        rng.gen_range(margin..(water.width - margin).max(margin + 1.0)),
        rng.gen_range(margin..(water.height - margin).max(margin + 1.0)),
    )
}

/// Scatter island markers with a minimum spacing. Placement gives up on a
/// marker after a fixed number of attempts, so crowded maps get fewer islands.
fn place_islands(sea: &SeaConfig, water: OpenWater, start: Vec2, rng: &mut SimRng) -> Vec<IslandMarker> {
    let margin = sea.tile_size * ISLAND_EDGE_MARGIN;
    let spacing = sea.tile_size * ISLAND_SPACING;
    let mut markers: Vec<IslandMarker> = Vec::new();
    for _ in 0..sea.islands {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let pos = random_point(water, margin, rng);
            let clear = pos.distance(&start) >= spacing
                && markers.iter().all(|m| m.pos.distance(&pos) >= spacing);
            if clear {
                markers.push(IslandMarker {
                    index: markers.len(),
                    pos,
                    sighted: false,
                    visited: false,
                });
                break;
            }
        }
    }
    if markers.len() < sea.islands as usize {
        tracing::warn!(placed = markers.len(), wanted = sea.islands, "sea too crowded for all islands");
    }
    markers
}
