//! Real-time island step
//!
//! `IslandSim` owns everything alive on one island and advances it by `dt`
//! in a fixed order: timers, player, enemy AI, status effects, melee,
//! projectiles, contact damage, deaths, pickups, corpse cleanup, outcome.

use serde::Serialize;

use crate::ai::enemy::{Archetype, Enemy, EnemyContext, EnemyIntent};
use crate::combat::damage::DamageOutcome;
use crate::combat::loot::{chest_drop, enemy_drop, LootItem};
use crate::combat::projectile::{Faction, Flight, Projectile};
use crate::combat::status::Bleed;
use crate::combat::weapons::WeaponSpecial;
use crate::core::config::CombatConfig;
use crate::core::types::{seeded_rng, AgentId, IdAllocator, SimRng, Tick, TilePos, Vec2};
use crate::player::avatar::{Player, PlayerAction, PlayerIntent};
use crate::simulation::events::{EventLog, SimEventKind};
use crate::spatial::geometry::circle_collide;
use crate::world::level::IslandLayout;
use crate::world::room::Room;
use crate::world::tiles::IslandTile;

/// Offset of the boss from the exit and of its escorts from the boss
const BOSS_EXIT_OFFSET: f32 = 40.0;
const BOSS_ESCORT_SPREAD: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IslandOutcome {
    InProgress,
    /// Reached the exit (after the boss fell, on boss islands)
    Escaped,
    Died,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chest {
    pub pos: TilePos,
    pub opened: bool,
}

pub struct IslandSim {
    pub layout: IslandLayout,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub loot: Vec<LootItem>,
    pub chests: Vec<Chest>,
    pub is_boss: bool,
    pub outcome: IslandOutcome,
    pub tick: Tick,
    config: CombatConfig,
    ids: IdAllocator,
    rng: SimRng,
}

impl IslandSim {
    /// Place the player at the layout's spawn and populate the island
    pub fn new(
        layout: IslandLayout,
        mut player: Player,
        is_boss: bool,
        config: CombatConfig,
        seed: u64,
    ) -> Self {
        let tile_size = layout.level.tile_size;
        player.enter_level(layout.spawn.center(tile_size));
        let chests = layout
            .chests
            .iter()
            .map(|&pos| Chest { pos, opened: false })
            .collect();
        let mut sim = Self {
            layout,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            loot: Vec::new(),
            chests,
            is_boss,
            outcome: IslandOutcome::InProgress,
            tick: 0,
            config,
            ids: IdAllocator::default(),
            rng: seeded_rng(seed),
        };
        sim.populate();
        sim
    }

    fn populate(&mut self) {
        let tile_size = self.layout.level.tile_size;
        let difficulty = self.layout.difficulty;
        if self.is_boss {
            let boss_pos = self.layout.exit.center(tile_size) + Vec2::new(0.0, BOSS_EXIT_OFFSET);
            self.spawn(Archetype::Boss, boss_pos, difficulty);
            for dx in [-BOSS_ESCORT_SPREAD, BOSS_ESCORT_SPREAD] {
                self.spawn(Archetype::MeleePirate, boss_pos + Vec2::new(dx, 0.0), difficulty);
            }
        } else {
            let spawns: Vec<Vec2> = self
                .layout
                .enemy_spawns
                .iter()
                .map(|s| s.pos.center(tile_size))
                .collect();
            for pos in spawns {
                let archetype = Archetype::roll(&mut self.rng);
                self.spawn(archetype, pos, difficulty);
            }
        }
        tracing::debug!(enemies = self.enemies.len(), boss = self.is_boss, "Island populated");
    }

    fn spawn(&mut self, archetype: Archetype, pos: Vec2, difficulty: u32) -> AgentId {
        let id = self.ids.next_id();
        self.enemies.push(Enemy::spawn(id, archetype, pos, difficulty));
        id
    }

    pub fn is_over(&self) -> bool {
        self.outcome != IslandOutcome::InProgress
    }

    pub fn enemies_alive(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.layout.level.is_walkable(pos)
    }

    pub fn tile_at(&self, pos: TilePos) -> Option<IslandTile> {
        self.layout.level.tile_at(pos)
    }

    pub fn room_at(&self, pos: TilePos) -> Option<&Room> {
        self.layout.level.room_at(pos)
    }

    pub fn find_path(&self, start: TilePos, goal: TilePos) -> Vec<TilePos> {
        self.layout.level.find_path(start, goal)
    }

    /// Advance one frame. Finished islands report nothing.
    pub fn step(&mut self, dt: f32, intent: &PlayerIntent) -> EventLog {
        let mut log = EventLog::new();
        if self.is_over() {
            return log;
        }
        self.tick += 1;

        for item in &mut self.loot {
            item.tick(dt);
        }

        for action in self.player.update(dt, intent, &self.layout.level, &self.config) {
            match action {
                PlayerAction::Fired(shot) => self.projectiles.push(shot),
                PlayerAction::Rejected { action, reason } => log.push(
                    SimEventKind::ActionRejected {
                        action,
                        reason: reason.to_string(),
                    },
                    self.tick,
                ),
                PlayerAction::Swung | PlayerAction::Dodged => {}
            }
        }

        self.run_enemy_ai(dt, &mut log);

        // Every alive-to-dead transition lands here exactly once
        let mut killed: Vec<usize> = Vec::new();

        for (i, enemy) in self.enemies.iter_mut().enumerate() {
            if let Some(outcome) = enemy.tick_bleed(dt, &self.config) {
                if outcome == DamageOutcome::Killed {
                    killed.push(i);
                }
            }
        }

        self.resolve_melee(&mut killed, &mut log);
        self.resolve_projectiles(dt, &mut killed, &mut log);
        self.resolve_contact(&mut log);

        for i in killed {
            self.on_kill(i, &mut log);
        }

        self.collect_loot(&mut log);
        self.open_chests(&mut log);
        self.enemies.retain(|e| !e.is_removable());
        self.check_outcome(&mut log);
        log
    }

    fn run_enemy_ai(&mut self, dt: f32, log: &mut EventLog) {
        let allies_alive = self
            .enemies
            .iter()
            .filter(|e| e.is_alive() && !e.is_boss())
            .count();
        let ctx = EnemyContext {
            target: self.player.pos,
            target_radius: self.player.radius,
            allies_alive,
            terrain: &self.layout.level,
            config: &self.config,
        };
        let mut intents = Vec::new();
        for enemy in &mut self.enemies {
            let id = enemy.id();
            for intent in enemy.update(dt, &ctx, &mut self.rng) {
                intents.push((id, intent));
            }
        }

        for (id, intent) in intents {
            match intent {
                EnemyIntent::Strike { damage, from } => self.hurt_player(damage, from, log),
                EnemyIntent::Fire(shot) => self.projectiles.push(shot),
                EnemyIntent::Summon {
                    archetype,
                    pos,
                    difficulty,
                } => {
                    let new_id = self.spawn(archetype, pos, difficulty);
                    log.push(SimEventKind::EnemySpawned { id: new_id, archetype }, self.tick);
                }
                EnemyIntent::PhaseShift { phase } => {
                    log.push(SimEventKind::BossPhase { id, phase }, self.tick);
                }
                EnemyIntent::Dash { from, to } => {
                    tracing::debug!(boss = id.0, from_x = from.x, to_x = to.x, "Boss dashed");
                }
            }
        }
    }

    fn hurt_player(&mut self, damage: f32, from: Vec2, log: &mut EventLog) {
        hurt_player(&mut self.player, &self.config, damage, from, self.tick, log);
    }

    fn resolve_melee(&mut self, killed: &mut Vec<usize>, log: &mut EventLog) {
        let Some(swing) = self.player.swing.as_mut() else {
            return;
        };
        let targets = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive())
            .map(|(i, e)| (i, e.pos(), e.base.radius));
        let Some(i) = swing.resolve(self.player.pos, self.config.melee_arc_degrees, targets) else {
            return;
        };
        let damage = swing.damage;
        let weapon = self.player.weapon;
        let enemy = &mut self.enemies[i];
        let outcome = enemy.hit(damage, self.player.pos, weapon.knockback(), &self.config);
        log.push(SimEventKind::DamageDealt { pos: enemy.pos(), amount: damage }, self.tick);
        match outcome {
            DamageOutcome::Killed => killed.push(i),
            DamageOutcome::Wounded if weapon.special() == WeaponSpecial::Bleed => {
                enemy.apply_bleed(Bleed::default());
            }
            _ => {}
        }
    }

    fn resolve_projectiles(&mut self, dt: f32, killed: &mut Vec<usize>, log: &mut EventLog) {
        let level = &self.layout.level;
        let mut survivors = Vec::with_capacity(self.projectiles.len());
        for mut shot in std::mem::take(&mut self.projectiles) {
            if shot.advance(dt, |p| level.is_walkable_world(p)) != Flight::Flying {
                continue;
            }
            match shot.faction {
                Faction::Friendly => {
                    let struck = self
                        .enemies
                        .iter()
                        .position(|e| e.is_alive() && shot.hits(e.pos(), e.base.radius));
                    let Some(first) = struck else {
                        survivors.push(shot);
                        continue;
                    };
                    let impact = shot.pos;
                    for (i, enemy) in self.enemies.iter_mut().enumerate() {
                        let in_blast = i == first
                            || (shot.splash > 0.0
                                && enemy.is_alive()
                                && impact.distance(&enemy.pos()) <= shot.splash + enemy.base.radius);
                        if !in_blast {
                            continue;
                        }
                        let outcome = enemy.hit(shot.damage, impact, shot.knockback, &self.config);
                        log.push(
                            SimEventKind::DamageDealt { pos: enemy.pos(), amount: shot.damage },
                            self.tick,
                        );
                        if outcome == DamageOutcome::Killed {
                            killed.push(i);
                        }
                    }
                }
                Faction::Hostile => {
                    if shot.hits(self.player.pos, self.player.radius) {
                        hurt_player(&mut self.player, &self.config, shot.damage, shot.pos, self.tick, log);
                    } else {
                        survivors.push(shot);
                    }
                }
            }
        }
        self.projectiles = survivors;
    }

    /// Overlapping enemies hurt the player every step; the invulnerability
    /// window after a hit spaces the ticks out.
    fn resolve_contact(&mut self, log: &mut EventLog) {
        let touching: Vec<(f32, Vec2)> = self
            .enemies
            .iter()
            .filter(|e| e.is_alive())
            .filter(|e| circle_collide(e.pos(), e.base.radius, self.player.pos, self.player.radius))
            .map(|e| (e.contact_damage(), e.pos()))
            .filter(|(damage, _)| *damage > 0.0)
            .collect();
        for (damage, from) in touching {
            self.hurt_player(damage, from, log);
        }
    }

    fn on_kill(&mut self, i: usize, log: &mut EventLog) {
        let Some(enemy) = self.enemies.get(i) else {
            return;
        };
        let (id, archetype, pos) = (enemy.id(), enemy.archetype(), enemy.pos());
        self.player.kills += 1;
        log.push(SimEventKind::EnemyKilled { id, archetype, pos }, self.tick);

        let drop = if archetype == Archetype::Boss {
            chest_drop(pos, self.layout.difficulty, self.config.pickup_delay, &mut self.rng)
        } else {
            enemy_drop(pos, self.config.pickup_delay, &mut self.rng)
        };
        if !drop.is_empty() {
            log.push(SimEventKind::LootDropped { pos, items: drop.len() }, self.tick);
            self.loot.extend(drop);
        }
    }

    fn collect_loot(&mut self, log: &mut EventLog) {
        if !self.player.is_alive() {
            return;
        }
        let (pos, radius) = (self.player.pos, self.player.radius);
        let mut remaining = Vec::with_capacity(self.loot.len());
        for item in std::mem::take(&mut self.loot) {
            if item.can_pickup(pos, radius) {
                self.player.collect(item.kind);
                log.push(SimEventKind::ItemPickedUp { item: item.kind }, self.tick);
            } else {
                remaining.push(item);
            }
        }
        self.loot = remaining;
    }

    fn open_chests(&mut self, log: &mut EventLog) {
        if !self.player.is_alive() {
            return;
        }
        let tile_size = self.layout.level.tile_size;
        for chest in self.chests.iter_mut().filter(|c| !c.opened) {
            let center = chest.pos.center(tile_size);
            if !circle_collide(center, tile_size * 0.5, self.player.pos, self.player.radius) {
                continue;
            }
            chest.opened = true;
            let drop = chest_drop(center, self.layout.difficulty, self.config.pickup_delay, &mut self.rng);
            log.push(SimEventKind::ChestOpened { pos: chest.pos }, self.tick);
            log.push(SimEventKind::LootDropped { pos: center, items: drop.len() }, self.tick);
            self.loot.extend(drop);
        }
    }

    fn check_outcome(&mut self, log: &mut EventLog) {
        if !self.player.is_alive() {
            self.outcome = IslandOutcome::Died;
            tracing::info!(tick = self.tick, kills = self.player.kills, "Player died on island");
            return;
        }
        let boss_standing = self.enemies.iter().any(|e| e.is_boss() && e.is_alive());
        if boss_standing {
            return;
        }
        let tile_size = self.layout.level.tile_size;
        let exit = self.layout.exit.center(tile_size);
        if self.player.pos.distance(&exit) <= tile_size {
            self.outcome = IslandOutcome::Escaped;
            log.push(SimEventKind::ExitReached, self.tick);
            tracing::info!(
                tick = self.tick,
                kills = self.player.kills,
                gold = self.player.gold,
                "Island cleared"
            );
        }
    }
}

fn hurt_player(
    player: &mut Player,
    config: &CombatConfig,
    damage: f32,
    from: Vec2,
    tick: Tick,
    log: &mut EventLog,
) {
    match player.take_damage(damage, from, config) {
        Some(DamageOutcome::Killed) => {
            log.push(SimEventKind::PlayerHit { damage }, tick);
            log.push(SimEventKind::PlayerDied, tick);
        }
        Some(DamageOutcome::Wounded) => log.push(SimEventKind::PlayerHit { damage }, tick),
        Some(DamageOutcome::AlreadyDead) | None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::weapons::WeaponKind;
    use crate::player::avatar::ActionKind;
    use crate::spatial::grid::TileGrid;
    use crate::world::level::Level;

    const TILE: f32 = 16.0;

    /// Open 30x30 sand field, spawn top-left, exit bottom-right, no chests or spawns
    fn field() -> IslandLayout {
        let grid = TileGrid::new(30, 30, IslandTile::Sand);
        IslandLayout {
            level: Level::new(grid, TILE),
            difficulty: 1,
            spawn: TilePos::new(2, 2),
            exit: TilePos::new(27, 27),
            chests: Vec::new(),
            enemy_spawns: Vec::new(),
            used_fallback: false,
            repaired_tiles: 0,
        }
    }

    fn sim() -> IslandSim {
        IslandSim::new(field(), Player::default(), false, CombatConfig::default(), 7)
    }

    fn idle() -> PlayerIntent {
        PlayerIntent::default()
    }

    #[test]
    fn test_player_starts_at_spawn() {
        let sim = sim();
        assert_eq!(sim.player.pos, TilePos::new(2, 2).center(TILE));
        assert!(sim.enemies.is_empty());
        assert!(sim.is_walkable(TilePos::new(5, 5)));
        assert!(!sim.is_walkable(TilePos::new(-1, 5)));
        assert_eq!(sim.find_path(TilePos::new(0, 0), TilePos::new(3, 0)).len(), 3);
    }

    #[test]
    fn test_double_hit_same_step_kills_once() {
        let mut sim = sim();
        let target = sim.player.pos + Vec2::new(12.0, 0.0);
        let id = sim.spawn(Archetype::Crab, target, 1);
        sim.enemies[0].base.health.current = 5.0;

        // A sword swing and a pistol shot both land this step
        sim.player.facing = Vec2::new(1.0, 0.0);
        let mut shot = Projectile::aimed(target, target + Vec2::new(1.0, 0.0), 0.0, 0.0, 50.0, 1.0, 3.0, Faction::Friendly);
        shot.vel = Vec2::ZERO;
        sim.projectiles.push(shot);
        let attack = PlayerIntent {
            attack: true,
            ..Default::default()
        };
        let log = sim.step(0.016, &attack);

        let kills = log.count(|k| matches!(k, SimEventKind::EnemyKilled { id: k_id, .. } if *k_id == id));
        assert_eq!(kills, 1);
        assert!(log.count(|k| matches!(k, SimEventKind::LootDropped { .. })) <= 1);
        assert_eq!(sim.player.kills, 1);
        // The shot found only a corpse and keeps flying
        assert_eq!(sim.projectiles.len(), 1);
    }

    #[test]
    fn test_two_lethal_shots_in_one_step_kill_once() {
        let mut sim = sim();
        let target = sim.player.pos + Vec2::new(80.0, 0.0);
        let id = sim.spawn(Archetype::Crab, target, 1);
        sim.enemies[0].base.health.current = 5.0;
        for _ in 0..2 {
            let mut shot =
                Projectile::aimed(target, target + Vec2::new(0.0, 1.0), 0.0, 0.0, 50.0, 1.0, 3.0, Faction::Friendly);
            shot.vel = Vec2::ZERO;
            sim.projectiles.push(shot);
        }

        let log = sim.step(0.016, &idle());

        assert_eq!(log.count(|k| matches!(k, SimEventKind::EnemyKilled { .. })), 1);
        assert_eq!(
            log.count(|k| matches!(k, SimEventKind::EnemyKilled { id: k_id, .. } if *k_id == id)),
            1
        );
        let drops: Vec<usize> = log
            .iter()
            .filter_map(|k| match k {
                SimEventKind::LootDropped { items, .. } => Some(*items),
                _ => None,
            })
            .collect();
        assert!(drops.len() <= 1);
        assert_eq!(drops.iter().sum::<usize>(), sim.loot.len());
        assert_eq!(sim.player.kills, 1);
        assert_eq!(sim.player.gold, 0);
        // Only the first shot connected; the second found a corpse
        assert_eq!(sim.projectiles.len(), 1);

        let after = sim.step(0.016, &idle());
        assert_eq!(after.count(|k| matches!(k, SimEventKind::EnemyKilled { .. })), 0);
        assert_eq!(sim.player.kills, 1);
    }

    #[test]
    fn test_empty_pistol_reports_rejection() {
        let mut sim = sim();
        sim.player.ammo = 0;
        let fire = PlayerIntent {
            fire: true,
            ..Default::default()
        };
        let log = sim.step(0.016, &fire);
        let rejected: Vec<_> = log
            .iter()
            .filter_map(|k| match k {
                SimEventKind::ActionRejected { action, reason } => Some((*action, reason.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            rejected,
            vec![(ActionKind::Pistol, "not enough ammo: need 1, have 0".to_string())]
        );
        assert!(sim.projectiles.is_empty());
        assert_eq!(sim.player.ammo, 0);
    }

    #[test]
    fn test_corpse_removed_after_grace() {
        let mut sim = sim();
        let far = sim.player.pos + Vec2::new(300.0, 300.0);
        sim.spawn(Archetype::Crab, far, 1);
        let config = sim.config.clone();
        sim.enemies[0].hit(1000.0, far, 0.0, &config);
        sim.step(0.3, &idle());
        assert_eq!(sim.enemies.len(), 1);
        sim.step(0.3, &idle());
        assert!(sim.enemies.is_empty());
    }

    #[test]
    fn test_contact_damage_gated_by_invulnerability() {
        let mut sim = sim();
        let on_top = sim.player.pos;
        sim.spawn(Archetype::Crab, on_top, 1);
        let first = sim.step(0.016, &idle());
        assert_eq!(first.count(|k| matches!(k, SimEventKind::PlayerHit { .. })), 1);
        let hp_after_first = sim.player.health.current;
        // Crab contact is half of 10 base damage at difficulty 1
        assert_eq!(hp_after_first, 80.0 - 5.0);
        let second = sim.step(0.016, &idle());
        assert_eq!(second.count(|k| matches!(k, SimEventKind::PlayerHit { .. })), 0);
    }

    #[test]
    fn test_bleed_from_shark_blade() {
        let mut sim = sim();
        sim.player.weapon = WeaponKind::SharkBlade;
        sim.player.facing = Vec2::new(1.0, 0.0);
        let target = sim.player.pos + Vec2::new(14.0, 0.0);
        sim.spawn(Archetype::MeleePirate, target, 1);
        let attack = PlayerIntent {
            aim: Some(Vec2::new(1.0, 0.0)),
            attack: true,
            ..Default::default()
        };
        sim.step(0.016, &attack);
        assert!(sim.enemies[0].base.bleed.is_some());
    }

    #[test]
    fn test_pickup_after_delay() {
        let mut sim = sim();
        let at = sim.player.pos;
        sim.loot.push(LootItem::new(at, crate::combat::loot::ItemKind::Gold(10), 0.3));
        let log = sim.step(0.1, &idle());
        assert_eq!(log.count(|k| matches!(k, SimEventKind::ItemPickedUp { .. })), 0);
        sim.step(0.25, &idle());
        assert_eq!(sim.player.gold, 10);
        assert!(sim.loot.is_empty());
    }

    #[test]
    fn test_chest_opens_once_on_contact() {
        let mut layout = field();
        layout.chests = vec![TilePos::new(2, 2)];
        let mut sim = IslandSim::new(layout, Player::default(), false, CombatConfig::default(), 3);
        let log = sim.step(0.016, &idle());
        assert_eq!(log.count(|k| matches!(k, SimEventKind::ChestOpened { .. })), 1);
        assert!(!sim.loot.is_empty());
        let again = sim.step(0.016, &idle());
        assert_eq!(again.count(|k| matches!(k, SimEventKind::ChestOpened { .. })), 0);
    }

    #[test]
    fn test_reaching_exit_ends_island() {
        let mut sim = sim();
        sim.player.pos = sim.layout.exit.center(TILE);
        let log = sim.step(0.016, &idle());
        assert_eq!(log.count(|k| *k == SimEventKind::ExitReached), 1);
        assert_eq!(sim.outcome, IslandOutcome::Escaped);
        assert!(sim.step(0.016, &idle()).is_empty());
    }

    #[test]
    fn test_boss_blocks_exit() {
        let sim_boss = IslandSim::new(field(), Player::default(), true, CombatConfig::default(), 1);
        assert_eq!(sim_boss.enemies.len(), 3);
        assert!(sim_boss.enemies[0].is_boss());

        let mut sim = sim_boss;
        sim.player.pos = sim.layout.exit.center(TILE);
        sim.player.invulnerable = 100.0;
        sim.step(0.016, &idle());
        assert_eq!(sim.outcome, IslandOutcome::InProgress);
    }

    #[test]
    fn test_hostile_bullet_hurts_player() {
        let mut sim = sim();
        let from = sim.player.pos + Vec2::new(20.0, 0.0);
        let shot = Projectile::aimed(from, sim.player.pos, 0.0, 180.0, 12.0, 1.2, 3.0, Faction::Hostile);
        sim.projectiles.push(shot);
        let mut hits = 0;
        for _ in 0..10 {
            let log = sim.step(0.016, &idle());
            hits += log.count(|k| matches!(k, SimEventKind::PlayerHit { .. }));
        }
        assert_eq!(hits, 1);
        assert_eq!(sim.player.health.current, 68.0);
    }

    #[test]
    fn test_player_death_ends_island() {
        let mut sim = sim();
        sim.player.health.current = 1.0;
        sim.spawn(Archetype::Crab, sim.player.pos, 1);
        let log = sim.step(0.016, &idle());
        assert_eq!(log.count(|k| *k == SimEventKind::PlayerDied), 1);
        assert_eq!(sim.outcome, IslandOutcome::Died);
    }
}
