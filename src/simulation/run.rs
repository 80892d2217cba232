//! One pirate run: the voyage, the islands landed on, and what survives death
//!
//! The run owns the avatar and the sea leg (which owns the ship). Going ashore
//! lends the avatar to an `IslandSim`; handing the finished sim back settles
//! the island. Meta progress is read at the start and written on death only.

use rand::Rng;
use serde::Serialize;

use crate::core::config::SimulationConfig;
use crate::core::error::{ActionRejection, TargetError};
use crate::core::types::{seeded_rng, SimRng};
use crate::generation::{generate_island, MAX_DIFFICULTY};
use crate::player::avatar::{Player, PLAYER_BASE_HP, STARTING_MAX_AMMO};
use crate::player::meta::MetaProgress;
use crate::player::ship::{HelmIntent, PlayerShip, ShipUpgrade};
use crate::simulation::events::EventLog;
use crate::simulation::island::{IslandOutcome, IslandSim};
use crate::simulation::sea::{SeaOutcome, SeaSim};

/// Every fifth island holds a boss
const BOSS_INTERVAL: u32 = 5;
/// Ammo granted on top of the capacity raise when powder stores are taken
const POWDER_STORES_AMMO: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    Underway,
    /// The run ended; `doubloons` were banked into meta progress
    Lost { doubloons: u32 },
}

pub struct RunState {
    pub player: Player,
    pub sea: SeaSim,
    pub meta: MetaProgress,
    pub islands_cleared: u32,
    /// Upgrades on offer after the last cleared island
    pub offers: Vec<ShipUpgrade>,
    pub outcome: RunOutcome,
    config: SimulationConfig,
    rng: SimRng,
}

impl RunState {
    /// Start a run with the unlocks bought in earlier runs
    pub fn start(meta: MetaProgress, config: SimulationConfig, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let mut ship = PlayerShip::default();
        meta.apply(&mut ship);
        let sea = SeaSim::new(ship, 1, config.sea.clone(), config.combat.clone(), rng.gen());
        tracing::info!(seed, unlocks = meta.unlocks.len(), "Run started");
        Self {
            player: Player::default(),
            sea,
            meta,
            islands_cleared: 0,
            offers: Vec::new(),
            outcome: RunOutcome::Underway,
            config,
            rng,
        }
    }

    pub fn ship(&self) -> &PlayerShip {
        &self.sea.ship
    }

    pub fn is_over(&self) -> bool {
        self.outcome != RunOutcome::Underway
    }

    /// Difficulty of the next island
    pub fn difficulty(&self) -> u32 {
        (self.islands_cleared + 1).min(MAX_DIFFICULTY)
    }

    pub fn next_is_boss(&self) -> bool {
        (self.islands_cleared + 1) % BOSS_INTERVAL == 0
    }

    /// One sailing step. Plunder from sunk ships goes straight into the hold.
    pub fn sail(&mut self, dt: f32, helm: &HelmIntent) -> EventLog {
        if self.is_over() {
            return EventLog::new();
        }
        let log = self.sea.step(dt, helm);
        if self.sea.plunder > 0 {
            self.player.gold += std::mem::take(&mut self.sea.plunder);
        }
        if self.sea.outcome == SeaOutcome::Sunk {
            self.end_run();
        }
        log
    }

    /// Generate the landed island and send the avatar ashore. `None` unless
    /// the ship has just landed.
    pub fn go_ashore(&mut self) -> Option<IslandSim> {
        if self.is_over() || !matches!(self.sea.outcome, SeaOutcome::Landed { .. }) {
            return None;
        }
        self.sync_crew();
        let layout = generate_island(self.difficulty(), &self.config.island, &mut self.rng);
        let player = std::mem::take(&mut self.player);
        Some(IslandSim::new(
            layout,
            player,
            self.next_is_boss(),
            self.config.combat.clone(),
            self.rng.gen(),
        ))
    }

    /// Take the avatar back from a finished or abandoned island
    pub fn return_from_island(&mut self, island: IslandSim) {
        let outcome = island.outcome;
        self.player = island.player;
        match outcome {
            IslandOutcome::Escaped => {
                self.islands_cleared += 1;
                let heal = self.sea.ship.surgeon_heal;
                if heal > 0.0 {
                    self.player.health.heal(heal);
                }
                self.offers = self.sea.ship.upgrade_choices(&mut self.rng);
                self.sea.resume();
                tracing::info!(cleared = self.islands_cleared, gold = self.player.gold, "Island cleared");
            }
            IslandOutcome::Died => self.end_run(),
            // Leaving early forfeits the island but keeps what was carried out
            IslandOutcome::InProgress => self.sea.resume(),
        }
    }

    /// Take one of the offered ship upgrades
    pub fn choose_upgrade(&mut self, upgrade: ShipUpgrade) -> Result<(), ActionRejection> {
        if !self.offers.contains(&upgrade) {
            return Err(TargetError::NotOffered(upgrade.name()).into());
        }
        self.offers.clear();
        self.sea.ship.apply_upgrade(upgrade);
        if upgrade == ShipUpgrade::PowderStores {
            self.player.ammo += POWDER_STORES_AMMO;
        }
        self.sync_crew();
        Ok(())
    }

    /// Carry the ship's crew bonuses over to the avatar
    fn sync_crew(&mut self) {
        let ship = &self.sea.ship;
        let max_hp = PLAYER_BASE_HP + ship.crew_morale;
        if max_hp > self.player.health.max {
            self.player.health.raise_max(max_hp - self.player.health.max);
        }
        self.player.max_ammo = STARTING_MAX_AMMO + ship.extra_ammo;
        self.player.ammo = self.player.ammo.min(self.player.max_ammo);
        self.player.bonuses = ship.crew_bonuses();
    }

    fn end_run(&mut self) {
        let doubloons = self.meta.settle_death(self.player.gold, self.islands_cleared);
        self.outcome = RunOutcome::Lost { doubloons };
        tracing::info!(
            gold = self.player.gold,
            cleared = self.islands_cleared,
            doubloons,
            "Run over"
        );
    }
}
