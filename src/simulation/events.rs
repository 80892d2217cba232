//! Domain events emitted by the simulation steps
//!
//! The step functions report everything observable here instead of reaching
//! into presentation. Consumers (renderers, audio, scoring) read the log.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::ai::enemy::Archetype;
use crate::ai::intruder::IntruderKind;
use crate::combat::loot::ItemKind;
use crate::core::types::{AgentId, RoomId, Tick, TilePos, Vec2};
use crate::player::avatar::ActionKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// A real-time player action was refused; `reason` is the rejection's message
    ActionRejected { action: ActionKind, reason: String },

    // Island
    EnemySpawned { id: AgentId, archetype: Archetype },
    EnemyKilled { id: AgentId, archetype: Archetype, pos: Vec2 },
    /// Cosmetic damage number
    DamageDealt { pos: Vec2, amount: f32 },
    PlayerHit { damage: f32 },
    PlayerDied,
    LootDropped { pos: Vec2, items: usize },
    ItemPickedUp { item: ItemKind },
    ChestOpened { pos: TilePos },
    BossPhase { id: AgentId, phase: u8 },
    ExitReached,

    // Heist
    WaveSpawned { wave: usize, intruders: usize },
    IntruderDetected { id: AgentId, kind: IntruderKind, pos: TilePos },
    IntruderCaught { id: AgentId },
    DoorLocked { pos: TilePos, automatic: bool },
    DoorUnlocked { pos: TilePos },
    AlarmTriggered { room: RoomId, stunned: usize },
    Breach { id: AgentId },
    ShiftSurvived { shift: u32 },
    ShiftLost { shift: u32 },

    // Sea
    ShipDamaged { amount: f32 },
    EnemyShipSunk { id: AgentId },
    Rammed { id: AgentId, damage: f32 },
    FogRevealed { tiles: usize },
    IslandSighted { island: usize },
    Landed { island: usize },
    ShipSunk,
}

impl SimEventKind {
    /// Stable short name, used for tallies
    pub fn label(&self) -> &'static str {
        match self {
            SimEventKind::ActionRejected { .. } => "action_rejected",
            SimEventKind::EnemySpawned { .. } => "enemy_spawned",
            SimEventKind::EnemyKilled { .. } => "enemy_killed",
            SimEventKind::DamageDealt { .. } => "damage_dealt",
            SimEventKind::PlayerHit { .. } => "player_hit",
            SimEventKind::PlayerDied => "player_died",
            SimEventKind::LootDropped { .. } => "loot_dropped",
            SimEventKind::ItemPickedUp { .. } => "item_picked_up",
            SimEventKind::ChestOpened { .. } => "chest_opened",
            SimEventKind::BossPhase { .. } => "boss_phase",
            SimEventKind::ExitReached => "exit_reached",
            SimEventKind::WaveSpawned { .. } => "wave_spawned",
            SimEventKind::IntruderDetected { .. } => "intruder_detected",
            SimEventKind::IntruderCaught { .. } => "intruder_caught",
            SimEventKind::DoorLocked { .. } => "door_locked",
            SimEventKind::DoorUnlocked { .. } => "door_unlocked",
            SimEventKind::AlarmTriggered { .. } => "alarm_triggered",
            SimEventKind::Breach { .. } => "breach",
            SimEventKind::ShiftSurvived { .. } => "shift_survived",
            SimEventKind::ShiftLost { .. } => "shift_lost",
            SimEventKind::ShipDamaged { .. } => "ship_damaged",
            SimEventKind::EnemyShipSunk { .. } => "enemy_ship_sunk",
            SimEventKind::Rammed { .. } => "rammed",
            SimEventKind::FogRevealed { .. } => "fog_revealed",
            SimEventKind::IslandSighted { .. } => "island_sighted",
            SimEventKind::Landed { .. } => "landed",
            SimEventKind::ShipSunk => "ship_sunk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: Tick,
    pub kind: SimEventKind,
}

/// Events from one step, in the order they happened
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<SimEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: SimEventKind, tick: Tick) {
        self.events.push(SimEvent { tick, kind });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEventKind> {
        self.events.iter().map(|e| &e.kind)
    }

    pub fn count(&self, pred: impl Fn(&SimEventKind) -> bool) -> usize {
        self.iter().filter(|k| pred(k)).count()
    }

    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }
}

/// Running per-label totals across many steps
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventTally {
    pub counts: AHashMap<&'static str, usize>,
}

impl EventTally {
    pub fn record(&mut self, log: &EventLog) {
        for kind in log.iter() {
            *self.counts.entry(kind.label()).or_default() += 1;
        }
    }

    pub fn get(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_tally() {
        let mut log = EventLog::new();
        log.push(SimEventKind::PlayerHit { damage: 4.0 }, 3);
        log.push(SimEventKind::PlayerHit { damage: 4.0 }, 3);
        log.push(SimEventKind::ExitReached, 4);
        assert_eq!(log.len(), 3);
        assert_eq!(log.count(|k| matches!(k, SimEventKind::PlayerHit { .. })), 2);

        let mut tally = EventTally::default();
        tally.record(&log);
        tally.record(&log);
        assert_eq!(tally.get("player_hit"), 4);
        assert_eq!(tally.get("exit_reached"), 2);
        assert_eq!(tally.get("breach"), 0);
    }
}
