//! Turn-based heist shift
//!
//! The player defends a building from waves of intruders with cameras, door
//! locks and an alarm. Commands spend action points and are rejected without
//! touching the world when they cannot be paid for or hit nothing.
//! `HeistSim::step_turn` advances one turn: waves, action points, cooldown,
//! auto-lock, intruder turns, camera coverage and detection, then the outcome.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::intruder::{Intruder, TurnOutcome};
use crate::ai::waves::{wave_composition, WaveSchedule};
use crate::core::config::HeistConfig;
use crate::core::error::{ActionRejection, TargetError};
use crate::core::types::{seeded_rng, IdAllocator, SimRng, TilePos};
use crate::simulation::events::{EventLog, SimEventKind};
use crate::visibility::camera::{CameraRig, SensorFlags, SensorRanges, VisibilityMask};
use crate::world::level::BuildingLayout;
use crate::world::room::Room;
use crate::world::tiles::BuildingTile;

const OFFER_COUNT: usize = 3;
const FAST_REBOOT_COOLDOWN: u32 = 3;
const EMP_STUN: u32 = 3;
const REINFORCED_DOOR_STRENGTH: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeCategory {
    Hardware,
    Software,
    Countermeasure,
}

impl UpgradeCategory {
    pub const ALL: [UpgradeCategory; 3] = [
        UpgradeCategory::Hardware,
        UpgradeCategory::Software,
        UpgradeCategory::Countermeasure,
    ];
}

/// Security upgrades offered between shifts. Each can be owned once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeistUpgrade {
    ExtraCamera,
    EnhancedZoom,
    NightVision,
    BackupPower,
    MotionDetection,
    FacialRecognition,
    PredictivePathing,
    FastReboot,
    ReinforcedDoors,
    EmpTrap,
    AutoLock,
    SecurityDrone,
}

impl HeistUpgrade {
    pub const ALL: [HeistUpgrade; 12] = [
        HeistUpgrade::ExtraCamera,
        HeistUpgrade::EnhancedZoom,
        HeistUpgrade::NightVision,
        HeistUpgrade::BackupPower,
        HeistUpgrade::MotionDetection,
        HeistUpgrade::FacialRecognition,
        HeistUpgrade::PredictivePathing,
        HeistUpgrade::FastReboot,
        HeistUpgrade::ReinforcedDoors,
        HeistUpgrade::EmpTrap,
        HeistUpgrade::AutoLock,
        HeistUpgrade::SecurityDrone,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HeistUpgrade::ExtraCamera => "Extra Camera",
            HeistUpgrade::EnhancedZoom => "Enhanced Zoom",
            HeistUpgrade::NightVision => "Night Vision",
            HeistUpgrade::BackupPower => "Backup Power",
            HeistUpgrade::MotionDetection => "Motion Detection",
            HeistUpgrade::FacialRecognition => "Facial Recognition",
            HeistUpgrade::PredictivePathing => "Predictive Pathing",
            HeistUpgrade::FastReboot => "Fast Reboot",
            HeistUpgrade::ReinforcedDoors => "Reinforced Doors",
            HeistUpgrade::EmpTrap => "EMP Trap",
            HeistUpgrade::AutoLock => "Auto-Lock",
            HeistUpgrade::SecurityDrone => "Security Drone",
        }
    }

    pub fn category(&self) -> UpgradeCategory {
        match self {
            HeistUpgrade::ExtraCamera
            | HeistUpgrade::EnhancedZoom
            | HeistUpgrade::NightVision
            | HeistUpgrade::BackupPower => UpgradeCategory::Hardware,
            HeistUpgrade::MotionDetection
            | HeistUpgrade::FacialRecognition
            | HeistUpgrade::PredictivePathing
            | HeistUpgrade::FastReboot => UpgradeCategory::Software,
            HeistUpgrade::ReinforcedDoors
            | HeistUpgrade::EmpTrap
            | HeistUpgrade::AutoLock
            | HeistUpgrade::SecurityDrone => UpgradeCategory::Countermeasure,
        }
    }
}

/// Upgrades owned across shifts and the rule values they imply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeistLoadout {
    pub upgrades: BTreeSet<HeistUpgrade>,
}

impl HeistLoadout {
    pub fn has(&self, upgrade: HeistUpgrade) -> bool {
        self.upgrades.contains(&upgrade)
    }

    /// Returns false if the upgrade was already owned
    pub fn apply(&mut self, upgrade: HeistUpgrade) -> bool {
        let added = self.upgrades.insert(upgrade);
        if added {
            tracing::debug!(upgrade = upgrade.name(), "Heist upgrade installed");
        }
        added
    }

    pub fn max_action_points(&self, config: &HeistConfig) -> u32 {
        config.max_action_points + u32::from(self.has(HeistUpgrade::BackupPower))
    }

    pub fn alarm_cooldown(&self, config: &HeistConfig) -> u32 {
        if self.has(HeistUpgrade::FastReboot) {
            FAST_REBOOT_COOLDOWN
        } else {
            config.alarm_cooldown
        }
    }

    pub fn alarm_stun(&self, config: &HeistConfig) -> u32 {
        if self.has(HeistUpgrade::EmpTrap) {
            EMP_STUN
        } else {
            config.alarm_stun
        }
    }

    pub fn door_strength(&self, config: &HeistConfig) -> u32 {
        if self.has(HeistUpgrade::ReinforcedDoors) {
            REINFORCED_DOOR_STRENGTH
        } else {
            config.door_strength
        }
    }

    pub fn camera_count(&self, config: &HeistConfig) -> usize {
        let extra = usize::from(self.has(HeistUpgrade::ExtraCamera));
        (config.cameras + extra).min(config.max_cameras)
    }

    pub fn sensor_flags(&self) -> SensorFlags {
        SensorFlags {
            night_vision: self.has(HeistUpgrade::NightVision),
            motion_detection: self.has(HeistUpgrade::MotionDetection),
            predictive_pathing: self.has(HeistUpgrade::PredictivePathing),
            security_drone: self.has(HeistUpgrade::SecurityDrone),
        }
    }

    /// Up to three unowned upgrades: one from each category where possible,
    /// then random fill
    pub fn offers(&self, rng: &mut SimRng) -> Vec<HeistUpgrade> {
        let available: Vec<HeistUpgrade> = HeistUpgrade::ALL
            .into_iter()
            .filter(|u| !self.has(*u))
            .collect();
        if available.len() <= OFFER_COUNT {
            return available;
        }
        let mut offers = Vec::with_capacity(OFFER_COUNT);
        for category in UpgradeCategory::ALL {
            let pool: Vec<HeistUpgrade> = available
                .iter()
                .copied()
                .filter(|u| u.category() == category)
                .collect();
            if let Some(&pick) = pool.choose(rng) {
                offers.push(pick);
            }
        }
        while offers.len() < OFFER_COUNT {
            let rest: Vec<HeistUpgrade> = available
                .iter()
                .copied()
                .filter(|u| !offers.contains(u))
                .collect();
            match rest.choose(rng) {
                Some(&pick) => offers.push(pick),
                None => break,
            }
        }
        offers.truncate(OFFER_COUNT);
        offers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShiftOutcome {
    InProgress,
    Survived,
    Breached,
}

pub struct HeistSim {
    pub layout: BuildingLayout,
    pub cameras: CameraRig,
    pub intruders: Vec<Intruder>,
    pub action_points: u32,
    pub alarm_cooldown: u32,
    pub schedule: WaveSchedule,
    pub next_wave: usize,
    pub turn: u32,
    pub outcome: ShiftOutcome,
    coverage: VisibilityMask,
    loadout: HeistLoadout,
    config: HeistConfig,
    ids: IdAllocator,
    rng: SimRng,
}

impl HeistSim {
    pub fn new(mut layout: BuildingLayout, loadout: HeistLoadout, config: HeistConfig, seed: u64) -> Self {
        layout.level.doors.reset();
        layout.level.door_threshold = loadout.door_strength(&config);
        let cameras = CameraRig::install(&layout.level, loadout.camera_count(&config));
        let schedule = WaveSchedule::for_shift(layout.shift, config.grace_turns);
        let coverage = cameras.coverage(&layout.level, loadout.sensor_flags(), ranges(&config));
        tracing::info!(
            shift = layout.shift,
            waves = schedule.wave_count(),
            end_turn = schedule.end_turn,
            entries = layout.entries.len(),
            "Shift starting"
        );
        Self {
            action_points: loadout.max_action_points(&config),
            layout,
            cameras,
            intruders: Vec::new(),
            alarm_cooldown: 0,
            schedule,
            next_wave: 0,
            turn: 0,
            outcome: ShiftOutcome::InProgress,
            coverage,
            loadout,
            config,
            ids: IdAllocator::default(),
            rng: seeded_rng(seed),
        }
    }

    pub fn loadout(&self) -> &HeistLoadout {
        &self.loadout
    }

    pub fn is_over(&self) -> bool {
        self.outcome != ShiftOutcome::InProgress
    }

    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.layout.level.is_walkable(pos)
    }

    pub fn tile_at(&self, pos: TilePos) -> Option<BuildingTile> {
        self.layout.level.tile_at(pos)
    }

    pub fn room_at(&self, pos: TilePos) -> Option<&Room> {
        self.layout.level.room_at(pos)
    }

    pub fn find_path(&self, start: TilePos, goal: TilePos) -> Vec<TilePos> {
        self.layout.level.find_path(start, goal)
    }

    /// Tiles the cameras currently see
    pub fn visibility_mask(&self) -> &VisibilityMask {
        &self.coverage
    }

    fn refresh_coverage(&mut self) {
        self.coverage =
            self.cameras
                .coverage(&self.layout.level, self.loadout.sensor_flags(), ranges(&self.config));
    }

    fn ensure_action_points(&self, cost: u32) -> Result<(), ActionRejection> {
        if self.action_points < cost {
            return Err(ActionRejection::InsufficientResource {
                resource: "action points",
                needed: cost,
                available: self.action_points,
            });
        }
        Ok(())
    }

    fn check_bounds(&self, pos: TilePos) -> Result<(), TargetError> {
        if self.layout.level.grid.in_bounds(pos) {
            Ok(())
        } else {
            Err(TargetError::OutOfBounds(pos))
        }
    }

    /// Lock the unlocked door at `pos`
    pub fn lock_door(&mut self, pos: TilePos) -> Result<EventLog, ActionRejection> {
        let cost = self.config.lock_cost;
        self.ensure_action_points(cost)?;
        self.check_bounds(pos)?;
        match self.layout.level.doors.get(pos) {
            None => return Err(TargetError::NoDoor(pos).into()),
            Some(door) if door.locked => return Err(TargetError::AlreadyLocked(pos).into()),
            Some(_) => {}
        }
        self.action_points -= cost;
        if let Some(door) = self.layout.level.doors.get_mut(pos) {
            door.lock();
        }
        tracing::debug!(x = pos.x, y = pos.y, ap = self.action_points, "Door locked");
        let mut log = EventLog::new();
        log.push(SimEventKind::DoorLocked { pos, automatic: false }, u64::from(self.turn));
        Ok(log)
    }

    /// Sound the alarm in the camera-covered room containing `pos`. Every
    /// intruder in the room is stunned and takes one wound.
    pub fn trigger_alarm(&mut self, pos: TilePos) -> Result<EventLog, ActionRejection> {
        let cost = self.config.alarm_cost;
        self.ensure_action_points(cost)?;
        if self.alarm_cooldown > 0 {
            return Err(ActionRejection::OnCooldown {
                remaining: self.alarm_cooldown as f32,
            });
        }
        self.check_bounds(pos)?;
        let room = self
            .layout
            .level
            .room_at(pos)
            .map(|r| r.id)
            .ok_or(TargetError::NoRoom(pos))?;
        if !self.cameras.covers_room(room) {
            return Err(TargetError::NoCamera(pos).into());
        }

        self.action_points -= cost;
        self.alarm_cooldown = self.loadout.alarm_cooldown(&self.config);
        let stun = self.loadout.alarm_stun(&self.config);
        let mut stunned = 0;
        let mut caught = Vec::new();
        for intruder in self.intruders.iter_mut().filter(|i| !i.is_terminal()) {
            let in_room = self.layout.level.room_at(intruder.pos).is_some_and(|r| r.id == room);
            if !in_room {
                continue;
            }
            intruder.stun(stun);
            stunned += 1;
            if intruder.wound() {
                caught.push(intruder.id);
            }
        }
        tracing::info!(room = room.0, stunned, caught = caught.len(), turn = self.turn, "Alarm triggered");

        let tick = u64::from(self.turn);
        let mut log = EventLog::new();
        log.push(SimEventKind::AlarmTriggered { room, stunned }, tick);
        for id in caught {
            log.push(SimEventKind::IntruderCaught { id }, tick);
        }
        Ok(log)
    }

    /// Point camera `id` at the room containing `pos`. Free.
    pub fn move_camera(&mut self, id: usize, pos: TilePos) -> Result<(), ActionRejection> {
        if self.cameras.get(id).is_none() {
            return Err(TargetError::UnknownCamera(id).into());
        }
        self.check_bounds(pos)?;
        let room = self
            .layout
            .level
            .room_at(pos)
            .map(|r| r.id)
            .ok_or(TargetError::NoRoom(pos))?;
        self.cameras.aim(id, room);
        self.refresh_coverage();
        Ok(())
    }

    /// Advance one turn. Finished shifts report nothing.
    pub fn step_turn(&mut self) -> EventLog {
        let mut log = EventLog::new();
        if self.is_over() {
            return log;
        }
        self.turn += 1;
        let tick = u64::from(self.turn);

        if let Some(wave) = self.schedule.due(self.next_wave, self.turn) {
            self.spawn_wave(wave, &mut log);
            self.next_wave += 1;
        }

        self.action_points = (self.action_points + 1).min(self.loadout.max_action_points(&self.config));
        self.alarm_cooldown = self.alarm_cooldown.saturating_sub(1);

        if self.loadout.has(HeistUpgrade::AutoLock) {
            self.auto_lock(&mut log);
        }

        let goal = self.layout.vault;
        for intruder in &mut self.intruders {
            match intruder.take_turn(&mut self.layout.level, goal, self.config.replan_chance, &mut self.rng) {
                TurnOutcome::Picked { door, opened: true } => {
                    log.push(SimEventKind::DoorUnlocked { pos: door }, tick);
                }
                TurnOutcome::Breached => {
                    log.push(SimEventKind::Breach { id: intruder.id }, tick);
                }
                _ => {}
            }
        }

        self.detect(&mut log);

        if self.intruders.iter().any(|i| i.has_breached()) {
            self.outcome = ShiftOutcome::Breached;
            log.push(SimEventKind::ShiftLost { shift: self.layout.shift }, tick);
            tracing::info!(shift = self.layout.shift, turn = self.turn, "Vault breached, shift lost");
        } else if self.turn >= self.schedule.end_turn {
            self.outcome = ShiftOutcome::Survived;
            log.push(SimEventKind::ShiftSurvived { shift: self.layout.shift }, tick);
            tracing::info!(shift = self.layout.shift, turn = self.turn, "Shift survived");
        }
        log
    }

    fn spawn_wave(&mut self, wave: usize, log: &mut EventLog) {
        let composition = wave_composition(self.layout.shift, wave);
        if self.layout.entries.is_empty() {
            tracing::warn!(wave, "no entry points, wave skipped");
            return;
        }
        for &kind in composition {
            let entry = self.layout.entries[self.rng.gen_range(0..self.layout.entries.len())];
            let id = self.ids.next_id();
            self.intruders.push(Intruder::new(id, kind, entry.pos, self.turn));
        }
        log.push(
            SimEventKind::WaveSpawned {
                wave,
                intruders: composition.len(),
            },
            u64::from(self.turn),
        );
        tracing::info!(wave = wave + 1, intruders = composition.len(), turn = self.turn, "Wave spawned");
    }

    /// Lock every open door within reach of an intruder seen last turn
    fn auto_lock(&mut self, log: &mut EventLog) {
        let seen: Vec<TilePos> = self
            .intruders
            .iter()
            .filter(|i| !i.is_terminal() && i.visible)
            .map(|i| i.pos)
            .collect();
        let radius = self.config.auto_lock_radius;
        for door in self.layout.level.doors.iter_mut().filter(|d| !d.locked) {
            if seen.iter().any(|p| p.manhattan(&door.pos) <= radius) {
                door.lock();
                log.push(
                    SimEventKind::DoorLocked {
                        pos: door.pos,
                        automatic: true,
                    },
                    u64::from(self.turn),
                );
            }
        }
    }

    fn detect(&mut self, log: &mut EventLog) {
        self.refresh_coverage();
        let flags = self.loadout.sensor_flags();
        let ranges = ranges(&self.config);
        for intruder in self.intruders.iter_mut() {
            if intruder.is_terminal() {
                intruder.visible = false;
                continue;
            }
            let was_visible = intruder.visible;
            intruder.visible = self.cameras.detects(
                &self.layout.level,
                &self.coverage,
                flags,
                ranges,
                intruder.pos,
                intruder.stats.stealth,
                &mut self.rng,
            );
            if intruder.visible && !was_visible {
                log.push(
                    SimEventKind::IntruderDetected {
                        id: intruder.id,
                        kind: intruder.kind,
                        pos: intruder.pos,
                    },
                    u64::from(self.turn),
                );
            }
        }
    }
}

fn ranges(config: &HeistConfig) -> SensorRanges {
    SensorRanges {
        night_vision_reach: config.night_vision_reach,
        predictive_radius: config.predictive_radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::intruder::IntruderKind;
    use crate::core::types::AgentId;
    use crate::generation::building::fallback_building;

    fn sim() -> HeistSim {
        sim_with(HeistLoadout::default())
    }

    fn sim_with(loadout: HeistLoadout) -> HeistSim {
        HeistSim::new(fallback_building(1), loadout, HeistConfig::default(), 11)
    }

    /// No waves and a far-off end, so only hand-placed intruders act
    fn quiet(sim: &mut HeistSim) {
        sim.schedule = WaveSchedule {
            shift: 1,
            turns: Vec::new(),
            end_turn: 1000,
        };
    }

    fn first_door(sim: &HeistSim) -> TilePos {
        sim.layout.level.doors.iter().next().map(|d| d.pos).unwrap()
    }

    const LOBBY: TilePos = TilePos::new(3, 3);
    const SERVER_ROOM: TilePos = TilePos::new(23, 11);

    #[test]
    fn test_lock_door_spends_ap() {
        let mut sim = sim();
        let door = first_door(&sim);
        let log = sim.lock_door(door).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(sim.action_points, 2);
        assert!(!sim.is_walkable(door));
        // Routing still passes through the locked door
        assert!(sim.layout.level.is_routable(door));
    }

    #[test]
    fn test_lock_door_rejections_leave_world_untouched() {
        let mut sim = sim();
        let door = first_door(&sim);
        assert_eq!(
            sim.lock_door(TilePos::new(-1, 0)),
            Err(ActionRejection::InvalidTarget(TargetError::OutOfBounds(TilePos::new(-1, 0))))
        );
        assert_eq!(
            sim.lock_door(LOBBY),
            Err(ActionRejection::InvalidTarget(TargetError::NoDoor(LOBBY)))
        );
        sim.lock_door(door).unwrap();
        assert_eq!(
            sim.lock_door(door),
            Err(ActionRejection::InvalidTarget(TargetError::AlreadyLocked(door)))
        );
        assert_eq!(sim.action_points, 2);

        sim.action_points = 0;
        let other = sim.layout.level.doors.iter().find(|d| !d.locked).map(|d| d.pos).unwrap();
        assert!(matches!(
            sim.lock_door(other),
            Err(ActionRejection::InsufficientResource { needed: 1, available: 0, .. })
        ));
        assert!(sim.is_walkable(other));
    }

    #[test]
    fn test_alarm_needs_camera_and_cooldown() {
        let mut sim = sim();
        assert_eq!(
            sim.trigger_alarm(SERVER_ROOM),
            Err(ActionRejection::InvalidTarget(TargetError::NoCamera(SERVER_ROOM)))
        );
        assert_eq!(sim.action_points, 3);

        let log = sim.trigger_alarm(LOBBY).unwrap();
        assert!(matches!(log.events[0].kind, SimEventKind::AlarmTriggered { stunned: 0, .. }));
        assert_eq!(sim.action_points, 1);
        assert_eq!(sim.alarm_cooldown, 5);

        sim.action_points = 3;
        assert_eq!(
            sim.trigger_alarm(LOBBY),
            Err(ActionRejection::OnCooldown { remaining: 5.0 })
        );
    }

    #[test]
    fn test_alarm_stuns_and_catches() {
        let mut sim = sim();
        sim.intruders.push(Intruder::new(AgentId(90), IntruderKind::Runner, LOBBY, 0));
        sim.intruders.push(Intruder::new(AgentId(91), IntruderKind::Brute, LOBBY, 0));
        let log = sim.trigger_alarm(LOBBY).unwrap();
        assert!(matches!(log.events[0].kind, SimEventKind::AlarmTriggered { stunned: 2, .. }));
        assert_eq!(log.count(|k| matches!(k, SimEventKind::IntruderCaught { .. })), 1);
        assert!(sim.intruders[0].is_caught());
        assert!(!sim.intruders[1].is_caught());
        assert_eq!(sim.intruders[1].stun_turns, 2);
    }

    #[test]
    fn test_camera_move() {
        let mut sim = sim();
        assert_eq!(
            sim.move_camera(99, LOBBY),
            Err(ActionRejection::InvalidTarget(TargetError::UnknownCamera(99)))
        );
        sim.move_camera(0, SERVER_ROOM).unwrap();
        assert_eq!(sim.visibility_mask().get(SERVER_ROOM), Some(&true));
        assert_eq!(sim.action_points, 3);
        assert!(sim.trigger_alarm(SERVER_ROOM).is_ok());
    }

    #[test]
    fn test_first_wave_arrives_on_turn_one() {
        let mut sim = sim();
        let log = sim.step_turn();
        assert_eq!(
            log.count(|k| matches!(k, SimEventKind::WaveSpawned { wave: 0, intruders: 2 })),
            1
        );
        assert_eq!(sim.intruders.len(), 2);
        assert_eq!(sim.next_wave, 1);
    }

    #[test]
    fn test_action_points_regenerate_capped() {
        let mut sim = sim();
        quiet(&mut sim);
        sim.action_points = 0;
        sim.step_turn();
        assert_eq!(sim.action_points, 1);
        for _ in 0..5 {
            sim.step_turn();
        }
        assert_eq!(sim.action_points, 3);

        let mut powered = sim_with(HeistLoadout {
            upgrades: [HeistUpgrade::BackupPower].into_iter().collect(),
        });
        quiet(&mut powered);
        powered.step_turn();
        assert_eq!(powered.action_points, 4);
    }

    #[test]
    fn test_breach_loses_shift() {
        let mut sim = sim();
        quiet(&mut sim);
        let next_to_vault = TilePos::new(sim.layout.vault.x + 1, sim.layout.vault.y);
        sim.intruders.push(Intruder::new(AgentId(50), IntruderKind::Intruder, next_to_vault, 0));
        let log = sim.step_turn();
        assert_eq!(log.count(|k| matches!(k, SimEventKind::Breach { .. })), 1);
        assert_eq!(log.count(|k| matches!(k, SimEventKind::ShiftLost { shift: 1 })), 1);
        assert_eq!(sim.outcome, ShiftOutcome::Breached);
        assert!(sim.step_turn().is_empty());
    }

    #[test]
    fn test_survive_at_end_turn() {
        let mut sim = sim();
        sim.schedule = WaveSchedule {
            shift: 1,
            turns: Vec::new(),
            end_turn: 3,
        };
        assert!(sim.step_turn().is_empty());
        sim.step_turn();
        let log = sim.step_turn();
        assert_eq!(log.count(|k| matches!(k, SimEventKind::ShiftSurvived { shift: 1 })), 1);
        assert_eq!(sim.outcome, ShiftOutcome::Survived);
    }

    #[test]
    fn test_detection_reported_once() {
        let mut sim = sim();
        quiet(&mut sim);
        let mut guard = Intruder::new(AgentId(7), IntruderKind::Intruder, LOBBY, 0);
        guard.stun(10);
        sim.intruders.push(guard);
        let first = sim.step_turn();
        assert_eq!(first.count(|k| matches!(k, SimEventKind::IntruderDetected { .. })), 1);
        assert!(sim.intruders[0].visible);
        let second = sim.step_turn();
        assert_eq!(second.count(|k| matches!(k, SimEventKind::IntruderDetected { .. })), 0);
    }

    #[test]
    fn test_auto_lock_near_visible_intruder() {
        let mut sim = sim_with(HeistLoadout {
            upgrades: [HeistUpgrade::AutoLock].into_iter().collect(),
        });
        quiet(&mut sim);
        let door = first_door(&sim);
        let mut lurker = Intruder::new(AgentId(3), IntruderKind::Intruder, door, 0);
        lurker.stun(10);
        lurker.visible = true;
        sim.intruders.push(lurker);
        let log = sim.step_turn();
        assert!(log.count(|k| matches!(k, SimEventKind::DoorLocked { automatic: true, .. })) >= 1);
        assert!(sim.layout.level.doors.get(door).is_some_and(|d| d.locked));
    }

    #[test]
    fn test_reinforced_doors_raise_threshold() {
        let sim = sim_with(HeistLoadout {
            upgrades: [HeistUpgrade::ReinforcedDoors].into_iter().collect(),
        });
        assert_eq!(sim.layout.level.door_threshold, 6);
    }

    #[test]
    fn test_offers_span_categories() {
        let mut rng = seeded_rng(4);
        let loadout = HeistLoadout::default();
        for _ in 0..20 {
            let offers = loadout.offers(&mut rng);
            assert_eq!(offers.len(), 3);
            for category in UpgradeCategory::ALL {
                assert!(offers.iter().any(|u| u.category() == category));
            }
        }

        let nearly_full = HeistLoadout {
            upgrades: HeistUpgrade::ALL.into_iter().skip(2).collect(),
        };
        let offers = nearly_full.offers(&mut rng);
        assert_eq!(offers, vec![HeistUpgrade::ExtraCamera, HeistUpgrade::EnhancedZoom]);
    }

    #[test]
    fn test_loadout_values() {
        let config = HeistConfig::default();
        let mut loadout = HeistLoadout::default();
        assert_eq!(loadout.camera_count(&config), 4);
        assert!(loadout.apply(HeistUpgrade::ExtraCamera));
        assert!(!loadout.apply(HeistUpgrade::ExtraCamera));
        assert_eq!(loadout.camera_count(&config), 5);
        loadout.apply(HeistUpgrade::FastReboot);
        loadout.apply(HeistUpgrade::EmpTrap);
        assert_eq!(loadout.alarm_cooldown(&config), 3);
        assert_eq!(loadout.alarm_stun(&config), 3);
        assert!(!loadout.sensor_flags().night_vision);
    }
}
