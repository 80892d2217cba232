//! Discrete-turn intruder FSM
//!
//! Archetypes differ only in their stat bundle. Each turn an intruder does
//! exactly one of: sit out a stun, work on a door, or walk its route.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, SimRng, TilePos};
use crate::navigation::pathfinding::should_replan;
use crate::world::level::Level;
use crate::world::tiles::BuildingTile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntruderKind {
    Intruder,
    Runner,
    Locksmith,
    Ghost,
    Brute,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntruderStats {
    /// Route steps per turn
    pub speed: u32,
    /// Pick progress added per turn of picking
    pub pick_skill: u32,
    /// Chance per turn to slip past a camera
    pub stealth: f64,
    pub hp: u32,
}

impl IntruderKind {
    pub fn name(&self) -> &'static str {
        match self {
            IntruderKind::Intruder => "Intruder",
            IntruderKind::Runner => "Runner",
            IntruderKind::Locksmith => "Locksmith",
            IntruderKind::Ghost => "Ghost",
            IntruderKind::Brute => "Brute",
        }
    }

    pub fn stats(&self) -> IntruderStats {
        match self {
            IntruderKind::Intruder => IntruderStats {
                speed: 1,
                pick_skill: 1,
                stealth: 0.0,
                hp: 1,
            },
            IntruderKind::Runner => IntruderStats {
                speed: 2,
                pick_skill: 1,
                stealth: 0.0,
                hp: 1,
            },
            IntruderKind::Locksmith => IntruderStats {
                speed: 1,
                pick_skill: 3,
                stealth: 0.0,
                hp: 1,
            },
            IntruderKind::Ghost => IntruderStats {
                speed: 1,
                pick_skill: 1,
                stealth: 0.5,
                hp: 1,
            },
            IntruderKind::Brute => IntruderStats {
                speed: 1,
                pick_skill: 2,
                stealth: 0.0,
                hp: 2,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntruderStatus {
    Active,
    Picking { door: TilePos },
    /// Terminal: taken down by the defenders
    Caught,
    /// Terminal: reached the vault
    Breached,
}

/// What happened during one intruder turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Idle,
    Stunned,
    StartedPicking(TilePos),
    Picked { door: TilePos, opened: bool },
    Moved { steps: u32 },
    Breached,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intruder {
    pub id: AgentId,
    pub kind: IntruderKind,
    pub stats: IntruderStats,
    pub pos: TilePos,
    pub path: VecDeque<TilePos>,
    pub hp: u32,
    pub stun_turns: u32,
    pub status: IntruderStatus,
    /// Seen by a camera this turn
    pub visible: bool,
    pub spawn_turn: u32,
}

impl Intruder {
    pub fn new(id: AgentId, kind: IntruderKind, pos: TilePos, spawn_turn: u32) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            stats,
            pos,
            path: VecDeque::new(),
            hp: stats.hp,
            stun_turns: 0,
            status: IntruderStatus::Active,
            visible: false,
            spawn_turn,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, IntruderStatus::Caught | IntruderStatus::Breached)
    }

    pub fn is_caught(&self) -> bool {
        self.status == IntruderStatus::Caught
    }

    pub fn has_breached(&self) -> bool {
        self.status == IntruderStatus::Breached
    }

    /// Stun for `turns` and forget the current route
    pub fn stun(&mut self, turns: u32) {
        if self.is_terminal() {
            return;
        }
        self.stun_turns = turns;
        self.path.clear();
    }

    /// Lose one hp. Returns true when this blow caught the intruder.
    pub fn wound(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.hp = self.hp.saturating_sub(1);
        if self.hp == 0 {
            self.status = IntruderStatus::Caught;
            self.visible = false;
            true
        } else {
            false
        }
    }

    /// Play one turn against the level, heading for `goal`
    pub fn take_turn(
        &mut self,
        level: &mut Level<BuildingTile>,
        goal: TilePos,
        replan_chance: f64,
        rng: &mut SimRng,
    ) -> TurnOutcome {
        if self.is_terminal() {
            return TurnOutcome::Idle;
        }
        if self.stun_turns > 0 {
            self.stun_turns -= 1;
            return TurnOutcome::Stunned;
        }

        if let IntruderStatus::Picking { door: door_pos } = self.status {
            let threshold = level.door_threshold;
            match level.doors.get_mut(door_pos) {
                Some(door) if door.locked => {
                    let opened = door.pick(self.stats.pick_skill, threshold);
                    if opened {
                        self.status = IntruderStatus::Active;
                    }
                    return TurnOutcome::Picked {
                        door: door_pos,
                        opened,
                    };
                }
                // Unlocked by someone else; carry on walking this turn
                _ => self.status = IntruderStatus::Active,
            }
        }

        let stale = self.path.make_contiguous();
        if should_replan(stale, replan_chance, rng) {
            self.path = level.find_path(self.pos, goal).into();
        }

        let mut steps = 0;
        while steps < self.stats.speed {
            let Some(&next) = self.path.front() else {
                break;
            };
            let door_blocks = level
                .doors
                .get(next)
                .is_some_and(|d| d.blocks_movement(level.door_threshold));
            if door_blocks {
                self.status = IntruderStatus::Picking { door: next };
                return TurnOutcome::StartedPicking(next);
            }
            if !level.is_walkable(next) {
                // Route went stale against the map; drop it and replan next turn
                self.path.clear();
                break;
            }
            self.pos = next;
            self.path.pop_front();
            steps += 1;
            if self.pos == goal {
                self.status = IntruderStatus::Breached;
                return TurnOutcome::Breached;
            }
        }
        if steps == 0 {
            TurnOutcome::Idle
        } else {
            TurnOutcome::Moved { steps }
        }
    }
}
