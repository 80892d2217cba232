//! Intruder wave schedule and compositions per shift

use serde::{Deserialize, Serialize};

use crate::ai::intruder::IntruderKind::{self, Brute, Ghost, Intruder, Locksmith, Runner};

const SHIFT_1: &[&[IntruderKind]] = &[&[Intruder, Intruder], &[Intruder, Runner]];
const SHIFT_2: &[&[IntruderKind]] = &[&[Intruder, Intruder, Locksmith], &[Runner, Runner, Intruder]];
const SHIFT_3: &[&[IntruderKind]] = &[
    &[Intruder, Locksmith, Runner],
    &[Ghost, Intruder, Intruder],
    &[Runner, Runner, Locksmith],
];
const SHIFT_4: &[&[IntruderKind]] = &[
    &[Locksmith, Ghost, Runner],
    &[Brute, Intruder, Intruder, Runner],
    &[Ghost, Ghost, Locksmith],
];
const SHIFT_5: &[&[IntruderKind]] = &[
    &[Brute, Locksmith, Ghost, Runner],
    &[Runner, Runner, Ghost, Locksmith],
    &[Brute, Brute, Locksmith, Ghost],
];

/// Archetypes arriving together in wave `wave` of `shift`. Shifts past the
/// last table reuse it; waves past the end of a table wrap around.
pub fn wave_composition(shift: u32, wave: usize) -> &'static [IntruderKind] {
    let table = match shift {
        0 | 1 => SHIFT_1,
        2 => SHIFT_2,
        3 => SHIFT_3,
        4 => SHIFT_4,
        _ => SHIFT_5,
    };
    table[wave % table.len()]
}

/// When each wave of a shift arrives and when the shift is survived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveSchedule {
    pub shift: u32,
    /// Turn each wave spawns on, ascending
    pub turns: Vec<u32>,
    /// Turn at which the defenders have held out
    pub end_turn: u32,
}

impl WaveSchedule {
    /// One opening wave plus one more per shift (up to four), arriving
    /// faster in later shifts
    pub fn for_shift(shift: u32, grace_turns: u32) -> Self {
        let gap = 8u32.saturating_sub(shift).max(1);
        let mut turns = vec![0];
        for i in 1..=shift.min(4) {
            turns.push(10 + i * gap);
        }
        let end_turn = turns.last().copied().unwrap_or(0) + grace_turns;
        Self {
            shift,
            turns,
            end_turn,
        }
    }

    pub fn wave_count(&self) -> usize {
        self.turns.len()
    }

    /// Index of the wave due at `turn`, if `next` has not been spawned yet
    pub fn due(&self, next: usize, turn: u32) -> Option<usize> {
        self.turns
            .get(next)
            .filter(|&&at| turn >= at)
            .map(|_| next)
    }
}
