//! Meta progression that survives death
//!
//! Plain state: the caller loads and stores it between runs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::error::ActionRejection;
use crate::player::ship::PlayerShip;

/// Share of carried gold converted to doubloons on death
const GOLD_TO_DOUBLOONS: f32 = 0.2;
const DOUBLOONS_PER_ISLAND: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetaUnlock {
    /// +20 hull at run start
    IronHull,
    /// +10 avatar hp on islands
    VeteranCrew,
    /// +15% gold find
    TradeRoutes,
}

impl MetaUnlock {
    pub const ALL: [MetaUnlock; 3] = [
        MetaUnlock::IronHull,
        MetaUnlock::VeteranCrew,
        MetaUnlock::TradeRoutes,
    ];

    pub fn cost(&self) -> u32 {
        match self {
            MetaUnlock::IronHull => 30,
            MetaUnlock::VeteranCrew => 25,
            MetaUnlock::TradeRoutes => 40,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaProgress {
    pub doubloons: u32,
    pub unlocks: BTreeSet<MetaUnlock>,
}

impl MetaProgress {
    pub fn has(&self, unlock: MetaUnlock) -> bool {
        self.unlocks.contains(&unlock)
    }

    /// Spend doubloons on an unlock. Owning it already costs nothing and changes nothing.
    pub fn purchase(&mut self, unlock: MetaUnlock) -> Result<(), ActionRejection> {
        if self.has(unlock) {
            return Ok(());
        }
        let cost = unlock.cost();
        if self.doubloons < cost {
            return Err(ActionRejection::InsufficientResource {
                resource: "doubloons",
                needed: cost,
                available: self.doubloons,
            });
        }
        self.doubloons -= cost;
        self.unlocks.insert(unlock);
        Ok(())
    }

    /// Run-start bonuses. Crew bonuses reach the avatar when it goes ashore.
    pub fn apply(&self, ship: &mut PlayerShip) {
        if self.has(MetaUnlock::IronHull) {
            ship.hull.raise_max(20.0);
        }
        if self.has(MetaUnlock::VeteranCrew) {
            ship.crew_morale += 10.0;
        }
        if self.has(MetaUnlock::TradeRoutes) {
            ship.gold_bonus += 0.15;
        }
    }

    /// Bank the run's earnings after a death. Returns the doubloons earned.
    pub fn settle_death(&mut self, gold: u32, islands_cleared: u32) -> u32 {
        let earned = (gold as f32 * GOLD_TO_DOUBLOONS).floor() as u32
            + islands_cleared * DOUBLOONS_PER_ISLAND;
        self.doubloons += earned;
        earned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_death() {
        let mut meta = MetaProgress::default();
        assert_eq!(meta.settle_death(57, 3), 11 + 15);
        assert_eq!(meta.doubloons, 26);
    }

    #[test]
    fn test_purchase_requires_doubloons() {
        let mut meta = MetaProgress {
            doubloons: 29,
            ..Default::default()
        };
        assert_eq!(
            meta.purchase(MetaUnlock::IronHull),
            Err(ActionRejection::InsufficientResource {
                resource: "doubloons",
                needed: 30,
                available: 29,
            })
        );
        assert!(!meta.has(MetaUnlock::IronHull));
        meta.doubloons = 30;
        assert!(meta.purchase(MetaUnlock::IronHull).is_ok());
        assert_eq!(meta.doubloons, 0);
        assert!(meta.purchase(MetaUnlock::IronHull).is_ok());
    }

    #[test]
    fn test_apply_bonuses() {
        let meta = MetaProgress {
            doubloons: 0,
            unlocks: MetaUnlock::ALL.into_iter().collect(),
        };
        let mut ship = PlayerShip::default();
        meta.apply(&mut ship);
        assert_eq!(ship.hull.max, 120.0);
        assert_eq!(ship.crew_morale, 10.0);
        assert!((ship.gold_bonus - 0.15).abs() < 1e-6);
    }
}
