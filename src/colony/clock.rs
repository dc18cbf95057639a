use std::time::Duration;

use crate::blueprint::model::UpkeepRule;
use crate::colony::ledger::{FOOD, POPULATION, ResourceLedger, WATER};

/// What one upkeep step did to the colony.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Upkeep {
    Fed,
    Starving { population: f64 },
    Extinct,
}

/// Population upkeep timer: every `interval` the colonists eat and drink.
#[derive(Debug, Clone)]
pub struct PopulationClock {
    rule: UpkeepRule,
    elapsed: Duration,
}

impl PopulationClock {
    pub fn new(rule: UpkeepRule) -> Self {
        Self {
            rule,
            elapsed: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.rule.interval_ms)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Accumulate `dt`. Returns true, and starts over from zero, once the
    /// interval is reached.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval() {
            self.elapsed = Duration::ZERO;
            return true;
        }
        false
    }

    /// Debit food and water for the current population. When either runs
    /// out one colonist dies.
    pub fn upkeep(&self, ledger: &mut ResourceLedger) -> Upkeep {
        let population = ledger.get(POPULATION);
        ledger.add(FOOD, -self.rule.food_per_capita * population);
        ledger.add(WATER, -self.rule.water_per_capita * population);

        if ledger.get(FOOD) > 0.0 && ledger.get(WATER) > 0.0 {
            return Upkeep::Fed;
        }

        ledger.add(POPULATION, -1.0);
        if ledger.get(POPULATION) < 0.0 {
            ledger.set(POPULATION, 0.0);
        }

        let population = ledger.get(POPULATION);
        if population <= 0.0 {
            tracing::warn!("The last colonist has died");
            Upkeep::Extinct
        } else {
            tracing::info!("Colonists are starving, population now {}", population);
            Upkeep::Starving { population }
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ledger(food: f64, water: f64, population: f64) -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        ledger.set(FOOD, food);
        ledger.set(WATER, water);
        ledger.set(POPULATION, population);
        ledger
    }

    #[test]
    fn test_advance_fires_on_interval() {
        let mut clock = PopulationClock::new(UpkeepRule::default());
        assert!(!clock.advance(Duration::from_millis(4999)));
        assert!(clock.advance(Duration::from_millis(1)));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_advance_drops_overshoot() {
        let mut clock = PopulationClock::new(UpkeepRule::default());
        assert!(clock.advance(Duration::from_millis(7000)));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_upkeep_fed() {
        let clock = PopulationClock::new(UpkeepRule::default());
        let mut ledger = ledger(10.0, 10.0, 4.0);

        assert_eq!(clock.upkeep(&mut ledger), Upkeep::Fed);
        assert_eq!(ledger.get(FOOD), 8.0);
        assert_eq!(ledger.get(WATER), 8.0);
        assert_eq!(ledger.get(POPULATION), 4.0);
    }

    #[test]
    fn test_upkeep_starving_may_go_negative() {
        let clock = PopulationClock::new(UpkeepRule::default());
        let mut ledger = ledger(1.0, 10.0, 4.0);

        assert_eq!(clock.upkeep(&mut ledger), Upkeep::Starving { population: 3.0 });
        assert_eq!(ledger.get(FOOD), -1.0);
    }

    #[test]
    fn test_upkeep_extinct() {
        let clock = PopulationClock::new(UpkeepRule::default());
        let mut ledger = ledger(0.0, 0.0, 1.0);

        assert_eq!(clock.upkeep(&mut ledger), Upkeep::Extinct);
        assert_eq!(ledger.get(POPULATION), 0.0);
    }

    #[test]
    fn test_upkeep_clamps_population() {
        let clock = PopulationClock::new(UpkeepRule::default());
        let mut ledger = ledger(0.0, 0.0, 0.5);

        assert_eq!(clock.upkeep(&mut ledger), Upkeep::Extinct);
        assert_eq!(ledger.get(POPULATION), 0.0);
    }

    proptest! {
        #[test]
        fn prop_upkeep_debits_half_per_capita(
            food in -10.0f64..50.0,
            water in -10.0f64..50.0,
            population in 1u32..40,
        ) {
            let clock = PopulationClock::new(UpkeepRule::default());
            let population = f64::from(population);
            let mut ledger = ledger(food, water, population);

            clock.upkeep(&mut ledger);

            let food_after = food - 0.5 * population;
            let water_after = water - 0.5 * population;
            prop_assert!((ledger.get(FOOD) - food_after).abs() < 1e-9);
            prop_assert!((ledger.get(WATER) - water_after).abs() < 1e-9);
            if food_after <= 0.0 || water_after <= 0.0 {
                prop_assert_eq!(ledger.get(POPULATION), (population - 1.0).max(0.0));
            } else {
                prop_assert_eq!(ledger.get(POPULATION), population);
            }
        }
    }
}
