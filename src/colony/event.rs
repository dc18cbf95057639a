use std::time::Duration;

use rand::{Rng, RngCore};
use serde::Serialize;

use crate::blueprint::model::EventRule;
use crate::colony::ledger::ResourceLedger;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveEvent {
    pub text: String,
    #[serde(skip)]
    pub remaining: Duration,
}

/// Random colony events: every interval, while no event is running, one may
/// start and hit a resource.
#[derive(Debug, Clone)]
pub struct EventDeck {
    rule: EventRule,
    timer: Duration,
    active: Option<ActiveEvent>,
}

impl EventDeck {
    pub fn new(rule: EventRule) -> Self {
        Self {
            rule,
            timer: Duration::ZERO,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&ActiveEvent> {
        self.active.as_ref()
    }

    /// Returns the event that started during this update, if any.
    pub fn update(
        &mut self,
        dt: Duration,
        ledger: &mut ResourceLedger,
        rng: &mut dyn RngCore,
    ) -> Option<ActiveEvent> {
        if !self.rule.enabled {
            return None;
        }

        self.timer += dt;

        if let Some(event) = &mut self.active {
            event.remaining = event.remaining.saturating_sub(dt);
            if event.remaining.is_zero() {
                tracing::debug!("Event over: {}", event.text);
                self.active = None;
            }
            return None;
        }

        if self.timer < Duration::from_millis(self.rule.interval_ms) {
            return None;
        }
        self.timer = Duration::ZERO;
        if self.rule.table.is_empty() || !rng.random_bool(self.rule.chance) {
            return None;
        }
        Some(self.start(ledger, rng))
    }

    fn start(&mut self, ledger: &mut ResourceLedger, rng: &mut dyn RngCore) -> ActiveEvent {
        let spec = &self.rule.table[rng.random_range(0..self.rule.table.len())];
        let resource = spec.resource.as_str();
        ledger.set(resource, (ledger.get(resource) + spec.delta).max(0.0));
        tracing::info!("Event started: {}", spec.text);

        let event = ActiveEvent {
            text: spec.text.clone(),
            remaining: Duration::from_millis(self.rule.duration_ms),
        };
        self.active = Some(event.clone());
        event
    }

    pub fn reset(&mut self) {
        self.timer = Duration::ZERO;
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::model::EventSpec;
    use crate::colony::ledger::ResourceId;
    use rand::{SeedableRng, rngs::StdRng};

    fn rule(chance: f64) -> EventRule {
        EventRule {
            enabled: true,
            chance,
            table: vec![EventSpec {
                text: "Equipment failure".to_string(),
                resource: ResourceId::from("materials"),
                delta: -5.0,
            }],
            ..EventRule::default()
        }
    }

    #[test]
    fn test_disabled_deck_does_nothing() {
        let mut deck = EventDeck::new(EventRule::default());
        let mut ledger = ResourceLedger::new();
        let mut rng = StdRng::seed_from_u64(7);

        assert!(deck.update(Duration::from_secs(60), &mut ledger, &mut rng).is_none());
        assert!(deck.active().is_none());
    }

    #[test]
    fn test_certain_event_hits_and_floors_resource() {
        let mut deck = EventDeck::new(rule(1.0));
        let mut ledger = ResourceLedger::new();
        ledger.set("materials", 3.0);
        let mut rng = StdRng::seed_from_u64(7);

        assert!(deck.update(Duration::from_secs(19), &mut ledger, &mut rng).is_none());
        let started = deck.update(Duration::from_secs(1), &mut ledger, &mut rng);

        assert_eq!(started.unwrap().text, "Equipment failure");
        assert_eq!(ledger.get("materials"), 0.0);
        assert!(deck.active().is_some());
    }

    #[test]
    fn test_event_expires() {
        let mut deck = EventDeck::new(rule(1.0));
        let mut ledger = ResourceLedger::new();
        let mut rng = StdRng::seed_from_u64(7);

        deck.update(Duration::from_secs(20), &mut ledger, &mut rng);
        deck.update(Duration::from_secs(5), &mut ledger, &mut rng);
        assert!(deck.active().is_some());
        deck.update(Duration::from_secs(1), &mut ledger, &mut rng);
        assert!(deck.active().is_none());
    }

    #[test]
    fn test_impossible_event_never_starts() {
        let mut deck = EventDeck::new(rule(0.0));
        let mut ledger = ResourceLedger::new();
        ledger.set("materials", 3.0);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..10 {
            deck.update(Duration::from_secs(20), &mut ledger, &mut rng);
        }
        assert_eq!(ledger.get("materials"), 3.0);
    }
}
