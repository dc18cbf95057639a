use std::collections::VecDeque;

use serde::Serialize;

use crate::blueprint::model::{GoalSpec, QuestSpec};
use crate::colony::building::BuildingManager;
use crate::colony::ledger::ResourceLedger;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quest {
    pub id: String,
    pub text: String,
    #[serde(skip)]
    goal: GoalSpec,
}

impl Quest {
    fn is_met(&self, ledger: &ResourceLedger, buildings: &BuildingManager) -> bool {
        match &self.goal {
            GoalSpec::ResourceAtLeast { resource, amount } => {
                ledger.get(resource.as_str()) >= *amount
            }
            GoalSpec::BuildingExists { building } => buildings.has_kind(building),
        }
    }
}

/// Quests run one at a time, in the order the balance lists them.
#[derive(Debug, Clone, Default)]
pub struct QuestLog {
    active: Option<Quest>,
    queue: VecDeque<Quest>,
    completed: Vec<String>,
}

impl QuestLog {
    pub fn new(specs: &[QuestSpec]) -> Self {
        let mut queue: VecDeque<Quest> = specs
            .iter()
            .map(|spec| Quest {
                id: spec.id.clone(),
                text: spec.text.clone(),
                goal: spec.goal.clone(),
            })
            .collect();
        let active = queue.pop_front();
        Self {
            active,
            queue,
            completed: Vec::new(),
        }
    }

    pub fn active(&self) -> Option<&Quest> {
        self.active.as_ref()
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    /// Complete the active quest when its goal holds. At most one quest
    /// completes per call.
    pub fn update(&mut self, ledger: &ResourceLedger, buildings: &BuildingManager) -> Option<Quest> {
        let met = self
            .active
            .as_ref()
            .is_some_and(|quest| quest.is_met(ledger, buildings));
        if !met {
            return None;
        }

        let done = self.active.take()?;
        tracing::info!("Quest {} complete", done.id);
        self.completed.push(done.id.clone());
        self.active = self.queue.pop_front();
        Some(done)
    }
}
