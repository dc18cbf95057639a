use std::{collections::HashMap, path::Path};

use crate::blueprint::model::{
    Balance, BuildingDefinition, ClickRule, EventRule, QuestSpec, ResourceSpec, UpgradeTable,
    UpkeepRule,
};
use crate::colony::ledger::{MATERIALS, ResourceLedger};
use crate::error::Error;

/// Immutable building and resource definitions, loaded once at startup and
/// shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    resources: Vec<ResourceSpec>,
    buildings: Vec<BuildingDefinition>,
    index: HashMap<String, usize>,
    upgrade: UpgradeTable,
    click: ClickRule,
    upkeep: UpkeepRule,
    events: EventRule,
    quests: Vec<QuestSpec>,
}

impl Catalog {
    /// Read the balance file at `path`. A missing, unreadable or invalid
    /// file yields the default (empty) catalog.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("No balance file at {}: {}, using defaults", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json_str(&text) {
            Ok(catalog) => {
                tracing::info!(
                    "Loaded balance from {}: {} resources, {} buildings",
                    path.display(),
                    catalog.resources.len(),
                    catalog.buildings.len()
                );
                catalog
            }
            Err(e) => {
                tracing::warn!("Failed to read balance {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, Error> {
        let balance: Balance = serde_json::from_str(text)?;
        Self::from_balance(balance)
    }

    pub fn from_balance(balance: Balance) -> Result<Self, Error> {
        let mut index = HashMap::new();
        let mut buildings = Vec::with_capacity(balance.buildings.len());

        for (position, (id, mut definition)) in balance.buildings.into_iter().enumerate() {
            if index.insert(id.clone(), position).is_some() {
                return Err(Error::Config {
                    message: format!("building {id} is defined twice"),
                });
            }
            definition.id = id;
            buildings.push(definition);
        }

        let catalog = Self {
            resources: balance.resources,
            buildings,
            index,
            upgrade: balance.upgrade,
            click: balance.click,
            upkeep: balance.upkeep,
            events: balance.events,
            quests: balance.quests,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), Error> {
        let factor_ok = |value: f64| value.is_finite() && value >= 0.0;

        for definition in &self.buildings {
            for required in &definition.unlock.requires {
                if !self.index.contains_key(required) {
                    return Err(Error::Config {
                        message: format!(
                            "building {} requires unknown building {}",
                            definition.id, required
                        ),
                    });
                }
            }
            if !factor_ok(definition.price_growth) || !factor_ok(definition.level_multiplier) {
                return Err(Error::Config {
                    message: format!("building {} has an invalid growth factor", definition.id),
                });
            }

            let referenced = definition
                .base_price
                .keys()
                .chain(definition.production.keys())
                .chain(definition.consumption.keys());
            for id in referenced {
                if !self.declares(id.as_str()) {
                    tracing::warn!(
                        "Building {} references undeclared resource {}",
                        definition.id,
                        id
                    );
                }
            }
        }

        if !factor_ok(self.upgrade.cost_growth) {
            return Err(Error::Config {
                message: "upgrade cost_growth must be a non-negative number".to_string(),
            });
        }
        if self.upkeep.interval_ms == 0 {
            return Err(Error::Config {
                message: "upkeep interval_ms must be positive".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.events.chance) {
            return Err(Error::Config {
                message: "events chance must be within 0..=1".to_string(),
            });
        }

        Ok(())
    }

    fn declares(&self, id: &str) -> bool {
        self.resources.iter().any(|spec| spec.id.as_str() == id)
    }

    pub fn definition_for(&self, type_id: &str) -> Result<&BuildingDefinition, Error> {
        self.index
            .get(type_id)
            .map(|position| &self.buildings[*position])
            .ok_or_else(|| Error::NotFound {
                kind: "building",
                id: type_id.to_string(),
            })
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    /// Building type ids in configuration order.
    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.buildings.iter().map(|definition| definition.id.as_str())
    }

    pub fn definitions(&self) -> &[BuildingDefinition] {
        &self.buildings
    }

    pub fn resources(&self) -> &[ResourceSpec] {
        &self.resources
    }

    /// Resource ids shown to the player, in display order.
    pub fn visible_resources(&self) -> impl Iterator<Item = &str> {
        self.resources
            .iter()
            .filter(|spec| spec.visible)
            .map(|spec| spec.id.as_str())
    }

    /// A fresh ledger holding every declared resource at its initial value.
    pub fn initial_ledger(&self) -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        for spec in &self.resources {
            ledger.set(spec.id.as_str(), spec.initial);
        }
        if !self.declares(MATERIALS) {
            ledger.set(MATERIALS, 0.0);
        }
        ledger
    }

    pub fn upgrade_table(&self) -> &UpgradeTable {
        &self.upgrade
    }

    pub fn click_gain(&self) -> f64 {
        self.click.materials_gain
    }

    pub fn upkeep(&self) -> &UpkeepRule {
        &self.upkeep
    }

    pub fn events(&self) -> &EventRule {
        &self.events
    }

    pub fn quests(&self) -> &[QuestSpec] {
        &self.quests
    }
}
