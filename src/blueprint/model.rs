use serde::{Deserialize, Serialize};

use crate::colony::ledger::{Amounts, ResourceId};

/// The balance document: every number that drives the colony economy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
    #[serde(default, with = "ordered")]
    pub buildings: Vec<(String, BuildingDefinition)>,
    #[serde(default)]
    pub upgrade: UpgradeTable,
    #[serde(default)]
    pub click: ClickRule,
    #[serde(default)]
    pub upkeep: UpkeepRule,
    #[serde(default)]
    pub events: EventRule,
    #[serde(default)]
    pub quests: Vec<QuestSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub id: ResourceId,
    #[serde(default)]
    pub initial: f64,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingDefinition {
    /// Filled in from the key of the `buildings` object.
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub base_price: Amounts,
    #[serde(default = "default_factor")]
    pub price_growth: f64,
    #[serde(default)]
    pub production: Amounts,
    #[serde(default)]
    pub consumption: Amounts,
    #[serde(default = "default_factor")]
    pub level_multiplier: f64,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    #[serde(default)]
    pub unlock: UnlockRule,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnlockRule {
    #[serde(default)]
    pub min_materials: f64,
    #[serde(default)]
    pub requires: Vec<String>,
}

/// Catalog-wide upgrade economics, shared by every building type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeTable {
    #[serde(default)]
    pub base_cost: Amounts,
    #[serde(default = "default_factor")]
    pub cost_growth: f64,
}

impl Default for UpgradeTable {
    fn default() -> Self {
        Self {
            base_cost: Amounts::new(),
            cost_growth: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRule {
    #[serde(default = "default_factor")]
    pub materials_gain: f64,
}

impl Default for ClickRule {
    fn default() -> Self {
        Self { materials_gain: 1.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpkeepRule {
    #[serde(default = "default_upkeep_interval")]
    pub interval_ms: u64,
    #[serde(default = "default_per_capita")]
    pub food_per_capita: f64,
    #[serde(default = "default_per_capita")]
    pub water_per_capita: f64,
}

impl Default for UpkeepRule {
    fn default() -> Self {
        Self {
            interval_ms: default_upkeep_interval(),
            food_per_capita: default_per_capita(),
            water_per_capita: default_per_capita(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRule {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_event_interval")]
    pub interval_ms: u64,
    #[serde(default = "default_event_chance")]
    pub chance: f64,
    #[serde(default = "default_event_duration")]
    pub duration_ms: u64,
    #[serde(default = "default_event_table")]
    pub table: Vec<EventSpec>,
}

impl Default for EventRule {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_event_interval(),
            chance: default_event_chance(),
            duration_ms: default_event_duration(),
            table: default_event_table(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSpec {
    pub text: String,
    #[serde(default = "default_event_resource")]
    pub resource: ResourceId,
    pub delta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestSpec {
    pub id: String,
    pub text: String,
    pub goal: GoalSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalSpec {
    ResourceAtLeast { resource: ResourceId, amount: f64 },
    BuildingExists { building: String },
}

fn default_true() -> bool {
    true
}

fn default_factor() -> f64 {
    1.0
}

fn default_max_level() -> u32 {
    5
}

fn default_upkeep_interval() -> u64 {
    5000
}

fn default_per_capita() -> f64 {
    0.5
}

fn default_event_interval() -> u64 {
    20_000
}

fn default_event_chance() -> f64 {
    0.25
}

fn default_event_duration() -> u64 {
    6000
}

fn default_event_resource() -> ResourceId {
    ResourceId::from("materials")
}

fn default_event_table() -> Vec<EventSpec> {
    [
        ("Sandstorm! Production is down.", -0.5),
        ("Equipment failure! Materials lost.", -5.0),
        ("Solar flare! Energy is unstable.", -3.0),
    ]
    .into_iter()
    .map(|(text, delta)| EventSpec {
        text: text.to_string(),
        resource: default_event_resource(),
        delta,
    })
    .collect()
}

/// A JSON object kept in document order: the shop lists buildings the way
/// the balance file declares them.
mod ordered {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::BuildingDefinition;

    pub fn serialize<S>(
        entries: &[(String, BuildingDefinition)],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (id, definition) in entries {
            map.serialize_entry(id, definition)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, BuildingDefinition)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = Vec<(String, BuildingDefinition)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of building definitions")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, mut definition)) =
                    access.next_entry::<String, BuildingDefinition>()?
                {
                    definition.id = id.clone();
                    entries.push((id, definition));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
