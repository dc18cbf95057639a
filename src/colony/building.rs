use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::blueprint::Catalog;
use crate::colony::ledger::{Amounts, ResourceLedger, scaled};

/// How long a freshly placed building plays its spawn animation.
pub const SPAWN_ANIMATION: Duration = Duration::from_millis(300);

/// A building placed on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub kind: String,
    pub x: i32,
    pub y: i32,
    pub level: u32,
    pub spawn_timer: Duration,
}

impl Building {
    pub fn new(kind: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            kind: kind.into(),
            x,
            y,
            level: 1,
            spawn_timer: SPAWN_ANIMATION,
        }
    }

    pub fn occupies(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }

    pub fn record(&self) -> BuildingRecord {
        BuildingRecord {
            kind: self.kind.clone(),
            x: self.x,
            y: self.y,
            level: self.level,
        }
    }
}

/// Persisted form of a [`Building`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(alias = "grid_x", default)]
    pub x: i32,
    #[serde(alias = "grid_y", default)]
    pub y: i32,
    #[serde(default = "first_level")]
    pub level: u32,
}

fn first_level() -> u32 {
    1
}

/// Production of a building at its current and next level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductionPreview {
    pub current: Amounts,
    pub next: Amounts,
    pub gain: Amounts,
    pub max_level: u32,
}

/// Result of one settlement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settlement {
    pub worked: usize,
    pub stalled: usize,
}

/// `multiplier^(level-1)`, pinned to 1.0 at level 1 whatever the multiplier.
pub fn level_factor(multiplier: f64, level: u32) -> f64 {
    if level <= 1 {
        1.0
    } else {
        multiplier.powi(exponent(level - 1))
    }
}

fn exponent(power: u32) -> i32 {
    i32::try_from(power).unwrap_or(i32::MAX)
}

#[derive(Debug, Clone)]
pub struct BuildingManager {
    catalog: Arc<Catalog>,
    buildings: Vec<Building>,
}

impl BuildingManager {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            buildings: Vec::new(),
        }
    }

    pub fn can_place(&self, x: i32, y: i32, cols: i32, rows: i32) -> bool {
        if x < 0 || y < 0 || x >= cols || y >= rows {
            return false;
        }
        !self.buildings.iter().any(|b| b.occupies(x, y))
    }

    /// Append a level 1 building. Placement legality is the caller's check.
    pub fn place(&mut self, x: i32, y: i32, kind: &str) -> &Building {
        tracing::debug!("Placing {} at ({}, {})", kind, x, y);
        let index = self.buildings.len();
        self.buildings.push(Building::new(kind, x, y));
        &self.buildings[index]
    }

    pub fn building_at(&self, x: i32, y: i32) -> Option<&Building> {
        self.buildings.iter().find(|b| b.occupies(x, y))
    }

    pub fn building_at_mut(&mut self, x: i32, y: i32) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| b.occupies(x, y))
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.buildings.iter().any(|b| b.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// `floor(base * growth^(level-1))` for every entry of the shared
    /// upgrade table.
    pub fn upgrade_cost(&self, building: &Building) -> Amounts {
        let table = self.catalog.upgrade_table();
        let factor = level_factor(table.cost_growth, building.level);
        table
            .base_cost
            .iter()
            .map(|(id, base)| (id.clone(), (base * factor).floor()))
            .collect()
    }

    /// Raise the level by one. Neither affordability nor the max level is
    /// checked here.
    pub fn upgrade(building: &mut Building) {
        building.level = building.level.saturating_add(1);
        tracing::debug!(
            "Building {} at ({}, {}) is now level {}",
            building.kind,
            building.x,
            building.y,
            building.level
        );
    }

    pub fn max_level(&self, building: &Building) -> u32 {
        self.catalog
            .definition_for(&building.kind)
            .map(|definition| definition.max_level)
            .unwrap_or(1)
    }

    pub fn production_preview(&self, building: &Building) -> ProductionPreview {
        let Ok(definition) = self.catalog.definition_for(&building.kind) else {
            return ProductionPreview {
                max_level: 1,
                ..ProductionPreview::default()
            };
        };

        let multiplier = definition.level_multiplier;
        let current = scaled(&definition.production, level_factor(multiplier, building.level));
        let next = scaled(
            &definition.production,
            level_factor(multiplier, building.level.saturating_add(1)),
        );
        let gain = next
            .iter()
            .map(|(id, value)| (id.clone(), value - current.get(id).copied().unwrap_or(0.0)))
            .collect();

        ProductionPreview {
            current,
            next,
            gain,
            max_level: definition.max_level,
        }
    }

    /// Run every building's consumption and production once, in placement
    /// order. A building that cannot pay its consumption does nothing.
    pub fn settle_tick(&self, ledger: &mut ResourceLedger) -> Settlement {
        let mut settlement = Settlement::default();

        for building in &self.buildings {
            let Ok(definition) = self.catalog.definition_for(&building.kind) else {
                tracing::debug!("Skipping building of unknown type {}", building.kind);
                continue;
            };

            let factor = level_factor(definition.level_multiplier, building.level);
            let consumption = scaled(&definition.consumption, factor);
            if !ledger.pay(&consumption) {
                settlement.stalled += 1;
                continue;
            }

            ledger.add_many(&scaled(&definition.production, factor));
            settlement.worked += 1;
        }

        settlement
    }

    pub fn update_animations(&mut self, dt: Duration) {
        for building in &mut self.buildings {
            building.spawn_timer = building.spawn_timer.saturating_sub(dt);
        }
    }

    pub fn records(&self) -> Vec<BuildingRecord> {
        self.buildings.iter().map(Building::record).collect()
    }

    /// Replace every building with `records`. Records of a type the catalog
    /// does not know, or that land on an already occupied cell, are dropped.
    pub fn load_records(&mut self, records: Vec<BuildingRecord>) {
        self.buildings.clear();
        for record in records {
            if !self.catalog.contains(&record.kind) {
                tracing::warn!(
                    "Dropping saved building of unknown type {:?} at ({}, {})",
                    record.kind,
                    record.x,
                    record.y
                );
                continue;
            }
            if self.buildings.iter().any(|b| b.occupies(record.x, record.y)) {
                tracing::warn!(
                    "Dropping saved {} at ({}, {}): cell already occupied",
                    record.kind,
                    record.x,
                    record.y
                );
                continue;
            }
            self.buildings.push(Building {
                kind: record.kind,
                x: record.x,
                y: record.y,
                level: record.level.max(1),
                spawn_timer: Duration::ZERO,
            });
        }
    }

    pub fn clear(&mut self) {
        self.buildings.clear();
    }
}
