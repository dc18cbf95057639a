use std::{borrow::Borrow, collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

pub const MATERIALS: &str = "materials";
pub const FOOD: &str = "food";
pub const WATER: &str = "water";
pub const POPULATION: &str = "population";

/// Key of a resource in the ledger, e.g. `materials` or `energy`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resource → quantity mapping: costs, production and consumption rates.
pub type Amounts = BTreeMap<ResourceId, f64>;

/// Build an [`Amounts`] from literal pairs.
pub fn amounts<const N: usize>(pairs: [(&str, f64); N]) -> Amounts {
    pairs
        .into_iter()
        .map(|(id, value)| (ResourceId::from(id), value))
        .collect()
}

/// Scale every component of `base` by `factor`.
pub fn scaled(base: &Amounts, factor: f64) -> Amounts {
    base.iter()
        .map(|(id, value)| (id.clone(), value * factor))
        .collect()
}

/// Authoritative store of the colony's current resource quantities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceLedger {
    values: BTreeMap<ResourceId, f64>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Missing resources read as zero.
    pub fn get(&self, id: &str) -> f64 {
        self.values.get(id).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, id: &str, amount: f64) {
        match self.values.get_mut(id) {
            Some(value) => *value = amount,
            None => {
                self.values.insert(ResourceId::from(id), amount);
            }
        }
    }

    pub fn add(&mut self, id: &str, delta: f64) {
        match self.values.get_mut(id) {
            Some(value) => *value += delta,
            None => {
                self.values.insert(ResourceId::from(id), delta);
            }
        }
    }

    pub fn add_many(&mut self, changes: &Amounts) {
        for (id, delta) in changes {
            self.add(id.as_str(), *delta);
        }
    }

    pub fn can_afford(&self, cost: &Amounts) -> bool {
        cost.iter()
            .all(|(id, needed)| self.get(id.as_str()) >= *needed)
    }

    /// Debit every entry of `cost`, or nothing at all when any entry is
    /// short. Returns whether the payment happened.
    pub fn pay(&mut self, cost: &Amounts) -> bool {
        if !self.can_afford(cost) {
            tracing::trace!("Insufficient resources for cost: {:?}", cost);
            return false;
        }

        for (id, needed) in cost {
            self.add(id.as_str(), -needed);
        }
        true
    }

    /// Overwrite the stored values with `values`, key by key. Keys not
    /// present in `values` keep what they had.
    pub fn overwrite(&mut self, values: &BTreeMap<String, f64>) {
        for (id, value) in values {
            self.set(id, *value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, f64)> {
        self.values.iter().map(|(id, value)| (id, *value))
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.values
            .iter()
            .map(|(id, value)| (id.to_string(), *value))
            .collect()
    }
}
