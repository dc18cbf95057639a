use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;

use crate::blueprint::Catalog;
use crate::colony::building::BuildingManager;
use crate::colony::ledger::{Amounts, MATERIALS, ResourceLedger};
use crate::error::Error;

/// A bought building waiting for the player to pick its cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingPurchase {
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopItem {
    pub kind: String,
    pub name: String,
    pub price: Amounts,
}

/// Purchase prices per building type. Each purchase raises that type's
/// price by its growth factor.
#[derive(Debug, Clone)]
pub struct Shop {
    catalog: Arc<Catalog>,
    items: Vec<ShopItem>,
}

impl Shop {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let items = Self::base_items(&catalog);
        Self { catalog, items }
    }

    fn base_items(catalog: &Catalog) -> Vec<ShopItem> {
        catalog
            .definitions()
            .iter()
            .map(|definition| ShopItem {
                kind: definition.id.clone(),
                name: definition.name.clone(),
                price: definition.base_price.clone(),
            })
            .collect()
    }

    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }

    pub fn price(&self, kind: &str) -> Option<&Amounts> {
        self.item(kind).map(|item| &item.price)
    }

    fn item(&self, kind: &str) -> Option<&ShopItem> {
        self.items.iter().find(|item| item.kind == kind)
    }

    /// Check the unlock rule and the current price, pay, then raise the
    /// price. Nothing changes when any check fails.
    pub fn buy(
        &mut self,
        kind: &str,
        ledger: &mut ResourceLedger,
        buildings: &BuildingManager,
    ) -> Result<PendingPurchase, Error> {
        let definition = self.catalog.definition_for(kind)?;

        let min_materials = definition.unlock.min_materials;
        if ledger.get(MATERIALS) < min_materials {
            return Err(Error::UnlockNotMet {
                reason: format!("needs at least {min_materials} materials"),
            });
        }

        let requires = &definition.unlock.requires;
        if requires.iter().any(|required| !buildings.has_kind(required)) {
            return Err(Error::UnlockNotMet {
                reason: format!("build first: {}", requires.join(", ")),
            });
        }

        let growth = definition.price_growth;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.kind == kind)
            .ok_or_else(|| Error::NotFound {
                kind: "shop item",
                id: kind.to_string(),
            })?;

        if !ledger.pay(&item.price) {
            return Err(Error::InsufficientResources {
                needed: item.price.clone(),
            });
        }

        for value in item.price.values_mut() {
            *value = (*value * growth).floor();
        }
        tracing::info!("Bought {}, next price {:?}", kind, item.price);

        Ok(PendingPurchase {
            kind: kind.to_string(),
        })
    }

    /// Current prices keyed by building type, for the save file.
    pub fn prices(&self) -> BTreeMap<String, Amounts> {
        self.items
            .iter()
            .map(|item| (item.kind.clone(), item.price.clone()))
            .collect()
    }

    /// Restore saved prices. Types missing from `prices` keep their price.
    pub fn restore_prices(&mut self, prices: &BTreeMap<String, Amounts>) {
        for item in &mut self.items {
            if let Some(price) = prices.get(&item.kind) {
                item.price = price.clone();
            }
        }
    }

    pub fn reset(&mut self) {
        self.items = Self::base_items(&self.catalog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::catalog::tests::test_catalog;
    use crate::colony::ledger::amounts;
    use proptest::prelude::*;

    fn setup() -> (Shop, ResourceLedger, BuildingManager) {
        let catalog = Arc::new(test_catalog());
        (
            Shop::new(catalog.clone()),
            catalog.initial_ledger(),
            BuildingManager::new(catalog),
        )
    }

    #[test]
    fn test_items_start_at_base_price() {
        let (shop, _, _) = setup();
        assert_eq!(shop.items().len(), 2);
        assert_eq!(shop.price("solar_panel"), Some(&amounts([("materials", 5.0)])));
    }

    #[test]
    fn test_buy_below_min_materials() {
        let (mut shop, mut ledger, buildings) = setup();
        ledger.set("materials", 1.0);
        let before = ledger.clone();

        let result = shop.buy("solar_panel", &mut ledger, &buildings);

        assert!(matches!(result, Err(Error::UnlockNotMet { .. })));
        assert_eq!(ledger, before);
        assert_eq!(shop.price("solar_panel"), Some(&amounts([("materials", 5.0)])));
    }

    #[test]
    fn test_buy_missing_prerequisite() {
        let (mut shop, mut ledger, buildings) = setup();
        ledger.set("materials", 100.0);
        ledger.set("energy", 100.0);

        let result = shop.buy("greenhouse", &mut ledger, &buildings);
        assert!(matches!(result, Err(Error::UnlockNotMet { .. })));
    }

    #[test]
    fn test_buy_insufficient_resources() {
        let (mut shop, mut ledger, mut buildings) = setup();
        buildings.place(0, 0, "solar_panel");
        ledger.set("materials", 100.0);
        ledger.set("energy", 1.0);
        let before = ledger.clone();

        let result = shop.buy("greenhouse", &mut ledger, &buildings);

        assert!(matches!(result, Err(Error::InsufficientResources { .. })));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_buy_pays_and_grows_price() {
        let (mut shop, mut ledger, buildings) = setup();
        ledger.set("materials", 12.0);

        let pending = shop.buy("solar_panel", &mut ledger, &buildings).unwrap();

        assert_eq!(pending.kind, "solar_panel");
        assert_eq!(ledger.get("materials"), 7.0);
        assert_eq!(shop.price("solar_panel"), Some(&amounts([("materials", 7.0)])));
    }

    #[test]
    fn test_buy_unknown_type() {
        let (mut shop, mut ledger, buildings) = setup();
        let result = shop.buy("castle", &mut ledger, &buildings);
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_reset_and_restore_prices() {
        let (mut shop, mut ledger, buildings) = setup();
        ledger.set("materials", 100.0);
        shop.buy("solar_panel", &mut ledger, &buildings).unwrap();
        let saved = shop.prices();

        shop.reset();
        assert_eq!(shop.price("solar_panel"), Some(&amounts([("materials", 5.0)])));

        shop.restore_prices(&saved);
        assert_eq!(shop.price("solar_panel"), Some(&amounts([("materials", 7.0)])));
    }

    proptest! {
        #[test]
        fn prop_price_after_n_purchases(purchases in 0usize..12) {
            let (mut shop, mut ledger, buildings) = setup();
            ledger.set("materials", 1.0e9);

            for _ in 0..purchases {
                shop.buy("solar_panel", &mut ledger, &buildings).unwrap();
            }

            let mut expected = 5.0f64;
            for _ in 0..purchases {
                expected = (expected * 1.5).floor();
            }
            prop_assert_eq!(shop.price("solar_panel").unwrap()["materials"], expected);
        }
    }
}
