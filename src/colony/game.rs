use std::{sync::Arc, time::Duration};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::blueprint::Catalog;
use crate::colony::building::{Building, BuildingManager, ProductionPreview, Settlement};
use crate::colony::clock::{PopulationClock, Upkeep};
use crate::colony::event::{ActiveEvent, EventDeck};
use crate::colony::grid::Grid;
use crate::colony::ledger::{Amounts, MATERIALS, ResourceLedger};
use crate::colony::notice::{Notice, NoticeKind, Notices};
use crate::colony::quest::{Quest, QuestLog};
use crate::colony::save::{SaveData, SaveStore, SavedFlags};
use crate::colony::shop::{PendingPurchase, Shop};
use crate::colony::state::{GameState, Phase};
use crate::error::Error;

/// Materials at which the opening hint is retired.
const FIRST_GOAL_MATERIALS: f64 = 5.0;

/// Something the player asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Intent {
    /// A click on the field, in screen coordinates.
    Click { px: i32, py: i32 },
    Gather,
    Place { x: i32, y: i32 },
    Buy { building: String },
    Upgrade { x: i32, y: i32 },
    Reset,
    Save,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Gathered { amount: f64, materials: f64 },
    Selected(BuildingView),
    Placed { kind: String, x: i32, y: i32 },
    Bought { kind: String, next_price: Amounts },
    Upgraded { x: i32, y: i32, level: u32 },
    Reset,
    Saved,
    Ignored,
    Snapshot(Box<Snapshot>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceView {
    pub id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingView {
    pub kind: String,
    pub x: i32,
    pub y: i32,
    pub level: u32,
    pub spawn_ms: u64,
    pub upgrade_cost: Amounts,
    pub production: ProductionPreview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopView {
    pub kind: String,
    pub name: String,
    pub price: Amounts,
    pub affordable: bool,
}

/// Read-only picture of the colony for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub first_goal: bool,
    pub show_hint: bool,
    pub cols: i32,
    pub rows: i32,
    pub resources: Vec<ResourceView>,
    pub buildings: Vec<BuildingView>,
    pub shop: Vec<ShopView>,
    pub pending: Option<PendingPurchase>,
    pub notices: Vec<Notice>,
    pub quest: Option<Quest>,
    pub event: Option<ActiveEvent>,
}

/// The whole simulation. Owns every piece of mutable colony state and is
/// the only place intents are applied.
#[derive(Debug)]
pub struct Game {
    catalog: Arc<Catalog>,
    grid: Grid,
    store: Option<SaveStore>,
    state: GameState,
    ledger: ResourceLedger,
    buildings: BuildingManager,
    shop: Shop,
    pending: Option<PendingPurchase>,
    clock: PopulationClock,
    quests: QuestLog,
    notices: Notices,
    events: EventDeck,
    rng: StdRng,
}

impl Game {
    pub fn new(catalog: Arc<Catalog>, grid: Grid) -> Self {
        Self::with_rng(catalog, grid, StdRng::from_os_rng())
    }

    pub fn with_seed(catalog: Arc<Catalog>, grid: Grid, seed: u64) -> Self {
        Self::with_rng(catalog, grid, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Arc<Catalog>, grid: Grid, rng: StdRng) -> Self {
        Self {
            grid,
            store: None,
            state: GameState::default(),
            ledger: catalog.initial_ledger(),
            buildings: BuildingManager::new(catalog.clone()),
            shop: Shop::new(catalog.clone()),
            pending: None,
            clock: PopulationClock::new(catalog.upkeep().clone()),
            quests: QuestLog::new(catalog.quests()),
            notices: Notices::default(),
            events: EventDeck::new(catalog.events().clone()),
            rng,
            catalog,
        }
    }

    /// Attach a save file, used by `Save`, `Reset` and [`Game::load`].
    pub fn with_store(mut self, store: SaveStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn buildings(&self) -> &BuildingManager {
        &self.buildings
    }

    pub fn shop(&self) -> &Shop {
        &self.shop
    }

    pub fn pending(&self) -> Option<&PendingPurchase> {
        self.pending.as_ref()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn apply(&mut self, intent: Intent) -> Result<Outcome, Error> {
        tracing::debug!("Applying intent {:?}", intent);
        match intent {
            Intent::Reset => {
                self.reset();
                Ok(Outcome::Reset)
            }
            Intent::Save => {
                self.save()?;
                Ok(Outcome::Saved)
            }
            Intent::Snapshot => Ok(Outcome::Snapshot(Box::new(self.snapshot()))),
            _ if !self.state.is_playing() => Err(Error::GameOver),
            Intent::Click { px, py } => Ok(self.click(px, py)),
            Intent::Gather => Ok(self.gather()),
            Intent::Place { x, y } => self.place(x, y),
            Intent::Buy { building } => self.buy(&building),
            Intent::Upgrade { x, y } => self.upgrade(x, y),
        }
    }

    /// A field click selects the building under it, places the pending
    /// purchase, or gathers materials, in that order.
    fn click(&mut self, px: i32, py: i32) -> Outcome {
        if !self.grid.in_field(px) {
            return Outcome::Ignored;
        }

        let cell = self.grid.cell_at(px, py);
        if let Some(building) = self.buildings.building_at(cell.x, cell.y) {
            return Outcome::Selected(self.view(building));
        }

        let placeable = self.pending.is_some()
            && self
                .buildings
                .can_place(cell.x, cell.y, self.grid.cols(), self.grid.rows());
        if placeable {
            if let Some(pending) = self.pending.take() {
                return self.place_pending(pending, cell.x, cell.y);
            }
        }

        self.gather()
    }

    fn gather(&mut self) -> Outcome {
        let amount = self.catalog.click_gain();
        self.ledger.add(MATERIALS, amount);

        let materials = self.ledger.get(MATERIALS);
        if self.state.first_goal && materials >= FIRST_GOAL_MATERIALS {
            self.state.first_goal = false;
            self.state.show_hint = false;
            self.notices.push(NoticeKind::FirstMaterials);
        }

        Outcome::Gathered { amount, materials }
    }

    fn place(&mut self, x: i32, y: i32) -> Result<Outcome, Error> {
        if self.pending.is_none() {
            return Err(Error::NothingPending);
        }
        if !self
            .buildings
            .can_place(x, y, self.grid.cols(), self.grid.rows())
        {
            self.notices.push(NoticeKind::InvalidPlacement { x, y });
            return Err(Error::InvalidPlacement { x, y });
        }

        let pending = self.pending.take().ok_or(Error::NothingPending)?;
        Ok(self.place_pending(pending, x, y))
    }

    fn place_pending(&mut self, pending: PendingPurchase, x: i32, y: i32) -> Outcome {
        let placed = self.buildings.place(x, y, &pending.kind);
        tracing::info!("Placed {} at ({}, {})", placed.kind, x, y);
        Outcome::Placed {
            kind: pending.kind,
            x,
            y,
        }
    }

    fn buy(&mut self, kind: &str) -> Result<Outcome, Error> {
        let purchase = self.shop.buy(kind, &mut self.ledger, &self.buildings);
        let pending = match purchase {
            Ok(pending) => pending,
            Err(e) => {
                match &e {
                    Error::UnlockNotMet { reason } => self.notices.push(NoticeKind::Locked {
                        reason: reason.clone(),
                    }),
                    Error::InsufficientResources { .. } => {
                        self.notices.push(NoticeKind::InsufficientResources)
                    }
                    _ => {}
                }
                return Err(e);
            }
        };

        let name = self.catalog.definition_for(kind)?.name.clone();
        if let Some(previous) = self.pending.replace(pending) {
            tracing::info!("Pending {} replaced by {}", previous.kind, kind);
            self.notices.push(NoticeKind::PendingReplaced {
                previous: previous.kind,
            });
        }
        self.notices.push(NoticeKind::PlaceBuilding { name });

        Ok(Outcome::Bought {
            kind: kind.to_string(),
            next_price: self.shop.price(kind).cloned().unwrap_or_default(),
        })
    }

    fn upgrade(&mut self, x: i32, y: i32) -> Result<Outcome, Error> {
        let (level, max_level, cost) = {
            let building = self
                .buildings
                .building_at(x, y)
                .ok_or_else(|| Error::NotFound {
                    kind: "building",
                    id: format!("({x}, {y})"),
                })?;
            (
                building.level,
                self.buildings.max_level(building),
                self.buildings.upgrade_cost(building),
            )
        };

        if level >= max_level {
            self.notices.push(NoticeKind::MaxLevel { level: max_level });
            return Err(Error::MaxLevel { level: max_level });
        }
        if !self.ledger.pay(&cost) {
            self.notices
                .push(NoticeKind::UpgradeUnaffordable { cost: cost.clone() });
            return Err(Error::InsufficientResources { needed: cost });
        }

        let building = self
            .buildings
            .building_at_mut(x, y)
            .ok_or_else(|| Error::NotFound {
                kind: "building",
                id: format!("({x}, {y})"),
            })?;
        BuildingManager::upgrade(building);
        let level = building.level;
        self.notices.push(NoticeKind::Upgraded { level });

        Ok(Outcome::Upgraded { x, y, level })
    }

    /// Advance the simulation by one frame. Does nothing once the colony is
    /// dead; returns the building settlement otherwise. Settlement still runs
    /// on the frame the last colonist dies.
    pub fn update(&mut self, dt: Duration) -> Option<Settlement> {
        if !self.state.is_playing() {
            return None;
        }

        if let Some(quest) = self.quests.update(&self.ledger, &self.buildings) {
            self.notices
                .push(NoticeKind::QuestComplete { text: quest.text });
        }
        self.notices.update(dt);
        self.buildings.update_animations(dt);

        if let Some(event) = self.events.update(dt, &mut self.ledger, &mut self.rng) {
            self.notices.push(NoticeKind::Event { text: event.text });
        }

        if self.clock.advance(dt) {
            match self.clock.upkeep(&mut self.ledger) {
                Upkeep::Fed => {}
                Upkeep::Starving { .. } => self.notices.push(NoticeKind::Starving),
                Upkeep::Extinct => {
                    self.notices.push(NoticeKind::Starving);
                    self.state.set_dead();
                }
            }
        }

        Some(self.buildings.settle_tick(&mut self.ledger))
    }

    fn view(&self, building: &Building) -> BuildingView {
        BuildingView {
            kind: building.kind.clone(),
            x: building.x,
            y: building.y,
            level: building.level,
            spawn_ms: u64::try_from(building.spawn_timer.as_millis()).unwrap_or(u64::MAX),
            upgrade_cost: self.buildings.upgrade_cost(building),
            production: self.buildings.production_preview(building),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.state.phase(),
            first_goal: self.state.first_goal,
            show_hint: self.state.show_hint,
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            resources: self
                .catalog
                .visible_resources()
                .map(|id| ResourceView {
                    id: id.to_string(),
                    amount: self.ledger.get(id),
                })
                .collect(),
            buildings: self.buildings.iter().map(|b| self.view(b)).collect(),
            shop: self
                .shop
                .items()
                .iter()
                .map(|item| ShopView {
                    kind: item.kind.clone(),
                    name: item.name.clone(),
                    price: item.price.clone(),
                    affordable: self.ledger.can_afford(&item.price),
                })
                .collect(),
            pending: self.pending.clone(),
            notices: self.notices.iter().cloned().collect(),
            quest: self.quests.active().cloned(),
            event: self.events.active().cloned(),
        }
    }

    pub fn to_save(&self) -> SaveData {
        SaveData {
            resources: self.ledger.to_map(),
            buildings: Some(self.buildings.records()),
            state: Some(SavedFlags {
                first_goal: self.state.first_goal,
                show_hint: self.state.show_hint,
            }),
            shop_prices: Some(self.shop.prices()),
        }
    }

    /// Overwrite the current state with `data`. Sections missing from the
    /// save keep their current values.
    pub fn restore(&mut self, data: SaveData) {
        self.ledger.overwrite(&data.resources);
        if let Some(records) = data.buildings {
            self.buildings.load_records(records);
        }
        if let Some(flags) = data.state {
            self.state.first_goal = flags.first_goal;
            self.state.show_hint = flags.show_hint;
        }
        if let Some(prices) = data.shop_prices {
            self.shop.restore_prices(&prices);
        }
    }

    /// Restore from the attached save file. Returns whether a save was found.
    pub fn load(&mut self) -> bool {
        let Some(data) = self.store.as_ref().and_then(SaveStore::load) else {
            return false;
        };
        self.restore(data);
        tracing::info!(
            "Game loaded: {} buildings, materials {}",
            self.buildings.len(),
            self.ledger.get(MATERIALS)
        );
        true
    }

    pub fn save(&self) -> Result<(), Error> {
        match &self.store {
            Some(store) => store.save(&self.to_save()),
            None => {
                tracing::debug!("No save store attached, skipping save");
                Ok(())
            }
        }
    }

    /// Rebuild every piece of colony state from the catalog and delete the
    /// save file.
    pub fn reset(&mut self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.reset() {
                tracing::error!("Failed to delete save: {}", e);
            }
        }

        self.state.reset();
        self.ledger = self.catalog.initial_ledger();
        self.buildings.clear();
        self.shop.reset();
        self.pending = None;
        self.clock.reset();
        self.quests = QuestLog::new(self.catalog.quests());
        self.notices.clear();
        self.events.reset();
        tracing::info!("Game reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::catalog::tests::test_catalog;
    use crate::colony::building::BuildingRecord;
    use crate::colony::ledger::POPULATION;

    const FRAME: Duration = Duration::from_millis(16);

    fn game() -> Game {
        Game::with_seed(Arc::new(test_catalog()), Grid::default(), 1)
    }

    fn gather(game: &mut Game, times: usize) {
        for _ in 0..times {
            game.apply(Intent::Gather).unwrap();
        }
    }

    #[test]
    fn test_end_to_end_economy() {
        let mut game = game();

        let outcome = game.apply(Intent::Click { px: 300, py: 300 }).unwrap();
        assert_eq!(
            outcome,
            Outcome::Gathered {
                amount: 1.0,
                materials: 1.0
            }
        );

        let before = game.ledger().clone();
        let result = game.apply(Intent::Buy {
            building: "solar_panel".to_string(),
        });
        assert!(matches!(result, Err(Error::UnlockNotMet { .. })));
        assert_eq!(game.ledger(), &before);
        assert!(matches!(
            game.notices().last().map(|n| &n.kind),
            Some(NoticeKind::Locked { .. })
        ));

        gather(&mut game, 4);
        game.apply(Intent::Buy {
            building: "solar_panel".to_string(),
        })
        .unwrap();
        assert_eq!(game.ledger().get("materials"), 0.0);

        let placed = game.apply(Intent::Click { px: 10, py: 10 }).unwrap();
        assert!(matches!(placed, Outcome::Placed { x: 0, y: 0, .. }));
        assert!(game.pending().is_none());

        game.update(FRAME);
        assert_eq!(game.ledger().get("energy"), 2.0);

        gather(&mut game, 10);
        let upgraded = game.apply(Intent::Upgrade { x: 0, y: 0 }).unwrap();
        assert_eq!(upgraded, Outcome::Upgraded { x: 0, y: 0, level: 2 });
        assert_eq!(game.ledger().get("materials"), 0.0);

        game.update(FRAME);
        assert_eq!(game.ledger().get("energy"), 6.0);
    }

    #[test]
    fn test_first_goal_clears_hint() {
        let mut game = game();
        gather(&mut game, 4);
        assert!(game.state().show_hint);

        gather(&mut game, 1);
        assert!(!game.state().first_goal);
        assert!(!game.state().show_hint);
        assert_eq!(
            game.notices().last().map(|n| &n.kind),
            Some(&NoticeKind::FirstMaterials)
        );
    }

    #[test]
    fn test_click_on_building_selects_it() {
        let mut game = game();
        gather(&mut game, 5);
        game.apply(Intent::Buy {
            building: "solar_panel".to_string(),
        })
        .unwrap();
        game.apply(Intent::Place { x: 1, y: 1 }).unwrap();

        let outcome = game.apply(Intent::Click { px: 130, py: 130 }).unwrap();
        match outcome {
            Outcome::Selected(view) => {
                assert_eq!(view.kind, "solar_panel");
                assert_eq!(view.upgrade_cost["materials"], 10.0);
                assert_eq!(view.production.gain["energy"], 2.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_click_on_shop_panel_is_ignored() {
        let mut game = game();
        let outcome = game.apply(Intent::Click { px: 1400, py: 10 }).unwrap();
        assert_eq!(outcome, Outcome::Ignored);
        assert_eq!(game.ledger().get("materials"), 0.0);
    }

    #[test]
    fn test_place_requires_pending_and_free_cell() {
        let mut game = game();
        assert!(matches!(
            game.apply(Intent::Place { x: 0, y: 0 }),
            Err(Error::NothingPending)
        ));

        gather(&mut game, 5);
        game.apply(Intent::Buy {
            building: "solar_panel".to_string(),
        })
        .unwrap();

        let result = game.apply(Intent::Place { x: 42, y: 0 });
        assert!(matches!(result, Err(Error::InvalidPlacement { x: 42, y: 0 })));
        assert!(game.pending().is_some());

        game.apply(Intent::Place { x: 0, y: 0 }).unwrap();
        assert_eq!(game.buildings().len(), 1);
    }

    #[test]
    fn test_second_purchase_replaces_pending() {
        let mut game = game();
        gather(&mut game, 20);
        game.apply(Intent::Buy {
            building: "solar_panel".to_string(),
        })
        .unwrap();
        game.apply(Intent::Buy {
            building: "solar_panel".to_string(),
        })
        .unwrap();

        assert!(
            game.notices()
                .iter()
                .any(|n| matches!(n.kind, NoticeKind::PendingReplaced { .. }))
        );
        assert_eq!(game.ledger().get("materials"), 8.0);
    }

    #[test]
    fn test_upgrade_unaffordable_changes_nothing() {
        let mut game = game();
        gather(&mut game, 5);
        game.apply(Intent::Buy {
            building: "solar_panel".to_string(),
        })
        .unwrap();
        game.apply(Intent::Place { x: 0, y: 0 }).unwrap();

        let result = game.apply(Intent::Upgrade { x: 0, y: 0 });
        assert!(matches!(result, Err(Error::InsufficientResources { .. })));
        assert_eq!(game.buildings().building_at(0, 0).unwrap().level, 1);
    }

    #[test]
    fn test_upgrade_stops_at_max_level() {
        let mut game = game();
        gather(&mut game, 100);
        game.apply(Intent::Buy {
            building: "solar_panel".to_string(),
        })
        .unwrap();
        game.apply(Intent::Place { x: 0, y: 0 }).unwrap();

        game.apply(Intent::Upgrade { x: 0, y: 0 }).unwrap();
        game.apply(Intent::Upgrade { x: 0, y: 0 }).unwrap();
        let result = game.apply(Intent::Upgrade { x: 0, y: 0 });

        assert!(matches!(result, Err(Error::MaxLevel { level: 3 })));
        assert_eq!(game.buildings().building_at(0, 0).unwrap().level, 3);
    }

    #[test]
    fn test_upkeep_runs_on_interval() {
        let mut game = game();
        game.update(Duration::from_millis(4990));
        assert_eq!(game.ledger().get("food"), 20.0);

        game.update(Duration::from_millis(10));
        assert_eq!(game.ledger().get("food"), 18.0);
        assert_eq!(game.ledger().get("water"), 18.0);
        assert_eq!(game.ledger().get(POPULATION), 4.0);
    }

    #[test]
    fn test_starvation_kills_colony() {
        let catalog = Catalog::from_json_str(
            r#"{
                "resources": [
                    { "id": "food", "initial": 1 },
                    { "id": "water", "initial": 50 },
                    { "id": "population", "initial": 2 },
                    { "id": "energy", "initial": 0 }
                ],
                "buildings": { "panel": { "name": "Panel", "production": { "energy": 1 } } }
            }"#,
        )
        .unwrap();
        let mut game = Game::with_seed(Arc::new(catalog), Grid::default(), 1);
        game.apply(Intent::Buy {
            building: "panel".to_string(),
        })
        .unwrap();
        game.apply(Intent::Place { x: 0, y: 0 }).unwrap();

        game.update(Duration::from_secs(5));
        assert_eq!(game.ledger().get(POPULATION), 1.0);
        assert!(game.state().is_playing());
        assert_eq!(game.ledger().get("energy"), 1.0);

        // the frame that kills the colony still settles production
        let settled = game.update(Duration::from_secs(5));
        assert_eq!(game.ledger().get(POPULATION), 0.0);
        assert_eq!(game.state().phase(), Phase::Dead);
        assert_eq!(settled.map(|s| s.worked), Some(1));
        assert_eq!(game.ledger().get("energy"), 2.0);

        assert!(game.update(FRAME).is_none());
        assert_eq!(game.ledger().get("energy"), 2.0);
        assert!(matches!(game.apply(Intent::Gather), Err(Error::GameOver)));
        assert!(matches!(
            game.apply(Intent::Place { x: 1, y: 1 }),
            Err(Error::GameOver)
        ));

        game.apply(Intent::Reset).unwrap();
        assert!(game.state().is_playing());
        assert_eq!(game.ledger().get(POPULATION), 2.0);
        assert!(game.buildings().is_empty());
    }

    #[test]
    fn test_saved_level_at_u32_max_still_snapshots() {
        let mut game = game();
        game.restore(SaveData {
            buildings: Some(vec![BuildingRecord {
                kind: "solar_panel".to_string(),
                x: 0,
                y: 0,
                level: u32::MAX,
            }]),
            ..SaveData::default()
        });

        let snapshot = game.snapshot();
        assert_eq!(snapshot.buildings.len(), 1);
        assert_eq!(snapshot.buildings[0].level, u32::MAX);
        assert!(matches!(
            game.apply(Intent::Upgrade { x: 0, y: 0 }),
            Err(Error::MaxLevel { .. })
        ));
        game.update(FRAME);
    }

    #[test]
    fn test_quest_completion_raises_notice() {
        let mut game = game();
        gather(&mut game, 5);
        game.update(FRAME);

        assert!(
            game.notices()
                .iter()
                .any(|n| matches!(&n.kind, NoticeKind::QuestComplete { text } if text == "Collect 5 materials"))
        );
        assert_eq!(game.snapshot().quest.unwrap().id, "build_solar");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        let catalog = Arc::new(test_catalog());

        let mut game = Game::with_seed(catalog.clone(), Grid::default(), 1)
            .with_store(SaveStore::new(&path));
        gather(&mut game, 12);
        game.apply(Intent::Buy {
            building: "solar_panel".to_string(),
        })
        .unwrap();
        game.apply(Intent::Place { x: 3, y: 4 }).unwrap();
        game.apply(Intent::Save).unwrap();

        let mut loaded =
            Game::with_seed(catalog, Grid::default(), 2).with_store(SaveStore::new(&path));
        assert!(loaded.load());

        assert_eq!(loaded.ledger(), game.ledger());
        assert_eq!(loaded.buildings().records(), game.buildings().records());
        assert!(!loaded.state().first_goal);
        assert_eq!(loaded.shop().price("solar_panel"), game.shop().price("solar_panel"));

        loaded.apply(Intent::Reset).unwrap();
        assert!(!path.exists());
        assert_eq!(loaded.shop().price("solar_panel").unwrap()["materials"], 5.0);
    }

    #[test]
    fn test_snapshot_lists_visible_resources_and_shop() {
        let game = game();
        let snapshot = game.snapshot();

        let ids: Vec<&str> = snapshot.resources.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["materials", "energy", "food", "water", "population"]);
        assert_eq!(snapshot.shop.len(), 2);
        assert!(!snapshot.shop[0].affordable);
        assert_eq!(snapshot.cols, 9);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "playing");
    }
}
