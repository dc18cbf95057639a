pub mod building;
pub mod clock;
pub mod event;
pub mod game;
pub mod grid;
pub mod ledger;
pub mod notice;
pub mod quest;
pub mod save;
pub mod shop;
pub mod state;

pub use game::{Game, Intent, Outcome, Snapshot};
