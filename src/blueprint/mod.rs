pub mod catalog;
pub mod model;

pub use catalog::Catalog;
pub use model::{Balance, BuildingDefinition};
