pub mod actor;
pub mod api;
pub mod blueprint;
pub mod colony;
pub mod error;
pub mod instrumentation;
pub mod settings;
