pub mod broker;
pub mod dispatcher;
pub mod model;
