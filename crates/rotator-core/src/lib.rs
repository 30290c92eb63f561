pub mod config;
pub mod embed;
pub mod engine;
pub mod platform;
pub mod protocol;
pub mod reconcile;
pub mod roster;
pub mod rotation;
pub mod store;
