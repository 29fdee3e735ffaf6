pub mod config;
pub mod error;
pub mod simulator;
pub mod store;
pub mod types;
