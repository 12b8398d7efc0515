pub mod config;
pub mod runner;
pub mod store;
pub mod upload;
