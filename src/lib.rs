pub mod config;
pub mod maintenance;
pub mod models;
pub mod pipeline;
pub mod scrapers;
pub mod store;
pub mod telemetry;
