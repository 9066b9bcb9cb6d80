// src/lib.rs
pub mod categorize;
pub mod config;
pub mod logging;
pub mod model;
pub mod plot;
pub mod scrape;
pub mod store;

pub use config::Config;
pub use model::{CountRow, ExplodedRecord, ScamRecord};
