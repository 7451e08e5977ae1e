//! # Tariffwatch - easyEnergy tariff exporter
//!
//! Periodically collects the Dutch easyEnergy spot prices for electricity and
//! gas, scrapes the fixed fees and levies from the public tariff page, derives
//! VAT and all-in totals, and publishes the result to InfluxDB.
//!
//! ## Architecture
//!
//! - `provider`: spot price client and fee page scraper
//! - `tariff`: tariff snapshot and the VAT/total derivation
//! - `aggregator`: combines the sources into one snapshot per cycle
//! - `store`: latest snapshot, shared between refresh and publish
//! - `scheduler`: refresh and publish timers with signal-driven shutdown
//! - `sink`: metrics backends (InfluxDB line protocol, log-only)
//! - `config`: YAML configuration with environment overrides
//! - `logging`: structured logging and tracing
//! - `error`: error types

pub mod aggregator;
pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
pub mod scheduler;
pub mod sink;
pub mod store;
pub mod tariff;

// Re-export commonly used types
pub use aggregator::TariffAggregator;
pub use config::Config;
pub use error::{Result, TariffWatchError};
pub use scheduler::Scheduler;
pub use store::TariffStore;
pub use tariff::{Carrier, Tariff};
