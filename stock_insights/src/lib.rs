//! Stock price store, incremental Yahoo sync and technical indicators.
//!
//! - [`db`]: SQLite connections and embedded migrations
//! - [`store`]: company and daily-bar repository
//! - [`sync`]: high-water-mark sync controller
//! - [`indicators`]: pure indicator functions over stored bars
//! - [`analysis`]: store-backed reads combining the two

#![deny(missing_docs)]

pub mod analysis;
pub mod config;
pub mod db;
pub mod indicators;
pub mod models;
#[allow(missing_docs)]
pub mod schema;
pub mod seed;
pub mod store;
pub mod sync;
pub mod tz;
