//! Provider boundary for daily market data.
//!
//! - [`models`]: vendor-agnostic request parameters, timeframes and bars.
//! - [`providers`]: the [`providers::DataProvider`] trait and the Yahoo Finance
//!   chart implementation.
//! - [`pacing`]: fixed-period request pacing shared by callers that loop over symbols.

pub mod models;
pub mod pacing;
pub mod providers;
