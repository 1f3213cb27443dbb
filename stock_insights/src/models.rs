//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`]:
//! - [`crate::schema::companies`]: the tracked universe, one row per ticker
//! - [`crate::schema::stock_prices`]: one daily bar per `(ticker, trade_date)`
//!
//! [`PriceBar`] is also the input row of every function in
//! [`crate::indicators`], so stored history can be analysed without copying.

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::schema::*;

/// A row in [`crate::schema::companies`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = companies, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Company {
    /// Exchange-qualified ticker (e.g., "RELIANCE.NS").
    pub ticker: String,
    /// Display name.
    pub name: String,
}

/// Insertable form of [`Company`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = companies)]
pub struct NewCompany<'a> {
    /// Exchange-qualified ticker.
    pub ticker: &'a str,
    /// Display name.
    pub name: &'a str,
}

/// A row in [`crate::schema::stock_prices`]: one trading day for one ticker.
///
/// Prices are `None` when the provider had no usable value; volume is never
/// missing and defaults to 0.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = stock_prices, check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceBar {
    /// Exchange-qualified ticker.
    pub ticker: String,
    /// Trading day in the exchange calendar.
    pub trade_date: NaiveDate,
    /// Opening price.
    pub open: Option<f64>,
    /// Session high.
    pub high: Option<f64>,
    /// Session low.
    pub low: Option<f64>,
    /// Closing price (split/dividend adjusted when the sync asks for it).
    pub close: Option<f64>,
    /// Shares traded.
    pub volume: i64,
}

impl PriceBar {
    /// A bar carrying only a close; the other prices are `None` and volume 0.
    pub fn from_close(ticker: impl Into<String>, trade_date: NaiveDate, close: Option<f64>) -> Self {
        Self {
            ticker: ticker.into(),
            trade_date,
            open: None,
            high: None,
            low: None,
            close,
            volume: 0,
        }
    }
}
