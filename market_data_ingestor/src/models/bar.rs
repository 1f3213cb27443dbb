//! Canonical in-memory representation of a daily bar (OHLCV) as delivered by a provider.
//!
//! This struct is the standard output of every [`DataProvider`](crate::providers::DataProvider)
//! implementation. Numeric fields stay optional here: vendors occasionally send
//! partial rows, and deciding what a missing value means belongs to the consumer.

use chrono::NaiveDate;

use crate::models::timeframe::TimeFrame;

/// A single bar for one trading date.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Trade date in the exchange's local calendar.
    pub date: NaiveDate,

    /// Opening price, if the provider supplied one.
    pub open: Option<f64>,

    /// Highest price during the session.
    pub high: Option<f64>,

    /// Lowest price during the session.
    pub low: Option<f64>,

    /// Closing price (adjusted when the request asked for it).
    pub close: Option<f64>,

    /// Shares traded. Vendors send this as a float or null.
    pub volume: Option<f64>,
}

impl Bar {
    /// A bar with every numeric field present.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }
}

/// Represents a complete set of bars for a single symbol.
///
/// Bars are ordered by ascending date with at most one bar per date.
/// An empty `bars` vector is a valid answer ("nothing in that range").
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "RELIANCE.NS", "AAPL").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub timeframe: TimeFrame,
    /// The collection of bars.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    /// An empty series for `symbol`.
    pub fn empty(symbol: impl Into<String>, timeframe: TimeFrame) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }
}
