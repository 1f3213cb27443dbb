use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::timeframe::TimeFrame;

/// Universal parameters for requesting bars for one symbol from any provider.
///
/// It is the standard input for all
/// [`DataProvider`](crate::providers::DataProvider) implementations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// Symbol to request (e.g., `"RELIANCE.NS"`, `"AAPL"`).
    pub symbol: String,

    /// The time interval for each bar.
    ///
    /// **Validation of allowed values is performed by each data provider
    /// implementation, according to their own API rules.**
    pub timeframe: TimeFrame,

    /// First trade date of the range (inclusive).
    pub start: NaiveDate,

    /// Last trade date of the range (inclusive).
    pub end: NaiveDate,

    /// Ask for split/dividend adjusted prices.
    pub adjusted: bool,
}

impl BarsRequestParams {
    /// Adjusted daily bars for `symbol` over `start..=end`.
    pub fn daily(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: TimeFrame::daily(),
            start,
            end,
            adjusted: true,
        }
    }
}
