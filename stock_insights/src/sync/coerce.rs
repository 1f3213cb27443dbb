//! Provider bar -> stored row conversion.

use market_data_ingestor::models::bar::Bar;

use crate::models::PriceBar;

/// A missing or non-finite price is stored as NULL.
pub fn coerce_price(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// A missing, NaN or negative volume is stored as 0; fractions are truncated.
pub fn coerce_volume(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v.trunc() as i64,
        _ => 0,
    }
}

/// Builds the stored row for `ticker` from one provider bar.
pub fn to_price_bar(ticker: &str, bar: &Bar) -> PriceBar {
    PriceBar {
        ticker: ticker.to_string(),
        trade_date: bar.date,
        open: coerce_price(bar.open),
        high: coerce_price(bar.high),
        low: coerce_price(bar.low),
        close: coerce_price(bar.close),
        volume: coerce_volume(bar.volume),
    }
}
