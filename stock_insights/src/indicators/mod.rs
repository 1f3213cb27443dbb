//! Technical indicators over stored daily bars.
//!
//! All functions take a date-ascending slice of [`PriceBar`]s (or a close
//! column derived from one) and return new values; inputs are never
//! mutated. Row-level results borrow the bar they describe through
//! [`Annotated`].
//!
//! Missing closes are tolerated: rolling means skip them, the EMA carries
//! its previous value over them, and percent changes next to them are
//! undefined.
//!
//! # Supported Indicators
//! - **SMA / EMA** ([`compute_sma`], [`compute_ema`])
//! - **Abrupt moves** ([`detect_abrupt_changes`])
//! - **Volatility and risk** ([`volatility_and_risk`])
//! - **RSI / MACD** ([`rsi`], [`macd`])
//! - **Indicator bundle** ([`add_technical_indicators`], [`best_time_to_invest`])
//! - **Cross-series alignment and correlation** ([`align_closes`], [`correlation_matrix`])
//! - **Trend heuristics** ([`analyze_trend_confidence`], [`project_future`])

mod bundle;
mod correlation;
mod momentum;
mod moving;
mod risk;
pub mod rolling;
mod trend;

use crate::models::PriceBar;

pub use bundle::{TechnicalRow, add_technical_indicators, best_time_to_invest};
pub use correlation::{AlignedCloses, AlignedRow, CorrelationMatrix, align_closes, correlation_matrix};
pub use momentum::{
    MACD_FAST, MACD_SIGNAL, MACD_SLOW, MacdPoint, RSI_PERIOD, macd, rsi,
};
pub use moving::{compute_ema, compute_sma};
pub use risk::{AbruptMove, RiskPoint, detect_abrupt_changes, volatility_and_risk};
pub use trend::{
    Horizon, ProjectedPoint, Projection, Signal, TrendConfidence, analyze_trend_confidence,
    project_future, shares_for_budget,
};

/// Errors raised for invalid indicator parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    /// Windows, spans and periods must be at least one row.
    #[error("window must be at least 1")]
    ZeroWindow,
    /// MACD needs a fast EMA that is shorter than the slow one.
    #[error("MACD fast span {fast} must be shorter than slow span {slow}")]
    MacdSpans {
        /// Fast EMA span.
        fast: usize,
        /// Slow EMA span.
        slow: usize,
    },
    /// Horizon names are `short` or `long`.
    #[error("unknown horizon `{0}` (expected `short` or `long`)")]
    UnknownHorizon(String),
}

/// One input bar paired with a derived value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotated<'a, T> {
    /// The bar the value was computed for.
    pub bar: &'a PriceBar,
    /// The derived value.
    pub value: T,
}

/// The close column of `bars`.
pub fn closes(bars: &[PriceBar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| b.close).collect()
}

fn annotate<T>(bars: &[PriceBar], values: impl IntoIterator<Item = T>) -> Vec<Annotated<'_, T>> {
    bars.iter()
        .zip(values)
        .map(|(bar, value)| Annotated { bar, value })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Days, NaiveDate};

    use crate::models::PriceBar;

    /// Consecutive calendar days from 2024-01-01 carrying `closes`.
    pub fn bars(closes: &[f64]) -> Vec<PriceBar> {
        bars_opt(&closes.iter().copied().map(Some).collect::<Vec<_>>())
    }

    pub fn bars_opt(closes: &[Option<f64>]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| PriceBar::from_close("TEST.NS", start + Days::new(i as u64), *c))
            .collect()
    }
}
