//! Linear-trend heuristics: a confidence label for the recent trend and a
//! straight-line projection with buy/sell candidates.
//!
//! Both fit a least-squares line to the trailing closes of a [`Horizon`].
//! They are heuristics for a dashboard, not forecasts.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate, Weekday};

use super::{IndicatorError, rolling};
use crate::models::PriceBar;

/// Bars required before a trend label is attempted.
const MIN_TREND_BARS: usize = 15;
/// Bars required before a projection is attempted.
const MIN_PROJECTION_BARS: usize = 10;
/// Window of the moving average the projected prices are compared against.
const PROJECTION_SMA_WINDOW: usize = 20;

/// Analysis horizon: how much history to fit and how far to project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Horizon {
    /// 60 bars of history, 15 business days ahead.
    #[default]
    ShortTerm,
    /// 180 bars of history, 60 business days ahead.
    LongTerm,
}

impl Horizon {
    /// Trailing bars fitted.
    pub const fn lookback(self) -> usize {
        match self {
            Horizon::ShortTerm => 60,
            Horizon::LongTerm => 180,
        }
    }

    /// Business days projected.
    pub const fn forecast_days(self) -> usize {
        match self {
            Horizon::ShortTerm => 15,
            Horizon::LongTerm => 60,
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::ShortTerm => write!(f, "Short Term"),
            Horizon::LongTerm => write!(f, "Long Term"),
        }
    }
}

impl FromStr for Horizon {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace(['-', '_'], " ");
        match norm.as_str() {
            "short" | "short term" => Ok(Horizon::ShortTerm),
            "long" | "long term" => Ok(Horizon::LongTerm),
            _ => Err(IndicatorError::UnknownHorizon(s.to_string())),
        }
    }
}

/// Trend label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Up more than 5% on a rising fit.
    StrongBuy,
    /// Up more than 1% on a rising fit.
    Buy,
    /// Down more than 5% on a falling fit.
    RiskyAvoid,
    /// Anything else, including too little history.
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::StrongBuy => "Strong Buy",
            Signal::Buy => "Buy",
            Signal::RiskyAvoid => "Risky / Avoid",
            Signal::Hold => "Hold",
        })
    }
}

/// Result of [`analyze_trend_confidence`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendConfidence {
    /// 5..=95; 50 when there is too little history.
    pub confidence: f64,
    /// Label derived from `pct_change` and the fitted slope.
    pub signal: Signal,
    /// Percent change from the first to the last close of the lookback.
    pub pct_change: f64,
    /// Sample standard deviation of daily percent changes, in percent.
    pub volatility: f64,
}

impl TrendConfidence {
    fn neutral() -> Self {
        Self {
            confidence: 50.0,
            signal: Signal::Hold,
            pct_change: 0.0,
            volatility: 0.0,
        }
    }
}

/// Least-squares line through `(i, ys[i])`; returns `(slope, intercept)`.
fn linear_fit(ys: &[f64]) -> (f64, f64) {
    let n = ys.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    (slope, mean_y - slope * mean_x)
}

fn present_closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().filter_map(|b| b.close).collect()
}

fn tail(xs: &[f64], n: usize) -> &[f64] {
    &xs[xs.len().saturating_sub(n)..]
}

/// Scores the recent trend of `bars` for `horizon`.
///
/// Uses the last `horizon.lookback()` closes (bars without a close are
/// ignored). With fewer than 15 closes the result is neutral: confidence
/// 50, [`Signal::Hold`], no change and no volatility.
pub fn analyze_trend_confidence(bars: &[PriceBar], horizon: Horizon) -> TrendConfidence {
    let closes = present_closes(bars);
    if closes.len() < MIN_TREND_BARS {
        return TrendConfidence::neutral();
    }
    let recent = tail(&closes, horizon.lookback());

    let (slope, _) = linear_fit(recent);
    let (first, last) = (recent[0], recent[recent.len() - 1]);
    let pct_change = if first != 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };

    let column: Vec<Option<f64>> = recent.iter().copied().map(Some).collect();
    let daily: Vec<f64> = rolling::pct_change(&column).into_iter().flatten().collect();
    let volatility = rolling::sample_std(&daily).map_or(0.0, |s| s * 100.0);

    let confidence = (50.0 + pct_change / 2.0 - volatility / 4.0).clamp(5.0, 95.0);

    let signal = if pct_change > 5.0 && slope > 0.0 {
        Signal::StrongBuy
    } else if pct_change > 1.0 && slope > 0.0 {
        Signal::Buy
    } else if pct_change < -5.0 && slope < 0.0 {
        Signal::RiskyAvoid
    } else {
        Signal::Hold
    };

    TrendConfidence {
        confidence,
        signal,
        pct_change,
        volatility,
    }
}

/// One projected business day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Projected trading day (Monday to Friday).
    pub date: NaiveDate,
    /// Value of the fitted line.
    pub price: f64,
    /// Trailing mean of the projected prices up to this day.
    pub sma: f64,
}

/// Output of [`project_future`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    /// Points projected below their moving average.
    pub buy: Vec<ProjectedPoint>,
    /// Points projected above their moving average.
    pub sell: Vec<ProjectedPoint>,
}

impl Projection {
    /// Whether no candidates were produced.
    pub fn is_empty(&self) -> bool {
        self.buy.is_empty() && self.sell.is_empty()
    }
}

/// The next `n` weekdays strictly after `after`.
pub(crate) fn business_days_after(after: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut day = after;
    while out.len() < n {
        let Some(next) = day.checked_add_days(Days::new(1)) else {
            break;
        };
        day = next;
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
    }
    out
}

/// Extends the fitted line of the last `horizon.lookback()` closes over the
/// next `horizon.forecast_days()` business days after the last bar.
///
/// Each projected price is compared with the 20-point trailing mean of the
/// projected prices: below is a buy candidate, above a sell candidate. Fewer
/// than 10 closes give an empty projection.
pub fn project_future(bars: &[PriceBar], horizon: Horizon) -> Projection {
    let closes = present_closes(bars);
    let recent = tail(&closes, horizon.lookback());
    let Some(last_bar) = bars.last() else {
        return Projection::default();
    };
    if recent.len() < MIN_PROJECTION_BARS {
        return Projection::default();
    }

    let (slope, intercept) = linear_fit(recent);
    let dates = business_days_after(last_bar.trade_date, horizon.forecast_days());
    let prices: Vec<Option<f64>> = (0..dates.len())
        .map(|k| Some(intercept + slope * (recent.len() + k) as f64))
        .collect();
    let Ok(smas) = rolling::rolling_mean(&prices, PROJECTION_SMA_WINDOW) else {
        return Projection::default();
    };

    let mut projection = Projection::default();
    for ((date, price), sma) in dates.into_iter().zip(prices).zip(smas) {
        let (Some(price), Some(sma)) = (price, sma) else {
            continue;
        };
        let point = ProjectedPoint { date, price, sma };
        if price < sma {
            projection.buy.push(point);
        } else if price > sma {
            projection.sell.push(point);
        }
    }
    projection
}

/// Whole shares of a stock priced at `price` that `budget` can buy.
pub fn shares_for_budget(budget: f64, price: f64) -> u64 {
    if price.is_nan() || budget.is_nan() || price <= 0.0 || budget <= 0.0 {
        return 0;
    }
    (budget / price).floor() as u64
}
