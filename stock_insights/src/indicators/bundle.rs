use super::{
    Annotated, IndicatorError, closes,
    momentum::{MACD_FAST, MACD_SIGNAL, MACD_SLOW, MacdPoint, RSI_PERIOD, macd, rsi},
    rolling::{ewm_mean, rolling_mean},
};
use crate::models::PriceBar;

/// The standard indicator set for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnicalRow<'a> {
    /// Source bar.
    pub bar: &'a PriceBar,
    /// SMA(20).
    pub sma_20: Option<f64>,
    /// SMA(50).
    pub sma_50: Option<f64>,
    /// SMA(200).
    pub sma_200: Option<f64>,
    /// EMA(20).
    pub ema_20: Option<f64>,
    /// EMA(50).
    pub ema_50: Option<f64>,
    /// RSI(14).
    pub rsi_14: f64,
    /// MACD(12, 26, 9).
    pub macd: MacdPoint,
    /// SMA(50) above SMA(200).
    pub golden_cross: bool,
}

/// Computes SMA 20/50/200, EMA 20/50, RSI 14, MACD 12/26/9 and the
/// golden-cross flag for every bar.
pub fn add_technical_indicators(
    bars: &[PriceBar],
) -> Result<Vec<TechnicalRow<'_>>, IndicatorError> {
    let close = closes(bars);
    let sma_20 = rolling_mean(&close, 20)?;
    let sma_50 = rolling_mean(&close, 50)?;
    let sma_200 = rolling_mean(&close, 200)?;
    let ema_20 = ewm_mean(&close, 20)?;
    let ema_50 = ewm_mean(&close, 50)?;
    let rsi_14 = rsi(&close, RSI_PERIOD)?;
    let macd = macd(&close, MACD_FAST, MACD_SLOW, MACD_SIGNAL)?;

    Ok(bars
        .iter()
        .enumerate()
        .map(|(i, bar)| TechnicalRow {
            bar,
            sma_20: sma_20[i],
            sma_50: sma_50[i],
            sma_200: sma_200[i],
            ema_20: ema_20[i],
            ema_50: ema_50[i],
            rsi_14: rsi_14[i],
            macd: macd[i],
            golden_cross: matches!((sma_50[i], sma_200[i]), (Some(a), Some(b)) if a > b),
        })
        .collect())
}

/// Bars that closed above their SMA(20), paired with that average.
pub fn best_time_to_invest(bars: &[PriceBar]) -> Vec<Annotated<'_, f64>> {
    let close = closes(bars);
    // A fixed non-zero window cannot fail.
    let Ok(sma_20) = rolling_mean(&close, 20) else {
        return Vec::new();
    };
    bars.iter()
        .zip(sma_20)
        .filter_map(|(bar, sma)| {
            let (c, s) = (bar.close?, sma?);
            (c > s).then_some(Annotated { bar, value: s })
        })
        .collect()
}
