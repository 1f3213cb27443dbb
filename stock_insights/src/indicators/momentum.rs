use super::{IndicatorError, rolling::ewm_mean};

/// RSI lookback in deltas.
pub const RSI_PERIOD: usize = 14;
/// MACD fast EMA span.
pub const MACD_FAST: usize = 12;
/// MACD slow EMA span.
pub const MACD_SLOW: usize = 26;
/// MACD signal EMA span.
pub const MACD_SIGNAL: usize = 9;

/// Neutral RSI reported while history is too short to measure momentum.
const RSI_NEUTRAL: f64 = 50.0;

/// Relative Strength Index over the trailing `period` close-to-close deltas.
///
/// `RSI = 100 - 100 / (1 + avg_gain / avg_loss)`, with plain means of the
/// gains and losses in the window. Row `i` has `i` prior deltas; rows with
/// fewer than `period` of them are exactly 50. A window without any loss
/// also reports 50 because the ratio is undefined there. A delta next to a
/// missing close counts as neither gain nor loss.
pub fn rsi(closes: &[Option<f64>], period: usize) -> Result<Vec<f64>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::ZeroWindow);
    }

    // gains[i] / losses[i] belong to the delta ending at row i; row 0 has none.
    let mut gains = vec![0.0; closes.len()];
    let mut losses = vec![0.0; closes.len()];
    for i in 1..closes.len() {
        if let (Some(prev), Some(cur)) = (closes[i - 1], closes[i]) {
            let delta = cur - prev;
            if delta > 0.0 {
                gains[i] = delta;
            } else {
                losses[i] = -delta;
            }
        }
    }

    Ok((0..closes.len())
        .map(|i| {
            if i < period {
                return RSI_NEUTRAL;
            }
            let from = i + 1 - period;
            let avg_gain = gains[from..=i].iter().sum::<f64>() / period as f64;
            let avg_loss = losses[from..=i].iter().sum::<f64>() / period as f64;
            if avg_loss == 0.0 {
                return RSI_NEUTRAL;
            }
            let rs = avg_gain / avg_loss;
            (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
        })
        .collect())
}

/// One MACD row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacdPoint {
    /// Fast EMA minus slow EMA.
    pub macd: Option<f64>,
    /// EMA of `macd` over the signal span.
    pub signal: Option<f64>,
    /// `macd - signal`.
    pub histogram: Option<f64>,
}

/// Moving Average Convergence Divergence.
pub fn macd(
    closes: &[Option<f64>],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<Vec<MacdPoint>, IndicatorError> {
    if fast >= slow {
        return Err(IndicatorError::MacdSpans { fast, slow });
    }
    let fast_ema = ewm_mean(closes, fast)?;
    let slow_ema = ewm_mean(closes, slow)?;

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ewm_mean(&line, signal)?;

    Ok(line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| MacdPoint {
            macd: *m,
            signal: *s,
            histogram: m.zip(*s).map(|(m, s)| m - s),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn col(xs: &[f64]) -> Vec<Option<f64>> {
        xs.iter().copied().map(Some).collect()
    }

    #[test]
    fn short_history_is_neutral() {
        let xs: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        let r = rsi(&col(&xs), RSI_PERIOD).unwrap();
        assert_eq!(r, vec![50.0; 14]);
    }

    #[test]
    fn mixed_window_uses_plain_means() {
        // 15 closes -> 14 deltas: seven +2 and seven -1.
        let mut xs = vec![100.0];
        for i in 0..14 {
            let last = *xs.last().unwrap();
            xs.push(if i % 2 == 0 { last + 2.0 } else { last - 1.0 });
        }
        let r = rsi(&col(&xs), RSI_PERIOD).unwrap();
        // avg_gain = 1.0, avg_loss = 0.5, RS = 2
        assert!((r[14] - (100.0 - 100.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn all_losses_is_zero_and_no_losses_is_neutral() {
        let falling: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
        let r = rsi(&col(&falling), RSI_PERIOD).unwrap();
        assert_eq!(r[19], 0.0);

        let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let r = rsi(&col(&rising), RSI_PERIOD).unwrap();
        assert_eq!(r[19], 50.0);
    }

    #[test]
    fn macd_rejects_bad_spans() {
        assert_eq!(
            macd(&col(&[1.0]), 26, 12, 9),
            Err(IndicatorError::MacdSpans { fast: 26, slow: 12 })
        );
        assert_eq!(macd(&col(&[1.0]), 12, 26, 0), Err(IndicatorError::ZeroWindow));
    }

    #[test]
    fn macd_of_flat_series_is_zero() {
        let m = macd(&col(&[42.0; 40]), MACD_FAST, MACD_SLOW, MACD_SIGNAL).unwrap();
        assert_eq!(m.len(), 40);
        for p in m {
            assert!(p.macd.unwrap().abs() < 1e-9);
            assert!(p.histogram.unwrap().abs() < 1e-9);
        }
    }

    #[test]
    fn macd_starts_at_zero_and_follows_trend() {
        let xs: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let m = macd(&col(&xs), MACD_FAST, MACD_SLOW, MACD_SIGNAL).unwrap();
        assert_eq!(m[0].macd, Some(0.0));
        // fast EMA leads the slow one in an uptrend
        assert!(m[59].macd.unwrap() > 0.0);
    }

    proptest! {
        #[test]
        fn rsi_is_bounded(xs in prop::collection::vec(1.0f64..1_000.0, 0..200)) {
            let r = rsi(&col(&xs), RSI_PERIOD).unwrap();
            prop_assert_eq!(r.len(), xs.len());
            for (i, v) in r.iter().enumerate() {
                prop_assert!((0.0..=100.0).contains(v));
                if i < RSI_PERIOD {
                    prop_assert_eq!(*v, 50.0);
                }
            }
        }
    }
}
