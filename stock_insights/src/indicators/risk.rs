use super::{Annotated, IndicatorError, annotate, closes, rolling};
use crate::models::PriceBar;

/// A bar whose close moved more than the threshold from the previous close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbruptMove<'a> {
    /// The bar that closed after the move.
    pub bar: &'a PriceBar,
    /// Fractional change from the previous close (0.1 = +10%).
    pub pct_change: f64,
}

/// Flags rows whose close-to-close change exceeds `threshold` in magnitude.
///
/// `threshold` is a fraction: 0.05 flags moves larger than 5% either way.
/// Rows without a defined change (the first row, or next to a missing close)
/// are never flagged.
pub fn detect_abrupt_changes(bars: &[PriceBar], threshold: f64) -> Vec<AbruptMove<'_>> {
    bars.iter()
        .zip(rolling::pct_change(&closes(bars)))
        .filter_map(|(bar, pct)| {
            let pct = pct?;
            (pct.abs() > threshold).then_some(AbruptMove {
                bar,
                pct_change: pct,
            })
        })
        .collect()
}

/// Rolling volatility and risk for one row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiskPoint {
    /// Sample standard deviation of the closes in the trailing window.
    pub volatility: Option<f64>,
    /// `volatility / close`.
    pub risk: Option<f64>,
}

/// Rolling volatility of closes and the risk ratio derived from it.
///
/// The first `window - 1` rows have neither value. Risk is also undefined
/// when the row's close is missing or zero.
pub fn volatility_and_risk(
    bars: &[PriceBar],
    window: usize,
) -> Result<Vec<Annotated<'_, RiskPoint>>, IndicatorError> {
    let vol = rolling::rolling_std(&closes(bars), window)?;
    let points = bars.iter().zip(vol).map(|(bar, volatility)| {
        let risk = match (volatility, bar.close) {
            (Some(v), Some(c)) if c != 0.0 => Some(v / c),
            _ => None,
        };
        RiskPoint { volatility, risk }
    });
    Ok(annotate(bars, points.collect::<Vec<_>>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::fixtures::{bars, bars_opt};

    #[test]
    fn only_large_moves_are_flagged() {
        let input = bars(&[100.0, 105.0, 98.0, 120.0]);
        let moves = detect_abrupt_changes(&input, 0.10);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].bar.close, Some(120.0));
        assert!((moves[0].pct_change - (120.0 / 98.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn falls_count_as_moves() {
        let input = bars(&[100.0, 80.0, 81.0]);
        let moves = detect_abrupt_changes(&input, 0.05);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].pct_change < 0.0);
    }

    #[test]
    fn missing_close_hides_neighbouring_moves() {
        let input = bars_opt(&[Some(100.0), None, Some(200.0)]);
        assert!(detect_abrupt_changes(&input, 0.01).is_empty());
    }

    #[test]
    fn flat_series_has_zero_volatility_and_risk() {
        let input = bars(&[50.0; 10]);
        let rows = volatility_and_risk(&input, 4).unwrap();
        for (i, row) in rows.iter().enumerate() {
            if i < 3 {
                assert_eq!(row.value, RiskPoint::default());
            } else {
                assert_eq!(row.value.volatility, Some(0.0));
                assert_eq!(row.value.risk, Some(0.0));
            }
        }
    }

    #[test]
    fn risk_is_volatility_over_close() {
        let input = bars(&[10.0, 20.0, 30.0]);
        let rows = volatility_and_risk(&input, 3).unwrap();
        let last = rows[2].value;
        assert!((last.volatility.unwrap() - 10.0).abs() < 1e-12);
        assert!((last.risk.unwrap() - 10.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert_eq!(
            volatility_and_risk(&bars(&[1.0]), 0).unwrap_err(),
            IndicatorError::ZeroWindow
        );
    }
}
