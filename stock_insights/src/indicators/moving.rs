use super::{Annotated, IndicatorError, annotate, closes, rolling};
use crate::models::PriceBar;

/// Simple moving average of the close.
///
/// The first `window - 1` rows average what is available so far instead of
/// being undefined.
pub fn compute_sma(
    bars: &[PriceBar],
    window: usize,
) -> Result<Vec<Annotated<'_, Option<f64>>>, IndicatorError> {
    let sma = rolling::rolling_mean(&closes(bars), window)?;
    Ok(annotate(bars, sma))
}

/// Exponential moving average of the close, `alpha = 2 / (window + 1)`.
pub fn compute_ema(
    bars: &[PriceBar],
    window: usize,
) -> Result<Vec<Annotated<'_, Option<f64>>>, IndicatorError> {
    let ema = rolling::ewm_mean(&closes(bars), window)?;
    Ok(annotate(bars, ema))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::indicators::fixtures::bars;

    #[test]
    fn sma_keeps_every_row() {
        let input = bars(&[1.0, 2.0, 3.0, 4.0]);
        let sma = compute_sma(&input, 2).unwrap();
        let values: Vec<_> = sma.iter().map(|a| a.value).collect();
        assert_eq!(values, vec![Some(1.0), Some(1.5), Some(2.5), Some(3.5)]);
        assert_eq!(sma[3].bar.trade_date, input[3].trade_date);
    }

    #[test]
    fn ema_of_constant_is_constant() {
        let input = bars(&[7.0; 30]);
        for row in compute_ema(&input, 12).unwrap() {
            assert!((row.value.unwrap() - 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_series_is_empty() {
        assert!(compute_sma(&[], 20).unwrap().is_empty());
        assert!(compute_ema(&[], 20).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn sma_is_mean_of_trailing_window(
            xs in prop::collection::vec(1.0f64..10_000.0, 1..120),
            window in 1usize..40,
        ) {
            let input = bars(&xs);
            let sma = compute_sma(&input, window).unwrap();
            prop_assert_eq!(sma.len(), xs.len());
            for (i, row) in sma.iter().enumerate() {
                let from = (i + 1).saturating_sub(window);
                let slice = &xs[from..=i];
                let want = slice.iter().sum::<f64>() / slice.len() as f64;
                let got = row.value.unwrap();
                prop_assert!((got - want).abs() <= 1e-9 * want.abs().max(1.0));
            }
        }
    }
}
