//! Column primitives shared by the indicators.
//!
//! Every function takes a date-ascending column where `None` marks a missing
//! value and returns a new column of the same length.

use super::IndicatorError;

fn check_window(window: usize) -> Result<(), IndicatorError> {
    if window == 0 {
        return Err(IndicatorError::ZeroWindow);
    }
    Ok(())
}

/// Mean of the present values in a slice; `None` when nothing is present.
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Sample standard deviation (n-1 denominator), two-pass.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (n - 1) as f64).sqrt())
}

/// Trailing mean over `window` rows with a shrinking window at the start.
///
/// Row `i` averages the present values among rows `max(0, i+1-window)..=i`.
pub fn rolling_mean(
    values: &[Option<f64>],
    window: usize,
) -> Result<Vec<Option<f64>>, IndicatorError> {
    check_window(window)?;
    Ok((0..values.len())
        .map(|i| {
            let from = (i + 1).saturating_sub(window);
            mean_present(&values[from..=i])
        })
        .collect())
}

/// Exponentially weighted mean with `alpha = 2 / (span + 1)`.
///
/// Seeded with the first present value, no bias adjustment. A missing input
/// repeats the previous output, but the old mean keeps decaying across the
/// gap: after `k` steps since the last present value the update is
/// `((1-alpha)^k * prev + alpha * x) / ((1-alpha)^k + alpha)`, the same
/// weighting as pandas' `ewm(adjust=False)` with `ignore_na=False`.
pub fn ewm_mean(values: &[Option<f64>], span: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    check_window(span)?;
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;
    let mut steps = 0i32;
    Ok(values
        .iter()
        .map(|v| {
            steps += 1;
            prev = match (prev, v) {
                (Some(p), Some(x)) => {
                    let old = (1.0 - alpha).powi(steps);
                    Some((old * p + alpha * x) / (old + alpha))
                }
                (None, Some(x)) => Some(*x),
                (p, None) => return p,
            };
            steps = 0;
            prev
        })
        .collect())
}

/// Trailing sample standard deviation over exactly `window` rows.
///
/// `None` until a full window of present values is available, so the first
/// `window - 1` rows are always `None`. A window of 1 has no sample deviation.
pub fn rolling_std(
    values: &[Option<f64>],
    window: usize,
) -> Result<Vec<Option<f64>>, IndicatorError> {
    check_window(window)?;
    Ok((0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let full: Option<Vec<f64>> = values[i + 1 - window..=i].iter().copied().collect();
            full.and_then(|w| sample_std(&w))
        })
        .collect())
}

/// Close-to-close fractional change; `None` for the first row, when either
/// neighbour is missing, or when the previous value is zero.
///
/// pandas would give `inf` after a zero close; here that row is undefined,
/// so a move off a zero price is never reported as abrupt.
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    out.extend(values.first().map(|_| None));
    out.extend(values.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(cur)) if prev != 0.0 => Some(cur / prev - 1.0),
        _ => None,
    }));
    out
}
