use chrono::{Days, NaiveDate, NaiveTime};

use crate::{
    models::{
        request_params::BarsRequestParams,
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::{ProviderError, ValidationSnafu},
};

/// Maps a timeframe onto Yahoo's `interval` query value.
///
/// Only daily-or-coarser bars are requested through this provider.
pub fn validate_timeframe(tf: &TimeFrame) -> Result<&'static str, ProviderError> {
    match (tf.unit, tf.amount) {
        (TimeFrameUnit::Day, 1) => Ok("1d"),
        (TimeFrameUnit::Week, 1) => Ok("1wk"),
        (TimeFrameUnit::Month, 1) => Ok("1mo"),
        (TimeFrameUnit::Month, 3) => Ok("3mo"),
        _ => ValidationSnafu {
            message: format!("unsupported timeframe {tf} for yahoo chart"),
        }
        .fail(),
    }
}

fn day_start_epoch(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Builds the query string for `GET /v8/finance/chart/{symbol}`.
///
/// `period2` is exclusive on Yahoo's side, so it is set to the midnight after
/// `params.end` to make the end date inclusive.
pub fn construct_params(params: &BarsRequestParams) -> Result<Vec<(String, String)>, ProviderError> {
    let interval = validate_timeframe(&params.timeframe)?;

    if params.end < params.start {
        return ValidationSnafu {
            message: format!("end {} is before start {}", params.end, params.start),
        }
        .fail();
    }

    let end_exclusive = params
        .end
        .checked_add_days(Days::new(1))
        .unwrap_or(params.end);

    Ok(vec![
        ("period1".to_string(), day_start_epoch(params.start).to_string()),
        ("period2".to_string(), day_start_epoch(end_exclusive).to_string()),
        ("interval".to_string(), interval.to_string()),
        ("events".to_string(), "div,splits".to_string()),
        (
            "includeAdjustedClose".to_string(),
            params.adjusted.to_string(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(q: &'a [(String, String)], key: &str) -> Option<&'a str> {
        q.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn end_date_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let q = construct_params(&BarsRequestParams::daily("INFY.NS", start, end)).unwrap();

        assert_eq!(value(&q, "period1"), Some("1704067200")); // 2024-01-01T00:00Z
        assert_eq!(value(&q, "period2"), Some("1706745600")); // 2024-02-01T00:00Z
        assert_eq!(value(&q, "interval"), Some("1d"));
        assert_eq!(value(&q, "includeAdjustedClose"), Some("true"));
        assert_eq!(value(&q, "events"), Some("div,splits"));
    }

    #[test]
    fn coarser_timeframes_map_to_yahoo_intervals() {
        let month = TimeFrame::new(1, TimeFrameUnit::Month).unwrap();
        let quarter = TimeFrame::new(3, TimeFrameUnit::Month).unwrap();
        assert_eq!(validate_timeframe(&month).unwrap(), "1mo");
        assert_eq!(validate_timeframe(&quarter).unwrap(), "3mo");
    }

    #[test]
    fn rejects_unmapped_timeframes_and_inverted_ranges() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let mut params = BarsRequestParams::daily("INFY.NS", day, day);
        // fields are public, so an amount `TimeFrame::new` would refuse can still arrive
        params.timeframe = TimeFrame {
            amount: 6,
            unit: TimeFrameUnit::Month,
        };
        assert!(matches!(
            construct_params(&params),
            Err(ProviderError::Validation { .. })
        ));

        let inverted =
            BarsRequestParams::daily("INFY.NS", day, day.pred_opt().unwrap());
        assert!(matches!(
            construct_params(&inverted),
            Err(ProviderError::Validation { .. })
        ));
    }
}
