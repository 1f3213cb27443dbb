use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::Deserialize;

use crate::models::bar::Bar;

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

impl ChartError {
    /// Yahoo reports "nothing in range" / "unknown symbol" through the error
    /// object rather than an empty result.
    pub fn is_no_data(&self) -> bool {
        self.description.contains("No data found")
    }
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

/// Only the exchange's UTC offset is needed to date the bars.
#[derive(Deserialize, Debug)]
pub struct ChartMeta {
    #[serde(default)]
    pub gmtoffset: i32,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
    #[serde(default)]
    pub adjclose: Vec<AdjCloseColumn>,
}

#[derive(Deserialize, Debug, Default)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AdjCloseColumn {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

fn at(col: &[Option<f64>], i: usize) -> Option<f64> {
    col.get(i).copied().flatten()
}

fn trade_date(ts: i64, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&offset).date_naive())
}

/// Scales OHLC by `adjclose / close`, the same auto-adjust rule Yahoo's own
/// clients apply. Rows without a usable ratio are left raw.
fn adjust(bar: &mut Bar, adjclose: Option<f64>) {
    let (Some(close), Some(adj)) = (bar.close, adjclose) else {
        return;
    };
    if close == 0.0 || !close.is_finite() || !adj.is_finite() {
        return;
    }
    let ratio = adj / close;
    bar.open = bar.open.map(|v| v * ratio);
    bar.high = bar.high.map(|v| v * ratio);
    bar.low = bar.low.map(|v| v * ratio);
    bar.close = Some(adj);
}

impl ChartResult {
    /// Converts the column-oriented chart payload into date-ascending bars.
    ///
    /// Timestamps become dates in the exchange's calendar (via `gmtoffset`).
    /// When Yahoo repeats a date (the live session bar next to the settled
    /// one) the later row wins.
    pub fn into_bars(self, adjusted: bool) -> Vec<Bar> {
        let offset = FixedOffset::east_opt(self.meta.gmtoffset).unwrap_or(Utc.fix());
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let adj = self
            .indicators
            .adjclose
            .into_iter()
            .next()
            .unwrap_or_default();

        let mut bars: Vec<Bar> = Vec::with_capacity(self.timestamp.len());
        for (i, ts) in self.timestamp.iter().enumerate() {
            let Some(date) = trade_date(*ts, offset) else {
                continue;
            };
            let mut bar = Bar {
                date,
                open: at(&quote.open, i),
                high: at(&quote.high, i),
                low: at(&quote.low, i),
                close: at(&quote.close, i),
                volume: at(&quote.volume, i),
            };
            if adjusted {
                adjust(&mut bar, at(&adj.adjclose, i));
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        deduped
    }
}

/// Outcome of decoding a chart body.
#[derive(Debug)]
pub enum ChartPayload {
    Bars(Vec<Bar>),
    Empty,
    Failed(ChartError),
}

impl ChartEnvelope {
    pub fn into_payload(self, adjusted: bool) -> ChartPayload {
        if let Some(err) = self.chart.error {
            return if err.is_no_data() {
                ChartPayload::Empty
            } else {
                ChartPayload::Failed(err)
            };
        }
        match self.chart.result.and_then(|r| r.into_iter().next()) {
            Some(result) => {
                let bars = result.into_bars(adjusted);
                if bars.is_empty() {
                    ChartPayload::Empty
                } else {
                    ChartPayload::Bars(bars)
                }
            }
            None => ChartPayload::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_DAYS: &str = r#"{
      "chart": {
        "result": [{
          "meta": {"symbol": "TCS.NS", "gmtoffset": 19800, "exchangeTimezoneName": "Asia/Kolkata"},
          "timestamp": [1704167100, 1704253500, 1704339900],
          "indicators": {
            "quote": [{
              "open":   [3800.0, 3850.0, null],
              "high":   [3900.0, 3860.0, 3700.0],
              "low":    [3790.0, 3780.0, 3650.0],
              "close":  [3850.0, 3800.0, 3690.0],
              "volume": [1000000, null, 5]
            }],
            "adjclose": [{"adjclose": [1925.0, 3800.0, 3690.0]}]
          }
        }],
        "error": null
      }
    }"#;

    fn parse(body: &str) -> ChartEnvelope {
        serde_json::from_str(body).expect("valid chart json")
    }

    #[test]
    fn converts_columns_to_exchange_local_dates() {
        let ChartPayload::Bars(bars) = parse(TWO_DAYS).into_payload(false) else {
            panic!("expected bars");
        };
        assert_eq!(bars.len(), 3);
        // 1704167100 = 2024-01-02T03:45Z = 09:15 IST
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(bars[0].close, Some(3850.0));
        assert_eq!(bars[1].volume, None);
        assert_eq!(bars[2].open, None);
    }

    #[test]
    fn adjusted_rows_scale_ohlc_by_adjclose_ratio() {
        let ChartPayload::Bars(bars) = parse(TWO_DAYS).into_payload(true) else {
            panic!("expected bars");
        };
        // ratio 0.5 on the first row
        assert_eq!(bars[0].close, Some(1925.0));
        assert_eq!(bars[0].open, Some(1900.0));
        assert_eq!(bars[0].high, Some(1950.0));
        assert_eq!(bars[0].low, Some(1895.0));
        assert_eq!(bars[0].volume, Some(1_000_000.0));
        // ratio 1.0
        assert_eq!(bars[1].open, Some(3850.0));
    }

    #[test]
    fn no_data_error_is_empty_not_failure() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(parse(body).into_payload(true), ChartPayload::Empty));

        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input - interval=1x is not supported"}}}"#;
        match parse(body).into_payload(true) {
            ChartPayload::Failed(err) => assert_eq!(err.code, "Bad Request"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn result_without_timestamps_is_empty() {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"TCS.NS","gmtoffset":19800},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(parse(body).into_payload(true), ChartPayload::Empty));
    }

    #[test]
    fn repeated_date_keeps_latest_row() {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"X","gmtoffset":0},
            "timestamp":[1704153600, 1704160800],
            "indicators":{"quote":[{"close":[10.0, 11.0]}]}}],"error":null}}"#;
        let ChartPayload::Bars(bars) = parse(body).into_payload(false) else {
            panic!("expected bars");
        };
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, Some(11.0));
    }
}
