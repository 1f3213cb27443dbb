#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashSet},
    path::PathBuf,
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use market_data_ingestor::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{ApiSnafu, DataProvider, ProviderError},
};
use stock_insights::db::{connection, migrate};
use stock_insights::models::PriceBar;
use tempfile::TempDir;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_sqlite(&path).expect("migrations");

    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    use diesel::sql_query;

    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal"); // WAL is persistent per DB file

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn bar(date: NaiveDate, close: f64) -> Bar {
    Bar::new(date, close - 1.0, close + 2.0, close - 2.0, close, 1_000.0)
}

pub fn row(ticker: &str, date: NaiveDate, close: Option<f64>) -> PriceBar {
    PriceBar {
        ticker: ticker.to_string(),
        trade_date: date,
        open: close,
        high: close,
        low: close,
        close,
        volume: 100,
    }
}

/// Weekday dates in `[from, to]`.
pub fn weekdays(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    use chrono::{Datelike, Weekday};
    from.iter_days()
        .take_while(|day| *day <= to)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

/// In-memory upstream: serves whatever bars it holds for the requested range
/// and records every request.
#[derive(Default)]
pub struct FakeProvider {
    history: Mutex<BTreeMap<String, BTreeMap<NaiveDate, Bar>>>,
    failing: HashSet<String>,
    pub requests: Mutex<Vec<BarsRequestParams>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(self, ticker: &str, bars: Vec<Bar>) -> Self {
        self.set_bars(ticker, bars);
        self
    }

    pub fn failing_for(mut self, ticker: &str) -> Self {
        self.failing.insert(ticker.to_string());
        self
    }

    pub fn set_bars(&self, ticker: &str, bars: Vec<Bar>) {
        let mut history = self.history.lock().unwrap();
        let entry = history.entry(ticker.to_string()).or_default();
        for b in bars {
            entry.insert(b.date, b);
        }
    }

    pub fn requests(&self) -> Vec<BarsRequestParams> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_symbols(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.symbol).collect()
    }
}

#[async_trait]
impl DataProvider for FakeProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        self.requests.lock().unwrap().push(params.clone());

        if self.failing.contains(&params.symbol) {
            return ApiSnafu {
                message: format!("HTTP 500 for {}", params.symbol),
            }
            .fail();
        }

        let bars = self
            .history
            .lock()
            .unwrap()
            .get(&params.symbol)
            .map(|h| {
                h.range(params.start..=params.end)
                    .map(|(_, b)| b.clone())
                    .collect()
            })
            .unwrap_or_default();

        let mut series = BarSeries::empty(params.symbol, params.timeframe);
        series.bars = bars;
        Ok(series)
    }
}
