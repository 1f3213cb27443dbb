//! Company + daily price repository (SQLite).
//!
//! The store holds two collections: companies keyed by ticker and price bars
//! keyed by `(ticker, trade_date)`. Bars are only ever written through
//! [`PriceRepo::upsert_bars`], so replaying a fetch overwrites instead of
//! duplicating.

mod repo;

use chrono::NaiveDate;
use diesel::SqliteConnection;

use crate::models::{Company, NewCompany, PriceBar};

pub use repo::SqliteRepo;

/// Result type used throughout the repository for fallible operations.
pub type RepoResult<T> = anyhow::Result<T>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Errors raised when building a [`DateRange`].
pub enum RangeError {
    #[error("start date {start} must be on or before end date {end}")]
    /// The range would be empty.
    Inverted {
        /// Requested first day.
        start: NaiveDate,
        /// Requested last day.
        end: NaiveDate,
    },
}

/// Inclusive range of trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds `[start, end]`, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day (inclusive).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `day` falls inside the range.
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }
}

/// Portable surface, SQLite implementation lives in `repo.rs`.
pub trait PriceRepo {
    /// Inserts a company or renames an existing one. Returns true when the
    /// ticker was not known before.
    fn upsert_company(&self, conn: &mut SqliteConnection, company: &NewCompany<'_>)
    -> RepoResult<bool>;

    /// All companies ordered by ticker.
    fn companies(&self, conn: &mut SqliteConnection) -> RepoResult<Vec<Company>>;

    /// All known tickers ordered by ticker.
    fn list_tickers(&self, conn: &mut SqliteConnection) -> RepoResult<Vec<String>>;

    /// Looks up one company.
    fn company(&self, conn: &mut SqliteConnection, ticker: &str) -> RepoResult<Option<Company>>;

    /// The high-water mark: latest stored trade date for `ticker`.
    fn latest_date(&self, conn: &mut SqliteConnection, ticker: &str)
    -> RepoResult<Option<NaiveDate>>;

    /// Upserts bars keyed by `(ticker, trade_date)` in one transaction and
    /// returns how many rows were written.
    fn upsert_bars(&self, conn: &mut SqliteConnection, bars: &[PriceBar]) -> RepoResult<usize>;

    /// Date-ascending bars for `ticker`, optionally limited to `range`.
    fn bars(
        &self,
        conn: &mut SqliteConnection,
        ticker: &str,
        range: Option<DateRange>,
    ) -> RepoResult<Vec<PriceBar>>;

    /// Close of the most recent bar, if that bar has one.
    fn latest_close(&self, conn: &mut SqliteConnection, ticker: &str) -> RepoResult<Option<f64>>;

    /// Number of stored bars for `ticker`.
    fn count_bars(&self, conn: &mut SqliteConnection, ticker: &str) -> RepoResult<i64>;
}
