//! Incremental daily-bar synchronization.
//!
//! ## What this does
//! For each ticker, read the latest stored trade date (the high-water mark),
//! step back a short safety lookback, fetch everything from there through
//! today and upsert it keyed by `(ticker, trade_date)`. Tickers with nothing
//! stored start at a fixed epoch.
//!
//! ## Why the lookback
//! Re-fetching the last few days repairs bars that were missing or revised
//! upstream after the previous run. Because writes are upserts, the overlap
//! never duplicates rows and replaying a run is harmless.
//!
//! ## Failure isolation
//! Each ticker is processed independently: a provider or store error is
//! logged and recorded in the [`SyncReport`], and the batch moves on. A fixed
//! pause (no backoff) separates provider requests.

pub mod coerce;

use std::time::Duration;

use anyhow::Context;
use chrono::{Days, NaiveDate};
use diesel::SqliteConnection;
use market_data_ingestor::{
    models::request_params::BarsRequestParams, pacing::Pacer, providers::DataProvider,
};
use tracing::{info, warn};

use crate::{
    config::{AppConfig, SyncConfig},
    seed::ensure_companies,
    store::PriceRepo,
    tz,
};

/// Tunables for [`synchronize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// First day fetched for a ticker with no stored bars.
    pub epoch: NaiveDate,
    /// Days re-fetched before the high-water mark.
    pub lookback_days: u32,
    /// Fixed pause between provider requests.
    pub request_pause: Duration,
    /// Ask the provider for split/dividend adjusted prices.
    pub adjusted: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(cfg: &SyncConfig) -> Self {
        Self {
            epoch: cfg.epoch,
            lookback_days: cfg.lookback_days,
            request_pause: cfg.request_pause(),
            adjusted: cfg.adjusted,
        }
    }
}

impl SyncOptions {
    /// First day to request given the stored high-water mark.
    pub fn fetch_start(&self, high_water: Option<NaiveDate>) -> NaiveDate {
        match high_water {
            Some(latest) => latest
                .checked_sub_days(Days::new(u64::from(self.lookback_days)))
                .unwrap_or(NaiveDate::MIN),
            None => self.epoch,
        }
    }
}

/// What happened to one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerOutcome {
    /// The fetch start was not before today; nothing was requested.
    UpToDate,
    /// The provider returned no bars.
    Empty,
    /// Bars were written.
    Upserted {
        /// Rows inserted or updated.
        rows: usize,
    },
    /// The ticker failed; the batch continued.
    Failed {
        /// Error chain, outermost first.
        reason: String,
    },
}

/// Outcome for one ticker, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerReport {
    /// Ticker as requested.
    pub ticker: String,
    /// What happened.
    pub outcome: TickerOutcome,
}

/// Result of a [`synchronize`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// One entry per requested ticker.
    pub tickers: Vec<TickerReport>,
}

impl SyncReport {
    fn push(&mut self, ticker: &str, outcome: TickerOutcome) {
        self.tickers.push(TickerReport {
            ticker: ticker.to_string(),
            outcome,
        });
    }

    fn count(&self, pred: impl Fn(&TickerOutcome) -> bool) -> usize {
        self.tickers.iter().filter(|t| pred(&t.outcome)).count()
    }

    /// Tickers that had bars written.
    pub fn upserted(&self) -> usize {
        self.count(|o| matches!(o, TickerOutcome::Upserted { .. }))
    }

    /// Tickers skipped because they were current.
    pub fn up_to_date(&self) -> usize {
        self.count(|o| matches!(o, TickerOutcome::UpToDate))
    }

    /// Tickers for which the provider had nothing.
    pub fn empty(&self) -> usize {
        self.count(|o| matches!(o, TickerOutcome::Empty))
    }

    /// Tickers that failed.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TickerOutcome::Failed { .. }))
    }

    /// Rows written across all tickers.
    pub fn total_rows(&self) -> usize {
        self.tickers
            .iter()
            .map(|t| match t.outcome {
                TickerOutcome::Upserted { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    /// The outcome recorded for `ticker`.
    pub fn outcome(&self, ticker: &str) -> Option<&TickerOutcome> {
        self.tickers
            .iter()
            .find(|t| t.ticker == ticker)
            .map(|t| &t.outcome)
    }
}

async fn sync_ticker<R, P>(
    conn: &mut SqliteConnection,
    repo: &R,
    provider: &P,
    pacer: &Pacer,
    ticker: &str,
    opts: &SyncOptions,
    today: NaiveDate,
) -> anyhow::Result<TickerOutcome>
where
    R: PriceRepo + ?Sized,
    P: DataProvider + ?Sized,
{
    let high_water = repo
        .latest_date(conn, ticker)
        .context("read high-water mark")?;
    let start = opts.fetch_start(high_water);
    if start >= today {
        info!(ticker, %start, "already up to date");
        return Ok(TickerOutcome::UpToDate);
    }

    pacer.wait().await;
    info!(ticker, %start, end = %today, "fetching daily bars");

    let mut params = BarsRequestParams::daily(ticker, start, today);
    params.adjusted = opts.adjusted;
    let series = provider
        .fetch_bars(params)
        .await
        .context("fetch daily bars")?;

    if series.is_empty() {
        warn!(ticker, %start, "provider returned no data");
        return Ok(TickerOutcome::Empty);
    }

    let rows: Vec<_> = series
        .bars
        .iter()
        .map(|bar| coerce::to_price_bar(ticker, bar))
        .collect();
    let rows = repo.upsert_bars(conn, &rows).context("upsert bars")?;
    info!(ticker, rows, "bars upserted");
    Ok(TickerOutcome::Upserted { rows })
}

/// Brings each ticker's stored bars up to `today`.
///
/// Never fails as a whole: per-ticker errors are logged and reported as
/// [`TickerOutcome::Failed`].
pub async fn synchronize<R, P>(
    conn: &mut SqliteConnection,
    repo: &R,
    provider: &P,
    tickers: &[String],
    opts: &SyncOptions,
    today: NaiveDate,
) -> SyncReport
where
    R: PriceRepo + ?Sized,
    P: DataProvider + ?Sized,
{
    let pacer = Pacer::new(opts.request_pause);
    let mut report = SyncReport::default();

    for ticker in tickers {
        let outcome = match sync_ticker(conn, repo, provider, &pacer, ticker, opts, today).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(ticker = %ticker, error = %reason, "ticker sync failed");
                TickerOutcome::Failed { reason }
            }
        };
        report.push(ticker, outcome);
    }

    info!(
        tickers = report.tickers.len(),
        upserted = report.upserted(),
        up_to_date = report.up_to_date(),
        empty = report.empty(),
        failed = report.failed(),
        rows = report.total_rows(),
        "sync finished"
    );
    report
}

/// Seeds the default companies when none are stored, then synchronizes
/// every known ticker up to today in the configured exchange time zone.
pub async fn run_sync<R, P>(
    conn: &mut SqliteConnection,
    repo: &R,
    provider: &P,
    cfg: &AppConfig,
) -> anyhow::Result<SyncReport>
where
    R: PriceRepo + ?Sized,
    P: DataProvider + ?Sized,
{
    let today = tz::today_in(cfg.sync.tz()?);
    let tickers = ensure_companies(conn, repo, &cfg.companies)?;
    let opts = SyncOptions::from(&cfg.sync);
    Ok(synchronize(conn, repo, provider, &tickers, &opts, today).await)
}
