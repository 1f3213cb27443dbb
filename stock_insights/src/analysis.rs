//! Store-backed reads used by the CLI: price history, latest quotes, company
//! lookups and multi-ticker comparisons.
//!
//! Tickers without stored bars are skipped by the comparison helpers rather
//! than emptying the whole result.

use diesel::SqliteConnection;

use crate::{
    indicators::{AlignedCloses, CorrelationMatrix, align_closes, correlation_matrix},
    models::{Company, PriceBar},
    store::{DateRange, PriceRepo},
};

/// Date-ascending bars for `ticker`, optionally limited to `range`.
pub fn fetch_prices<R: PriceRepo + ?Sized>(
    conn: &mut SqliteConnection,
    repo: &R,
    ticker: &str,
    range: Option<DateRange>,
) -> anyhow::Result<Vec<PriceBar>> {
    repo.bars(conn, ticker, range)
}

/// Close of the most recent stored bar.
pub fn fetch_current_price<R: PriceRepo + ?Sized>(
    conn: &mut SqliteConnection,
    repo: &R,
    ticker: &str,
) -> anyhow::Result<Option<f64>> {
    repo.latest_close(conn, ticker)
}

/// The stored company record.
pub fn fetch_company_info<R: PriceRepo + ?Sized>(
    conn: &mut SqliteConnection,
    repo: &R,
    ticker: &str,
) -> anyhow::Result<Option<Company>> {
    repo.company(conn, ticker)
}

fn load_histories<R: PriceRepo + ?Sized>(
    conn: &mut SqliteConnection,
    repo: &R,
    tickers: &[String],
    range: Option<DateRange>,
) -> anyhow::Result<Vec<(String, Vec<PriceBar>)>> {
    let mut out = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let bars = repo.bars(conn, ticker, range)?;
        if !bars.is_empty() {
            out.push((ticker.clone(), bars));
        }
    }
    Ok(out)
}

/// Closes of `tickers` joined on the dates they all traded within `range`.
pub fn compare_companies<R: PriceRepo + ?Sized>(
    conn: &mut SqliteConnection,
    repo: &R,
    tickers: &[String],
    range: Option<DateRange>,
) -> anyhow::Result<AlignedCloses> {
    let histories = load_histories(conn, repo, tickers, range)?;
    Ok(align_closes(
        histories.iter().map(|(t, bars)| (t.as_str(), bars.as_slice())),
    ))
}

/// Correlation of the full close histories of `tickers`.
pub fn correlation_analysis<R: PriceRepo + ?Sized>(
    conn: &mut SqliteConnection,
    repo: &R,
    tickers: &[String],
) -> anyhow::Result<CorrelationMatrix> {
    let aligned = compare_companies(conn, repo, tickers, None)?;
    Ok(correlation_matrix(&aligned))
}

/// Stored bar count for every known company, ordered by ticker.
pub fn price_counts<R: PriceRepo + ?Sized>(
    conn: &mut SqliteConnection,
    repo: &R,
) -> anyhow::Result<Vec<(String, i64)>> {
    let mut counts = Vec::new();
    for ticker in repo.list_tickers(conn)? {
        let n = repo.count_bars(conn, &ticker)?;
        counts.push((ticker, n));
    }
    Ok(counts)
}
