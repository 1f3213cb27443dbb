//! Company list seeding.
//!
//! Everything runs inside one `BEGIN IMMEDIATE` transaction via
//! `SqliteConnection::immediate_transaction`, so a seed either lands
//! completely or not at all.

use diesel::{Connection, SqliteConnection};
use tracing::{info, warn};

use crate::{config::CompanyCfg, models::NewCompany, store::PriceRepo};

/// Upserts every company and returns how many tickers were new.
///
/// Re-running with the same list inserts nothing and only refreshes names.
pub fn seed_companies<R>(
    conn: &mut SqliteConnection,
    repo: &R,
    companies: &[CompanyCfg],
) -> anyhow::Result<usize>
where
    R: PriceRepo + ?Sized,
{
    let inserted = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let mut inserted = 0;
        for c in companies {
            let new = NewCompany {
                ticker: &c.ticker,
                name: &c.name,
            };
            if repo.upsert_company(conn, &new)? {
                inserted += 1;
            }
        }
        Ok(inserted)
    })?;
    info!(companies = companies.len(), inserted, "company list synced");
    Ok(inserted)
}

/// Returns the known tickers, seeding `defaults` first when none are stored.
pub fn ensure_companies<R>(
    conn: &mut SqliteConnection,
    repo: &R,
    defaults: &[CompanyCfg],
) -> anyhow::Result<Vec<String>>
where
    R: PriceRepo + ?Sized,
{
    let tickers = repo.list_tickers(conn)?;
    if !tickers.is_empty() {
        return Ok(tickers);
    }
    warn!(defaults = defaults.len(), "no companies stored, inserting default list");
    seed_companies(conn, repo, defaults)?;
    repo.list_tickers(conn)
}
