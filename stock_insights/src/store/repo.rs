use chrono::NaiveDate;
use diesel::{dsl::max, prelude::*, upsert::excluded};

use crate::{
    models::{Company, NewCompany, PriceBar},
    schema::{companies, stock_prices},
    store::{DateRange, PriceRepo, RepoResult},
};

use crate::schema::stock_prices::dsl as sp;

/// Repository for companies and daily bars in a SQLite database.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteRepo;

impl SqliteRepo {
    /// Creates the repository; all state lives in the connection.
    pub fn new() -> Self {
        Self
    }
}

impl PriceRepo for SqliteRepo {
    fn upsert_company(
        &self,
        conn: &mut SqliteConnection,
        company: &NewCompany<'_>,
    ) -> RepoResult<bool> {
        let known: bool = diesel::select(diesel::dsl::exists(
            companies::table.find(company.ticker),
        ))
        .get_result(conn)?;

        diesel::insert_into(companies::table)
            .values(company)
            .on_conflict(companies::ticker)
            .do_update()
            .set(companies::name.eq(excluded(companies::name)))
            .execute(conn)?;

        Ok(!known)
    }

    fn companies(&self, conn: &mut SqliteConnection) -> RepoResult<Vec<Company>> {
        let rows = companies::table
            .select(Company::as_select())
            .order(companies::ticker.asc())
            .load(conn)?;
        Ok(rows)
    }

    fn list_tickers(&self, conn: &mut SqliteConnection) -> RepoResult<Vec<String>> {
        let rows = companies::table
            .select(companies::ticker)
            .order(companies::ticker.asc())
            .load(conn)?;
        Ok(rows)
    }

    fn company(&self, conn: &mut SqliteConnection, ticker: &str) -> RepoResult<Option<Company>> {
        let row = companies::table
            .find(ticker)
            .select(Company::as_select())
            .first(conn)
            .optional()?;
        Ok(row)
    }

    fn latest_date(
        &self,
        conn: &mut SqliteConnection,
        ticker: &str,
    ) -> RepoResult<Option<NaiveDate>> {
        let latest: Option<NaiveDate> = sp::stock_prices
            .filter(sp::ticker.eq(ticker))
            .select(max(sp::trade_date))
            .get_result(conn)?;
        Ok(latest)
    }

    fn upsert_bars(&self, conn: &mut SqliteConnection, bars: &[PriceBar]) -> RepoResult<usize> {
        // One BEGIN IMMEDIATE per batch; ON CONFLICT replaces every value
        // column, including a price going back to NULL.
        let written = conn.immediate_transaction(|conn| {
            let mut written = 0usize;
            for bar in bars {
                written += diesel::insert_into(stock_prices::table)
                    .values(bar)
                    .on_conflict((sp::ticker, sp::trade_date))
                    .do_update()
                    .set((
                        sp::open.eq(excluded(sp::open)),
                        sp::high.eq(excluded(sp::high)),
                        sp::low.eq(excluded(sp::low)),
                        sp::close.eq(excluded(sp::close)),
                        sp::volume.eq(excluded(sp::volume)),
                    ))
                    .execute(conn)?;
            }
            Ok::<_, diesel::result::Error>(written)
        })?;
        Ok(written)
    }

    fn bars(
        &self,
        conn: &mut SqliteConnection,
        ticker: &str,
        range: Option<DateRange>,
    ) -> RepoResult<Vec<PriceBar>> {
        let mut query = sp::stock_prices
            .select(PriceBar::as_select())
            .filter(sp::ticker.eq(ticker))
            .into_boxed();
        if let Some(range) = range {
            query = query.filter(sp::trade_date.between(range.start(), range.end()));
        }
        let rows = query.order(sp::trade_date.asc()).load(conn)?;
        Ok(rows)
    }

    fn latest_close(&self, conn: &mut SqliteConnection, ticker: &str) -> RepoResult<Option<f64>> {
        let close: Option<Option<f64>> = sp::stock_prices
            .filter(sp::ticker.eq(ticker))
            .order(sp::trade_date.desc())
            .select(sp::close)
            .first(conn)
            .optional()?;
        Ok(close.flatten())
    }

    fn count_bars(&self, conn: &mut SqliteConnection, ticker: &str) -> RepoResult<i64> {
        let n = sp::stock_prices
            .filter(sp::ticker.eq(ticker))
            .count()
            .get_result(conn)?;
        Ok(n)
    }
}
