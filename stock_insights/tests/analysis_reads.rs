mod common;
use common::{d, row, setup_db};

use stock_insights::analysis::{
    compare_companies, correlation_analysis, fetch_company_info, fetch_current_price,
    fetch_prices, price_counts,
};
use stock_insights::config::{CompanyCfg, default_config};
use stock_insights::seed::{ensure_companies, seed_companies};
use stock_insights::store::{DateRange, PriceRepo, SqliteRepo};

fn series(ticker: &str, closes: &[f64]) -> Vec<stock_insights::models::PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| row(ticker, d(2024, 1, 1 + i as u32), Some(*c)))
        .collect()
}

fn owned(ts: &[&str]) -> Vec<String> {
    ts.iter().map(|t| t.to_string()).collect()
}

#[test]
fn seeding_is_idempotent_and_refreshes_names() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteRepo::new();
    let cfg = default_config().unwrap();

    assert_eq!(seed_companies(&mut conn, &repo, &cfg.companies).unwrap(), 36);
    assert_eq!(seed_companies(&mut conn, &repo, &cfg.companies).unwrap(), 0);
    assert_eq!(repo.list_tickers(&mut conn).unwrap().len(), 36);

    let renamed = vec![CompanyCfg::new("Reliance", "RELIANCE.NS")];
    assert_eq!(seed_companies(&mut conn, &repo, &renamed).unwrap(), 0);
    let info = fetch_company_info(&mut conn, &repo, "RELIANCE.NS")
        .unwrap()
        .expect("company exists");
    assert_eq!(info.name, "Reliance");
    assert!(fetch_company_info(&mut conn, &repo, "NOPE.NS").unwrap().is_none());
}

#[test]
fn ensure_companies_only_seeds_an_empty_table() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteRepo::new();
    let defaults = vec![
        CompanyCfg::new("Infosys", "INFY.NS"),
        CompanyCfg::new("HDFC Bank", "HDFCBANK.NS"),
    ];

    let tickers = ensure_companies(&mut conn, &repo, &defaults).unwrap();
    assert_eq!(tickers, vec!["HDFCBANK.NS", "INFY.NS"]);

    let tickers = ensure_companies(&mut conn, &repo, &[CompanyCfg::new("ITC", "ITC.NS")]).unwrap();
    assert_eq!(tickers, vec!["HDFCBANK.NS", "INFY.NS"]);
}

#[test]
fn price_reads_follow_the_store() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteRepo::new();
    repo.upsert_bars(&mut conn, &series("TCS.NS", &[10.0, 11.0, 12.0, 13.0]))
        .unwrap();

    let range = DateRange::new(d(2024, 1, 2), d(2024, 1, 3)).unwrap();
    let window = fetch_prices(&mut conn, &repo, "TCS.NS", Some(range)).unwrap();
    assert_eq!(
        window.iter().map(|b| b.close).collect::<Vec<_>>(),
        vec![Some(11.0), Some(12.0)]
    );
    assert_eq!(fetch_prices(&mut conn, &repo, "TCS.NS", None).unwrap().len(), 4);

    assert_eq!(fetch_current_price(&mut conn, &repo, "TCS.NS").unwrap(), Some(13.0));
    assert_eq!(fetch_current_price(&mut conn, &repo, "NONE.NS").unwrap(), None);
}

#[test]
fn comparison_skips_tickers_without_history() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteRepo::new();
    repo.upsert_bars(&mut conn, &series("A.NS", &[1.0, 2.0, 3.0])).unwrap();
    // B.NS misses the first day
    let mut b = series("B.NS", &[9.0, 8.0, 7.0]);
    b.remove(0);
    repo.upsert_bars(&mut conn, &b).unwrap();

    let aligned =
        compare_companies(&mut conn, &repo, &owned(&["A.NS", "EMPTY.NS", "B.NS"]), None).unwrap();
    assert_eq!(aligned.tickers, vec!["A.NS", "B.NS"]);
    assert_eq!(
        aligned.rows.iter().map(|r| r.date).collect::<Vec<_>>(),
        vec![d(2024, 1, 2), d(2024, 1, 3)]
    );
    assert_eq!(aligned.column("B.NS"), Some(vec![Some(8.0), Some(7.0)]));
}

#[test]
fn correlation_of_stored_histories() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteRepo::new();
    repo.upsert_bars(&mut conn, &series("UP.NS", &[1.0, 2.0, 3.0, 4.0, 5.0]))
        .unwrap();
    repo.upsert_bars(&mut conn, &series("DOWN.NS", &[50.0, 40.0, 30.0, 20.0, 10.0]))
        .unwrap();
    repo.upsert_bars(&mut conn, &series("TWIN.NS", &[2.0, 4.0, 6.0, 8.0, 10.0]))
        .unwrap();

    let m = correlation_analysis(&mut conn, &repo, &owned(&["UP.NS", "DOWN.NS", "TWIN.NS"]))
        .unwrap();
    let close = |a: Option<f64>, b: f64| (a.unwrap() - b).abs() < 1e-9;
    assert!(close(m.get("UP.NS", "DOWN.NS"), -1.0));
    assert!(close(m.get("UP.NS", "TWIN.NS"), 1.0));
    assert!(close(m.get("DOWN.NS", "DOWN.NS"), 1.0));
    assert_eq!(m.get("UP.NS", "DOWN.NS"), m.get("DOWN.NS", "UP.NS"));

    let none = correlation_analysis(&mut conn, &repo, &owned(&["X.NS", "Y.NS"])).unwrap();
    assert!(none.is_empty());
}

#[test]
fn counts_cover_every_company() {
    let (_db, mut conn) = setup_db();
    let repo = SqliteRepo::new();
    seed_companies(
        &mut conn,
        &repo,
        &[CompanyCfg::new("Wipro", "WIPRO.NS"), CompanyCfg::new("ITC", "ITC.NS")],
    )
    .unwrap();
    repo.upsert_bars(&mut conn, &series("WIPRO.NS", &[400.0, 401.0])).unwrap();

    assert_eq!(
        price_counts(&mut conn, &repo).unwrap(),
        vec![("ITC.NS".to_string(), 0), ("WIPRO.NS".to_string(), 2)]
    );
}
