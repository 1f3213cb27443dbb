use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use market_data_ingestor::providers::yahoo::YahooProvider;
use shared_utils::env::get_env_var;
use stock_insights::{
    analysis,
    config::{self, AppConfig},
    db::migrate,
    indicators::{self, Horizon},
    seed,
    store::{DateRange, PriceRepo, SqliteRepo},
    sync::{self, SyncOptions, TickerOutcome},
    tz,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Stock Insights CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply pending database migrations.
    Migrate,
    /// Insert or refresh the company list.
    Seed {
        #[arg(long, value_name = "FILE")]
        file: Option<String>,
    },
    /// Fetch missing daily bars.
    Sync {
        #[arg(long, value_name = "FILE")]
        config: Option<String>,
        /// Limit the run to these tickers (repeatable).
        #[arg(long = "ticker", value_name = "TICKER")]
        tickers: Vec<String>,
    },
    /// Show companies and stored bar counts.
    Status,
    /// Latest SMA/EMA/RSI/MACD values.
    Indicators {
        ticker: String,
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Days whose close moved more than the threshold.
    Abrupt {
        ticker: String,
        /// Fractional move, e.g. 0.05 for 5%.
        #[arg(long, default_value_t = 0.05)]
        threshold: f64,
    },
    /// Latest rolling volatility and risk.
    Risk {
        ticker: String,
        #[arg(long, default_value_t = 20)]
        window: usize,
    },
    /// Correlation of close prices.
    Correlate {
        #[arg(required = true, num_args = 2..)]
        tickers: Vec<String>,
    },
    /// Trend confidence, position size and projected buy/sell days.
    Insights {
        ticker: String,
        #[arg(long, default_value = "short")]
        horizon: Horizon,
        #[arg(long)]
        budget: Option<f64>,
    },
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(p) => config::load_config_path(p),
        None => config::default_config(),
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn normalize_tickers(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let db_url = get_env_var("DATABASE_URL")?;

    if let Cmd::Migrate = cli.cmd {
        let applied = migrate::run_sqlite(&db_url)?;
        println!("applied {applied} migration(s)");
        return Ok(());
    }

    let mut conn = migrate::open(&db_url)?;
    let conn = &mut conn;
    let repo = SqliteRepo::new();

    match cli.cmd {
        Cmd::Migrate => {}
        Cmd::Seed { file } => {
            let cfg = load_config(file.as_deref())?;
            let inserted = seed::seed_companies(conn, &repo, &cfg.companies)?;
            println!(
                "company list synced ({} listed, {inserted} new)",
                cfg.companies.len()
            );
        }
        Cmd::Sync { config, tickers } => {
            let cfg = load_config(config.as_deref())?;
            let provider = YahooProvider::new().context("create yahoo provider")?;
            let tickers = normalize_tickers(&tickers);

            let report = if tickers.is_empty() {
                sync::run_sync(conn, &repo, &provider, &cfg).await?
            } else {
                let today = tz::today_in(cfg.sync.tz()?);
                let opts = SyncOptions::from(&cfg.sync);
                sync::synchronize(conn, &repo, &provider, &tickers, &opts, today).await
            };

            for t in &report.tickers {
                let line = match &t.outcome {
                    TickerOutcome::UpToDate => "up to date".to_string(),
                    TickerOutcome::Empty => "no data returned".to_string(),
                    TickerOutcome::Upserted { rows } => format!("{rows} rows upserted"),
                    TickerOutcome::Failed { reason } => format!("FAILED: {reason}"),
                };
                println!("{:<16} {line}", t.ticker);
            }
            println!(
                "{} tickers, {} rows, {} failed",
                report.tickers.len(),
                report.total_rows(),
                report.failed()
            );
        }
        Cmd::Status => {
            let companies = repo.companies(conn)?;
            let counts = analysis::price_counts(conn, &repo)?;
            for (company, (_, n)) in companies.iter().zip(&counts) {
                println!("{:<16} {:>6}  {}", company.ticker, n, company.name);
            }
            println!("{} companies", companies.len());
        }
        Cmd::Indicators { ticker, from, to } => {
            let range = match (from, to) {
                (Some(f), Some(t)) => Some(DateRange::new(f, t)?),
                _ => None,
            };
            let bars = analysis::fetch_prices(conn, &repo, &ticker, range)?;
            let rows = indicators::add_technical_indicators(&bars)?;
            let Some(last) = rows.last() else {
                bail!("no stored prices for {ticker}");
            };
            println!("{ticker} on {}", last.bar.trade_date);
            println!("  close    {}", fmt_opt(last.bar.close));
            println!("  SMA 20   {}", fmt_opt(last.sma_20));
            println!("  SMA 50   {}", fmt_opt(last.sma_50));
            println!("  SMA 200  {}", fmt_opt(last.sma_200));
            println!("  EMA 20   {}", fmt_opt(last.ema_20));
            println!("  EMA 50   {}", fmt_opt(last.ema_50));
            println!("  RSI 14   {:.2}", last.rsi_14);
            println!(
                "  MACD     {} signal {} hist {}",
                fmt_opt(last.macd.macd),
                fmt_opt(last.macd.signal),
                fmt_opt(last.macd.histogram)
            );
            println!("  golden cross: {}", last.golden_cross);
        }
        Cmd::Abrupt { ticker, threshold } => {
            let bars = analysis::fetch_prices(conn, &repo, &ticker, None)?;
            let moves = indicators::detect_abrupt_changes(&bars, threshold);
            for m in &moves {
                println!(
                    "{}  {:>10}  {:+.2}%",
                    m.bar.trade_date,
                    fmt_opt(m.bar.close),
                    m.pct_change * 100.0
                );
            }
            println!("{} abrupt move(s) above {:.2}%", moves.len(), threshold * 100.0);
        }
        Cmd::Risk { ticker, window } => {
            let bars = analysis::fetch_prices(conn, &repo, &ticker, None)?;
            let rows = indicators::volatility_and_risk(&bars, window)?;
            let Some(last) = rows.last() else {
                bail!("no stored prices for {ticker}");
            };
            println!(
                "{ticker} on {}: volatility {} risk {}",
                last.bar.trade_date,
                fmt_opt(last.value.volatility),
                last.value
                    .risk
                    .map_or_else(|| "-".to_string(), |r| format!("{r:.4}"))
            );
        }
        Cmd::Correlate { tickers } => {
            let tickers = normalize_tickers(&tickers);
            let m = analysis::correlation_analysis(conn, &repo, &tickers)?;
            if m.is_empty() {
                bail!("no stored prices for any of the requested tickers");
            }
            print!("{:<16}", "");
            for t in &m.tickers {
                print!("{t:>16}");
            }
            println!();
            for (t, row) in m.tickers.iter().zip(&m.values) {
                print!("{t:<16}");
                for v in row {
                    print!("{:>16}", fmt_opt(*v));
                }
                println!();
            }
        }
        Cmd::Insights {
            ticker,
            horizon,
            budget,
        } => {
            let bars = analysis::fetch_prices(conn, &repo, &ticker, None)?;
            if bars.is_empty() {
                bail!("no stored prices for {ticker}");
            }
            let trend = indicators::analyze_trend_confidence(&bars, horizon);
            println!("{ticker} ({horizon})");
            println!(
                "  {}  confidence {:.0}%  change {:+.2}%  volatility {:.2}%",
                trend.signal, trend.confidence, trend.pct_change, trend.volatility
            );

            if let Some(budget) = budget {
                match analysis::fetch_current_price(conn, &repo, &ticker)? {
                    Some(price) => println!(
                        "  budget {budget:.0} buys {} share(s) at {price:.2}",
                        indicators::shares_for_budget(budget, price)
                    ),
                    None => println!("  no latest close to size a position"),
                }
            }

            let projection = indicators::project_future(&bars, horizon);
            let dates = |pts: &[indicators::ProjectedPoint]| {
                pts.iter()
                    .map(|p| p.date.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            println!("  projected buy days:  {}", dates(&projection.buy));
            println!("  projected sell days: {}", dates(&projection.sell));
        }
    }

    Ok(())
}
