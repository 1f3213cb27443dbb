//! Application configuration: parsing, normalization, and loading.
//!
//! The TOML file has two parts:
//! - `[sync]`: tunables for the sync controller (epoch, lookback, pacing,
//!   adjusted closes, exchange time zone). Every key is optional.
//! - `[[companies]]`: the tracked universe as `{ name, ticker }` entries.
//!
//! Key behaviors:
//! - Unknown keys are rejected (`deny_unknown_fields`).
//! - Normalization trims names and tickers, uppercases tickers, drops entries
//!   whose ticker is empty and de-duplicates by ticker keeping the first
//!   occurrence.
//! - The time zone must be a known IANA name.
//!
//! Entrypoints:
//! - Built-in defaults (36 NSE large caps): [`default_config`]
//! - Parse + normalize from a TOML string: [`load_config_str`]
//! - Parse + normalize from a file path: [`load_config_path`]

use std::{path::Path, time::Duration};

use anyhow::Context;
use chrono::NaiveDate;
use chrono_tz::Tz;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::tz;

/// The configuration shipped with the crate.
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Sync controller tunables.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Tracked companies.
    #[serde(default)]
    pub companies: Vec<CompanyCfg>,
}

/// `[sync]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// First day fetched for a ticker with no stored history.
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,
    /// Days re-fetched before the latest stored date on every run.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Fixed pause between provider requests, in milliseconds.
    #[serde(default = "default_request_pause_ms")]
    pub request_pause_ms: u64,
    /// Request split/dividend adjusted prices.
    #[serde(default = "default_adjusted")]
    pub adjusted: bool,
    /// IANA zone of the exchange; decides what "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_lookback_days() -> u32 {
    7
}

fn default_request_pause_ms() -> u64 {
    500
}

fn default_adjusted() -> bool {
    true
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            epoch: default_epoch(),
            lookback_days: default_lookback_days(),
            request_pause_ms: default_request_pause_ms(),
            adjusted: default_adjusted(),
            timezone: default_timezone(),
        }
    }
}

impl SyncConfig {
    /// The pause between provider requests.
    pub fn request_pause(&self) -> Duration {
        Duration::from_millis(self.request_pause_ms)
    }

    /// The parsed exchange time zone.
    pub fn tz(&self) -> anyhow::Result<Tz> {
        tz::parse_tz(&self.timezone)
    }
}

/// One tracked company.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyCfg {
    /// Display name.
    pub name: String,
    /// Exchange-qualified ticker (e.g., "INFY.NS").
    pub ticker: String,
}

impl CompanyCfg {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

/// Summary of changes performed during normalization.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    /// Tickers rewritten by trimming or uppercasing.
    pub tickers_rewritten: usize,
    /// Entries dropped because the ticker was empty after trimming.
    pub blank_dropped: usize,
    /// Entries dropped because their ticker was already listed.
    pub duplicates_dropped: usize,
}

/// Normalize a configuration in place.
///
/// Errors:
/// - Unknown time zone name
pub fn normalize_config(cfg: &mut AppConfig) -> anyhow::Result<NormalizationReport> {
    let mut report = NormalizationReport::default();

    cfg.sync.timezone = cfg.sync.timezone.trim().to_string();
    cfg.sync.tz()?;

    let mut by_ticker: IndexMap<String, CompanyCfg> = IndexMap::new();
    for mut company in std::mem::take(&mut cfg.companies) {
        let ticker = company.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            report.blank_dropped += 1;
            continue;
        }
        if ticker != company.ticker {
            report.tickers_rewritten += 1;
        }
        if by_ticker.contains_key(&ticker) {
            report.duplicates_dropped += 1;
            continue;
        }
        company.ticker = ticker.clone();
        company.name = company.name.trim().to_string();
        by_ticker.insert(ticker, company);
    }
    cfg.companies = by_ticker.into_values().collect();

    Ok(report)
}

/// Parse and normalize a TOML string.
pub fn load_config_str(s: &str) -> anyhow::Result<AppConfig> {
    let mut cfg: AppConfig = toml::from_str(s).context("parse config TOML")?;
    normalize_config(&mut cfg)?;
    Ok(cfg)
}

/// Read, parse and normalize a TOML file.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<AppConfig> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    load_config_str(&s).with_context(|| format!("load config {}", path.display()))
}

/// The built-in configuration.
pub fn default_config() -> anyhow::Result<AppConfig> {
    load_config_str(DEFAULT_CONFIG).context("built-in config")
}
