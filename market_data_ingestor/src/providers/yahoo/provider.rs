use async_trait::async_trait;
use reqwest::{Client, header};
use shared_utils::env::get_env_var_opt;
use snafu::{ResultExt, ensure};
use tracing::debug;

use crate::{
    models::{bar::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InternalSnafu, InvalidBaseUrlSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu,
        yahoo::{
            params::construct_params,
            response::{ChartEnvelope, ChartPayload},
        },
    },
};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Creates a new Yahoo chart provider.
    ///
    /// No credentials are needed. The endpoint can be redirected (e.g. to a
    /// caching proxy) with the `YAHOO_CHART_URL` environment variable.
    pub fn new() -> Result<Self, ProviderInitError> {
        let base_url = get_env_var_opt("YAHOO_CHART_URL").unwrap_or_else(|| BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderInitError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ensure!(
            base_url.starts_with("http://") || base_url.starts_with("https://"),
            InvalidBaseUrlSnafu { url: base_url }
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self { client, base_url })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl DataProvider for YahooProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let query = construct_params(&params)?;

        debug!(
            symbol = %params.symbol,
            start = %params.start,
            end = %params.end,
            "requesting yahoo chart"
        );

        let response = self
            .client
            .get(self.chart_url(&params.symbol))
            .query(&query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;

        // Yahoo sends the chart envelope on 4xx too (404 for unknown symbols),
        // so decode first and only fall back to the raw body when that fails.
        let envelope: ChartEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return ApiSnafu {
                    message: format!("HTTP {status}: {body}"),
                }
                .fail();
            }
            Err(e) => {
                return InternalSnafu {
                    message: format!("malformed chart response: {e}"),
                }
                .fail();
            }
        };

        let mut series = BarSeries::empty(params.symbol, params.timeframe);
        match envelope.into_payload(params.adjusted) {
            ChartPayload::Bars(bars) => series.bars = bars,
            ChartPayload::Empty => {}
            ChartPayload::Failed(err) => {
                return ApiSnafu {
                    message: format!("{}: {}", err.code, err.description),
                }
                .fail();
            }
        }

        // The chart endpoint widens ranges to whole sessions; trim to what was asked.
        let (start, end) = (params.start, params.end);
        series.bars.retain(|b| b.date >= start && b.date <= end);

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base_url() {
        let err = YahooProvider::with_base_url("ftp://example.com").err().unwrap();
        assert!(matches!(err, ProviderInitError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn chart_url_joins_symbol() {
        let p = YahooProvider::with_base_url("http://localhost:9000/chart/").unwrap();
        assert_eq!(p.chart_url("M&M.NS"), "http://localhost:9000/chart/M&M.NS");
    }
}
