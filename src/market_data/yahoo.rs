// =============================================================================
// Yahoo Finance market-data client
// =============================================================================
//
// Thin read-only client over the v8 chart API:
//
//   GET {base}/v8/finance/chart/{symbol}?range=5d&interval=15m
//
// Decoding is a pure function over the response body so it can be tested on
// canned payloads without any network. Rows with null OHLC entries (Yahoo
// emits them for halted or partial intervals) are skipped entirely, matching
// a dropna over the raw frame.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::series::{Bar, BarSeries};
use crate::types::AuxReading;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo rejects requests without a browser-ish user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) spx-bias/1.0";

pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different host (used by tests and proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch OHLCV bars for `symbol` over the given range/interval and return
    /// them as a validated `BarSeries`.
    pub async fn fetch_bars(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<BarSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url,
            symbol,
            range,
            interval
        );
        debug!(url = %url, "fetching bars");

        let body = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("chart request for {symbol} failed"))?
            .error_for_status()
            .with_context(|| format!("chart request for {symbol} returned an error status"))?
            .text()
            .await
            .context("failed to read chart response body")?;

        let bars = parse_chart_response(&body)
            .with_context(|| format!("failed to decode chart response for {symbol}"))?;

        info!(symbol, bars = bars.len(), range, interval, "bars fetched");

        BarSeries::new(symbol, bars)
            .map_err(|e| anyhow::anyhow!("{symbol} returned an unusable series: {e}"))
    }

    /// Fetch the most recent close of the auxiliary volatility index.
    pub async fn fetch_latest_aux(&self, symbol: &str) -> Result<AuxReading> {
        let series = self.fetch_bars(symbol, "1d", "15m").await?;
        let last = series.last_bar();
        Ok(AuxReading::new(last.close, last.timestamp))
    }
}

/// Decode a Yahoo v8 chart payload into bars, skipping rows with any null
/// OHLC field. Timestamps arrive in seconds and are converted to millis.
pub fn parse_chart_response(body: &str) -> Result<Vec<Bar>> {
    let root: serde_json::Value =
        serde_json::from_str(body).context("chart response is not valid JSON")?;

    if let Some(err) = root["chart"]["error"].as_object() {
        anyhow::bail!(
            "chart API error: {}",
            err.get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("unknown")
        );
    }

    let result = root["chart"]["result"]
        .get(0)
        .context("chart response has no result")?;

    let timestamps = result["timestamp"]
        .as_array()
        .context("chart response has no timestamp array")?;

    let quote = result["indicators"]["quote"]
        .get(0)
        .context("chart response has no quote block")?;

    let opens = quote_field(quote, "open")?;
    let highs = quote_field(quote, "high")?;
    let lows = quote_field(quote, "low")?;
    let closes = quote_field(quote, "close")?;
    let volumes = quote_field(quote, "volume")?;

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let ts = ts.as_i64().with_context(|| format!("timestamp {i} is not an integer"))?;

        // Null in any OHLC slot drops the whole row.
        let row = (
            opens.get(i).and_then(|v| v.as_f64()),
            highs.get(i).and_then(|v| v.as_f64()),
            lows.get(i).and_then(|v| v.as_f64()),
            closes.get(i).and_then(|v| v.as_f64()),
        );
        let (Some(open), Some(high), Some(low), Some(close)) = row else {
            continue;
        };

        bars.push(Bar {
            timestamp: ts * 1000,
            open,
            high,
            low,
            close,
            volume: volumes.get(i).and_then(|v| v.as_f64()).unwrap_or(0.0),
        });
    }

    Ok(bars)
}

fn quote_field<'a>(
    quote: &'a serde_json::Value,
    name: &str,
) -> Result<&'a Vec<serde_json::Value>> {
    quote[name]
        .as_array()
        .with_context(|| format!("quote block missing {name} array"))
}
