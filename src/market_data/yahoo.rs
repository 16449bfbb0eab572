// =============================================================================
// Yahoo Finance chart API client — daily OHLCV history
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?range={n}d&interval=1d
//
// The response carries parallel arrays: `timestamp` plus
// `indicators.quote[0].{open,high,low,close,volume}`. Any element may be null
// (halted days, partial rows); such rows are dropped. Timestamps are shifted
// by the exchange `gmtoffset` before taking the calendar date.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{ChartError, Result};
use crate::market_data::provider::QuoteProvider;
use crate::types::{Bar, QuoteSeries};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Request timeout for every call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// -----------------------------------------------------------------------------
// Wire types
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartMeta {
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteArrays>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteArrays {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

// -----------------------------------------------------------------------------
// Client
// -----------------------------------------------------------------------------

/// Yahoo Finance REST client.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a client against the public endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (mirrors, local stubs).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        // The endpoint rejects requests without a browser-like agent.
        default_headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0 quote-charts"));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl QuoteProvider for YahooClient {
    #[instrument(skip(self), name = "yahoo::fetch_daily")]
    async fn fetch_daily(&self, symbol: &str, window_days: u32) -> Result<QuoteSeries> {
        let range = format!("{window_days}d");
        let resp = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("range", range.as_str()), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| ChartError::unavailable(symbol, format!("request failed: {e}")))?;

        let status = resp.status();
        let body: ChartResponse = resp
            .json()
            .await
            .map_err(|e| ChartError::unavailable(symbol, format!("unreadable response ({status}): {e}")))?;

        if !status.is_success() && body.chart.error.is_none() {
            return Err(ChartError::unavailable(symbol, format!("HTTP {status}")));
        }

        let series = parse_chart(symbol, body)?;
        debug!(symbol, rows = series.len(), "daily history retrieved");
        Ok(series)
    }
}

// -----------------------------------------------------------------------------
// Parsing
// -----------------------------------------------------------------------------

/// Convert a chart response into a validated series.
pub fn parse_chart(symbol: &str, response: ChartResponse) -> Result<QuoteSeries> {
    if let Some(err) = response.chart.error {
        return Err(ChartError::unavailable(
            symbol,
            format!("{}: {}", err.code, err.description),
        ));
    }

    let result = response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| ChartError::unavailable(symbol, "empty result"))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut bars: Vec<Bar> = Vec::with_capacity(result.timestamp.len());
    let mut dropped = 0usize;

    for (i, &ts) in result.timestamp.iter().enumerate() {
        let at = |col: &Vec<Option<f64>>| col.get(i).copied().flatten();
        let fields = (
            to_date(ts + offset),
            at(&quote.open),
            at(&quote.high),
            at(&quote.low),
            at(&quote.close),
        );
        match fields {
            (Some(date), Some(open), Some(high), Some(low), Some(close)) => bars.push(Bar {
                date,
                open,
                high,
                low,
                close,
                volume: at(&quote.volume).unwrap_or(0.0),
            }),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(symbol, dropped, "dropped incomplete rows");
    }

    // Intraday snapshots can repeat the last session's date; keep the latest.
    bars.sort_by_key(|b| b.date);
    bars.reverse();
    bars.dedup_by_key(|b| b.date);
    bars.reverse();

    if bars.is_empty() {
        return Err(ChartError::unavailable(symbol, "no complete rows"));
    }

    QuoteSeries::new(bars)
}

fn to_date(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}
