use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use moka::future::Cache;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::QuoteClientConfig;
use crate::error::QuoteError;
use crate::models::quote::{TimeSeries, TimeSeriesPoint};
use crate::services::quote_source::QuoteSource;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

// Sessions fetched before an explicit date; a month covers the 10-session volume window
const LOOKBACK_DAYS: i64 = 31;

// Chart API response structures
#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    #[serde(default)]
    gmtoffset: i32,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Daily series from the Yahoo Finance chart API
#[derive(Clone)]
pub struct YahooChartClient {
    client: Client,
    config: QuoteClientConfig,
    cache: Arc<Cache<String, TimeSeries>>,
}

impl YahooChartClient {
    pub fn new(config: QuoteClientConfig) -> Result<Self, QuoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Ok(Self {
            client,
            config,
            cache: Arc::new(cache),
        })
    }

    async fn fetch_once(
        &self,
        symbol: &str,
        date: Option<NaiveDate>,
    ) -> Result<TimeSeries, QuoteError> {
        let url = format!("{}/v8/finance/chart/{}", self.config.base_url, symbol);

        let request = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(&[("interval", "1d")]);

        let request = match date {
            Some(date) => {
                let (period1, period2) = period_bounds(date);
                request.query(&[("period1", period1), ("period2", period2)])
            }
            None => request.query(&[("range", "1mo")]),
        };

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_chart(symbol, &body)
    }
}

#[async_trait]
impl QuoteSource for YahooChartClient {
    async fn fetch_series(
        &self,
        symbol: &str,
        date: Option<NaiveDate>,
    ) -> Result<TimeSeries, QuoteError> {
        let cache_key = match date {
            Some(date) => format!("{}_{}", symbol, date),
            None => format!("{}_latest", symbol),
        };

        if let Some(cached) = self.cache.get(&cache_key).await {
            tracing::debug!("Cache hit for {}", cache_key);
            return Ok(cached);
        }

        tracing::info!("Fetching daily chart for {}", symbol);

        let mut attempt = 0;
        let series = loop {
            match self.fetch_once(symbol, date).await {
                Ok(series) => break series,
                Err(e) if e.is_retryable() && attempt < self.config.retry_max => {
                    attempt += 1;
                    tracing::warn!(
                        "Fetch for {} failed ({}), retry {}/{}",
                        symbol,
                        e,
                        attempt,
                        self.config.retry_max
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        };

        self.cache.insert(cache_key, series.clone()).await;

        tracing::debug!("Fetched {} sessions for {}", series.points.len(), symbol);

        Ok(series)
    }
}

/// Epoch-second window covering the lookback month up to the day after `date`
fn period_bounds(date: NaiveDate) -> (i64, i64) {
    let start = date - ChronoDuration::days(LOOKBACK_DAYS);
    let end = date + ChronoDuration::days(2);
    let to_epoch = |d: NaiveDate| {
        d.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default()
    };
    (to_epoch(start), to_epoch(end))
}

/// Turn a chart API payload into a series, aligning close/volume by position
fn parse_chart(symbol: &str, body: &str) -> Result<TimeSeries, QuoteError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| QuoteError::Malformed(e.to_string()))?;

    if let Some(error) = envelope.chart.error {
        return Err(QuoteError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| QuoteError::NotFound(symbol.to_string()))?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| QuoteError::Malformed(format!("no quote block for {}", symbol)))?;

    let mut points: Vec<TimeSeriesPoint> = result
        .timestamp
        .iter()
        .enumerate()
        .map(|(i, &timestamp)| TimeSeriesPoint {
            timestamp,
            close: quote.close.get(i).copied().flatten(),
            volume: quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.round() as u64),
        })
        .collect();

    points.sort_by_key(|p| p.timestamp);

    let symbol = result
        .meta
        .symbol
        .map(|s| s.to_uppercase())
        .unwrap_or_else(|| symbol.to_uppercase());

    Ok(TimeSeries::new(symbol, points).with_utc_offset(result.meta.gmtoffset))
}
