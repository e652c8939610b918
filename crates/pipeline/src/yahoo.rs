//! Yahoo Finance providers.
//!
//! Prices come from the v8 chart endpoint, news from the `ncp` stream used
//! by the quote pages.

use crate::provider::{NewsProvider, PriceProvider, PriceRequest};
use async_trait::async_trait;
use newsprice_core::config::{FetchConfig, PriceField};
use newsprice_core::{Error, PriceSample, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteColumns {
    open: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
}

/// Convert a chart response body into price samples.
///
/// Null cells (no trades in that interval) are skipped.
fn samples_from_chart(body: &str, field: PriceField) -> Result<Vec<PriceSample>> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(Error::fetch(format!(
            "Yahoo API error: {} - {}",
            error.code, error.description
        )));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| Error::fetch("Yahoo chart response has no result"))?;

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| Error::fetch("Yahoo chart response has no quote data"))?;

    let column = match field {
        PriceField::Open => quote.open,
        PriceField::Close => quote.close,
    };

    if column.len() != data.timestamp.len() {
        return Err(Error::fetch(format!(
            "Yahoo chart {field} column has {} values for {} timestamps",
            column.len(),
            data.timestamp.len()
        )));
    }

    let samples = data
        .timestamp
        .iter()
        .zip(column)
        .filter_map(|(&ts, price)| price.map(|p| PriceSample::new(ts, p)))
        .collect();

    Ok(samples)
}

/// Extract raw entries from a news stream body, dropping advertisements.
fn entries_from_stream(body: &Value) -> Vec<Value> {
    let Some(stream) = body
        .pointer("/data/tickerStream/stream")
        .and_then(Value::as_array)
    else {
        tracing::warn!("news response has no stream; treating as empty");
        return Vec::new();
    };

    stream
        .iter()
        .filter(|entry| !is_ad(entry))
        .cloned()
        .collect()
}

fn is_ad(entry: &Value) -> bool {
    match entry.get("ad") {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Bool(flag)) => *flag,
        Some(_) => true,
    }
}

/// Chart endpoint for `symbol`, with the symbol percent-encoded as a path segment.
fn chart_url(base: &str, symbol: &str) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| Error::config(format!("invalid chart base URL {base:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| Error::config(format!("chart base URL {base:?} cannot have a path")))?
        .pop_if_empty()
        .extend(["v8", "finance", "chart", symbol]);
    Ok(url)
}

/// Yahoo Finance HTTP client.
#[derive(Clone)]
pub struct YahooClient {
    chart_base_url: String,
    news_base_url: String,
    price_field: PriceField,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a client from the fetch configuration.
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::fetch(format!("building HTTP client: {e}")))?;

        Ok(Self {
            chart_base_url: config.chart_base_url.trim_end_matches('/').to_string(),
            news_base_url: config.news_base_url.trim_end_matches('/').to_string(),
            price_field: config.price_field,
            client,
        })
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::fetch(format!("GET {url}: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("reading body of {url}: {e}")))
    }
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch_prices(&self, request: &PriceRequest) -> Result<Vec<PriceSample>> {
        let url = chart_url(&self.chart_base_url, &request.symbol)?;
        tracing::info!(%url, field = %self.price_field, "fetching prices");

        let query = [
            ("interval", request.interval.as_str()),
            ("range", request.period.as_str()),
        ];
        let body = self.get_text(url.as_str(), &query).await?;
        let samples = samples_from_chart(&body, self.price_field)?;

        tracing::info!(samples = samples.len(), symbol = %request.symbol, "fetched prices");
        Ok(samples)
    }

    fn name(&self) -> &'static str {
        "yahoo-chart"
    }
}

#[async_trait]
impl NewsProvider for YahooClient {
    async fn fetch_news(&self, symbol: &str, count: u32) -> Result<Vec<Value>> {
        let url = format!("{}/xhr/ncp", self.news_base_url);
        let payload = json!({
            "serviceConfig": {
                "snippetCount": count,
                "s": [symbol],
            }
        });
        tracing::info!(%url, count, symbol, "fetching news");

        let body: Value = self
            .client
            .post(&url)
            .query(&[("queryRef", "latestNews"), ("serviceKey", "ncp_fin")])
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::fetch(format!("POST {url}: {e}")))?
            .json()
            .await
            .map_err(|e| Error::fetch(format!("decoding news response: {e}")))?;

        let entries = entries_from_stream(&body);
        tracing::info!(entries = entries.len(), symbol, "fetched news");
        Ok(entries)
    }

    fn name(&self) -> &'static str {
        "yahoo-news"
    }
}
