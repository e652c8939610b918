//! Upstream data provider seams.
//!
//! The pipeline only talks to these traits, so tests can feed it in-memory
//! data and the network client stays swappable.

use async_trait::async_trait;
use newsprice_core::{PriceSample, Result};
use serde_json::Value;

/// Parameters of a price history request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRequest {
    /// Provider ticker symbol.
    pub symbol: String,
    /// Lookback period (e.g. "60d").
    pub period: String,
    /// Sampling interval (e.g. "1m").
    pub interval: String,
}

/// Source of raw price samples.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch price samples for the requested window.
    async fn fetch_prices(&self, request: &PriceRequest) -> Result<Vec<PriceSample>>;

    fn name(&self) -> &'static str;
}

/// Source of raw news feed entries.
///
/// Entries are returned untouched; parsing happens in ingestion so that a bad
/// entry costs one item instead of the whole fetch.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetch up to `count` recent entries for `symbol`.
    async fn fetch_news(&self, symbol: &str, count: u32) -> Result<Vec<Value>>;

    fn name(&self) -> &'static str;
}
