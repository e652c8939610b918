//! Data ingestion and normalization for the newsprice system.
//!
//! This crate handles:
//! - Price bucketing (raw samples to a bucket-keyed series)
//! - News feed parsing with per-entry skip accounting

pub mod news_parser;
pub mod price_series;

pub use news_parser::{parse_entry, parse_feed, NewsParser, ParseError, ParseStats};
pub use price_series::{PriceSeries, SeriesStats};
