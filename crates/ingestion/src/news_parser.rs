//! News feed entry parsing.
//!
//! Turns raw provider entries into [`NewsItem`]s. A bad entry is skipped and
//! counted; it never aborts the feed.

use chrono::{NaiveDateTime, Timelike};
use newsprice_core::{NewsItem, TimestampSecs};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Accepted publish timestamp format (UTC, second precision).
pub const PUBLISH_TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Why a feed entry could not become a news item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Entry shape does not match the feed layout.
    #[error("malformed entry: {0}")]
    Malformed(String),

    /// A required field is absent or null.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Publish time is not in the accepted format.
    #[error("invalid publish timestamp: {0:?}")]
    InvalidTimestamp(String),
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    content: Option<RawContent>,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    title: Option<String>,
    summary: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` timestamp into epoch seconds.
///
/// The input must round-trip exactly, so unpadded fields, fractional seconds
/// and numeric offsets are all rejected. Leap seconds (`:60`) are rejected too.
pub fn parse_publish_ts(s: &str) -> Result<TimestampSecs, ParseError> {
    let dt = NaiveDateTime::parse_from_str(s, PUBLISH_TS_FORMAT)
        .map_err(|_| ParseError::InvalidTimestamp(s.to_string()))?;
    // chrono encodes a leap second as nanosecond >= 1e9
    if dt.nanosecond() >= 1_000_000_000 || dt.format(PUBLISH_TS_FORMAT).to_string() != s {
        return Err(ParseError::InvalidTimestamp(s.to_string()));
    }
    Ok(dt.and_utc().timestamp())
}

/// Parse a single raw feed entry.
pub fn parse_entry(entry: &Value) -> Result<NewsItem, ParseError> {
    let raw = RawEntry::deserialize(entry).map_err(|e| ParseError::Malformed(e.to_string()))?;
    let content = raw.content.ok_or(ParseError::MissingField("content"))?;

    let title = content.title.ok_or(ParseError::MissingField("title"))?;
    let summary = content.summary.ok_or(ParseError::MissingField("summary"))?;
    let pub_date = content.pub_date.ok_or(ParseError::MissingField("pubDate"))?;
    let publish_ts = parse_publish_ts(&pub_date)?;

    Ok(NewsItem {
        title,
        summary,
        publish_ts,
    })
}

/// Statistics about feed parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Entries offered to the parser.
    pub total: u64,
    /// Entries that produced a news item.
    pub parsed: u64,
    /// Entries skipped for any reason.
    pub skipped: u64,
    /// Skipped: required field missing.
    pub missing_field: u64,
    /// Skipped: bad publish timestamp.
    pub invalid_timestamp: u64,
    /// Skipped: unexpected entry shape.
    pub malformed: u64,
}

impl ParseStats {
    fn record_skip(&mut self, err: &ParseError) {
        self.skipped += 1;
        match err {
            ParseError::Malformed(_) => self.malformed += 1,
            ParseError::MissingField(_) => self.missing_field += 1,
            ParseError::InvalidTimestamp(_) => self.invalid_timestamp += 1,
        }
    }
}

/// Feed parser that accumulates skip statistics across entries.
#[derive(Debug, Default)]
pub struct NewsParser {
    stats: ParseStats,
}

impl NewsParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one entry, recording a skip on failure.
    pub fn parse(&mut self, entry: &Value) -> Option<NewsItem> {
        self.stats.total += 1;
        match parse_entry(entry) {
            Ok(item) => {
                self.stats.parsed += 1;
                Some(item)
            }
            Err(err) => {
                tracing::debug!(index = self.stats.total - 1, error = %err, "skipping news entry");
                self.stats.record_skip(&err);
                None
            }
        }
    }

    /// Parse a whole feed, keeping input order.
    pub fn parse_all(&mut self, entries: &[Value]) -> Vec<NewsItem> {
        let items: Vec<NewsItem> = entries.iter().filter_map(|e| self.parse(e)).collect();

        if self.stats.skipped > 0 {
            tracing::warn!(
                skipped = self.stats.skipped,
                missing_field = self.stats.missing_field,
                invalid_timestamp = self.stats.invalid_timestamp,
                malformed = self.stats.malformed,
                "skipped malformed news entries"
            );
        }
        tracing::info!(parsed = self.stats.parsed, total = self.stats.total, "parsed news feed");

        items
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }
}

/// Parse a feed with a fresh parser.
pub fn parse_feed(entries: &[Value]) -> (Vec<NewsItem>, ParseStats) {
    let mut parser = NewsParser::new();
    let items = parser.parse_all(entries);
    (items, parser.stats)
}
