//! Core data types for the newsprice system.

use serde::{Deserialize, Serialize};

/// Timestamp in whole seconds since Unix epoch (UTC).
pub type TimestampSecs = i64;

/// Default alignment window: 5 minutes.
pub const DEFAULT_WINDOW_SECS: i64 = 300;

/// Start of the bucket of width `window_secs` containing `ts`.
///
/// Uses Euclidean remainder, so `bucket_start(ts, w) <= ts < bucket_start(ts, w) + w`
/// also holds for timestamps before the epoch. `window_secs` must be positive.
/// Returns `None` when the bucket start is not representable (near `i64::MIN`).
#[inline]
pub fn bucket_start(ts: TimestampSecs, window_secs: i64) -> Option<TimestampSecs> {
    debug_assert!(window_secs > 0, "window must be positive");
    ts.checked_sub(ts.rem_euclid(window_secs))
}

/// A single raw price observation from the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Timestamp in seconds.
    pub ts: TimestampSecs,
    /// Observed price.
    pub price: f64,
}

impl PriceSample {
    pub fn new(ts: TimestampSecs, price: f64) -> Self {
        Self { ts, price }
    }
}

/// A news article normalized from a raw feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Headline.
    pub title: String,
    /// Short summary / teaser text.
    pub summary: String,
    /// Publication time in seconds (UTC).
    pub publish_ts: TimestampSecs,
}

/// Direction of the price move captured by a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Price went down over the window (positive delta).
    Fall,
    /// Price went up over the window (negative delta).
    Rise,
    /// No change.
    Flat,
}

/// A news item joined with the price before and after the alignment window.
///
/// `delta` is `price_at_publish - price_after_window`, so a positive delta
/// (and percentage) means the price fell. Field names are the on-disk format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub title: String,
    pub summary: String,
    pub publish_ts: TimestampSecs,
    /// Bucket containing `publish_ts`.
    pub bucket_start: TimestampSecs,
    pub price_at_publish: f64,
    pub price_after_window: f64,
    pub delta: f64,
    /// `delta / price_at_publish * 100`.
    pub percentage: f64,
}

impl LabeledRecord {
    /// Direction of the move under the positive-means-fall convention.
    pub fn direction(&self) -> Direction {
        if self.delta > 0.0 {
            Direction::Fall
        } else if self.delta < 0.0 {
            Direction::Rise
        } else {
            Direction::Flat
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_start() {
        assert_eq!(bucket_start(0, 300), Some(0));
        assert_eq!(bucket_start(250, 300), Some(0));
        assert_eq!(bucket_start(300, 300), Some(300));
        assert_eq!(bucket_start(650, 300), Some(600));
        // 2024-01-01 00:07:30 -> 00:05:00
        assert_eq!(bucket_start(1704067650, 300), Some(1704067500));
    }

    #[test]
    fn test_bucket_start_bounds() {
        for w in [1i64, 60, 300, 3600] {
            for t in [-7201i64, -301, -1, 0, 1, 299, 300, 301, 1704067290] {
                let b = bucket_start(t, w).unwrap();
                assert!(b <= t && t < b + w, "t={t} w={w} b={b}");
                assert_eq!(b.rem_euclid(w), 0);
            }
        }
    }

    #[test]
    fn test_bucket_start_negative() {
        assert_eq!(bucket_start(-1, 300), Some(-300));
        assert_eq!(bucket_start(-300, 300), Some(-300));
    }

    #[test]
    fn test_bucket_start_extremes() {
        assert_eq!(bucket_start(i64::MIN, 300), None);
        assert_eq!(bucket_start(i64::MIN, 1), Some(i64::MIN));
        // i64::MAX = 30744573456182586 * 300 + 7
        assert_eq!(bucket_start(i64::MAX, 300), Some(i64::MAX - 7));
    }

    #[test]
    fn test_record_field_names() {
        let record = LabeledRecord {
            title: "t".to_string(),
            summary: "s".to_string(),
            publish_ts: 250,
            bucket_start: 0,
            price_at_publish: 100.0,
            price_after_window: 90.0,
            delta: 10.0,
            percentage: 10.0,
        };
        let value = serde_json::to_value(&record).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "bucket_start",
                "delta",
                "percentage",
                "price_after_window",
                "price_at_publish",
                "publish_ts",
                "summary",
                "title",
            ]
        );
    }

    #[test]
    fn test_direction() {
        let mut record = LabeledRecord {
            title: String::new(),
            summary: String::new(),
            publish_ts: 0,
            bucket_start: 0,
            price_at_publish: 100.0,
            price_after_window: 95.0,
            delta: 5.0,
            percentage: 5.0,
        };
        assert_eq!(record.direction(), Direction::Fall);
        record.delta = -5.0;
        assert_eq!(record.direction(), Direction::Rise);
        record.delta = 0.0;
        assert_eq!(record.direction(), Direction::Flat);
    }
}
