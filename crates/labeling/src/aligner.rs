//! News-to-price alignment.
//!
//! Each news item is placed in the bucket containing its publish time and
//! labeled with the move between that bucket and the next window. Items whose
//! buckets are not in the series are dropped; that is the common case for
//! news outside the series' range or during gaps.

use newsprice_core::{bucket_start, Error, LabeledRecord, NewsItem, Result};
use newsprice_ingestion::PriceSeries;
use serde::Serialize;

/// Why an item produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No price for the publish bucket.
    MissingPublishBucket,
    /// No price one window after the publish bucket.
    MissingFutureBucket,
    /// Publish price is zero, so the percentage is undefined.
    UndefinedPercentage,
}

/// Alignment counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlignStats {
    /// News items considered.
    pub considered: u64,
    /// Records emitted.
    pub labeled: u64,
    pub missing_publish_bucket: u64,
    pub missing_future_bucket: u64,
    pub undefined_percentage: u64,
}

impl AlignStats {
    fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingPublishBucket => self.missing_publish_bucket += 1,
            DropReason::MissingFutureBucket => self.missing_future_bucket += 1,
            DropReason::UndefinedPercentage => self.undefined_percentage += 1,
        }
    }

    /// Items that produced no record.
    pub fn dropped(&self) -> u64 {
        self.missing_publish_bucket + self.missing_future_bucket + self.undefined_percentage
    }
}

/// Output of an alignment pass.
#[derive(Debug, Clone, Default)]
pub struct Alignment {
    /// Labeled records in input order.
    pub records: Vec<LabeledRecord>,
    pub stats: AlignStats,
}

/// Labels news items against a price series.
#[derive(Debug, Clone)]
pub struct Aligner {
    /// Bucket width and look-ahead horizon in seconds.
    window_secs: i64,
}

impl Aligner {
    /// Create an aligner with the given window.
    pub fn new(window_secs: i64) -> Result<Self> {
        if window_secs <= 0 {
            return Err(Error::config(format!(
                "alignment window must be positive, got {window_secs}"
            )));
        }
        Ok(Self { window_secs })
    }

    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    /// Label a single item.
    ///
    /// `delta` is publish price minus future price: positive when the price fell.
    pub fn label(
        &self,
        series: &PriceSeries,
        item: &NewsItem,
    ) -> std::result::Result<LabeledRecord, DropReason> {
        let index = bucket_start(item.publish_ts, self.window_secs)
            .ok_or(DropReason::MissingPublishBucket)?;

        let price = series
            .get(index)
            .ok_or(DropReason::MissingPublishBucket)?;
        let future_price = index
            .checked_add(self.window_secs)
            .and_then(|next| series.get(next))
            .ok_or(DropReason::MissingFutureBucket)?;

        if price == 0.0 {
            return Err(DropReason::UndefinedPercentage);
        }

        let delta = price - future_price;
        let percentage = (delta / price) * 100.0;
        // Overflow with subnormal prices
        if !percentage.is_finite() {
            return Err(DropReason::UndefinedPercentage);
        }

        Ok(LabeledRecord {
            title: item.title.clone(),
            summary: item.summary.clone(),
            publish_ts: item.publish_ts,
            bucket_start: index,
            price_at_publish: price,
            price_after_window: future_price,
            delta,
            percentage,
        })
    }

    /// Label every item, preserving input order and skipping drops.
    pub fn align(&self, series: &PriceSeries, items: &[NewsItem]) -> Alignment {
        if self.window_secs % series.window_secs() != 0 {
            tracing::warn!(
                window_secs = self.window_secs,
                series_window_secs = series.window_secs(),
                "alignment window is not a multiple of the series bucket width"
            );
        }

        let mut stats = AlignStats::default();
        let mut records = Vec::with_capacity(items.len());

        for item in items {
            stats.considered += 1;
            match self.label(series, item) {
                Ok(record) => {
                    stats.labeled += 1;
                    records.push(record);
                }
                Err(reason) => {
                    if reason == DropReason::UndefinedPercentage {
                        tracing::warn!(
                            publish_ts = item.publish_ts,
                            title = %item.title,
                            "undefined percentage for publish price, dropping item"
                        );
                    } else {
                        tracing::debug!(
                            publish_ts = item.publish_ts,
                            ?reason,
                            "no price for news item"
                        );
                    }
                    stats.record_drop(reason);
                }
            }
        }

        tracing::info!(
            labeled = stats.labeled,
            dropped = stats.dropped(),
            considered = stats.considered,
            "aligned news with prices"
        );

        Alignment { records, stats }
    }
}

/// Align `items` against `series` with a window of `window_secs`.
pub fn align(
    series: &PriceSeries,
    items: &[NewsItem],
    window_secs: i64,
) -> Result<Vec<LabeledRecord>> {
    Ok(Aligner::new(window_secs)?.align(series, items).records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use newsprice_core::PriceSample;

    fn series(points: &[(i64, f64)]) -> PriceSeries {
        PriceSeries::from_samples(
            points.iter().map(|&(ts, price)| PriceSample::new(ts, price)),
            300,
        )
        .unwrap()
    }

    fn news(title: &str, publish_ts: i64) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            summary: format!("{title} summary"),
            publish_ts,
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let series = series(&[(0, 100.0), (300, 90.0), (600, 100.0)]);
        let items = vec![news("in range", 250), news("future missing", 650)];

        let alignment = Aligner::new(300).unwrap().align(&series, &items);

        assert_eq!(alignment.records.len(), 1);
        let record = &alignment.records[0];
        assert_eq!(record.title, "in range");
        assert_eq!(record.summary, "in range summary");
        assert_eq!(record.publish_ts, 250);
        assert_eq!(record.bucket_start, 0);
        assert_relative_eq!(record.price_at_publish, 100.0);
        assert_relative_eq!(record.price_after_window, 90.0);
        assert_relative_eq!(record.delta, 10.0);
        assert_relative_eq!(record.percentage, 10.0);

        assert_eq!(alignment.stats.considered, 2);
        assert_eq!(alignment.stats.labeled, 1);
        assert_eq!(alignment.stats.missing_future_bucket, 1);
    }

    #[test]
    fn test_sign_convention() {
        let aligner = Aligner::new(300).unwrap();

        let falling = series(&[(0, 100.0), (300, 95.0)]);
        let record = aligner.label(&falling, &news("fall", 10)).unwrap();
        assert_relative_eq!(record.delta, 5.0);
        assert_relative_eq!(record.percentage, 5.0);

        let rising = series(&[(0, 80.0), (300, 90.0)]);
        let record = aligner.label(&rising, &news("rise", 10)).unwrap();
        assert_relative_eq!(record.delta, -10.0);
        assert_relative_eq!(record.percentage, -12.5);
    }

    #[test]
    fn test_drop_reasons() {
        let series = series(&[(300, 100.0), (900, 100.0)]);
        let aligner = Aligner::new(300).unwrap();

        assert_eq!(
            aligner.label(&series, &news("before range", 10)),
            Err(DropReason::MissingPublishBucket)
        );
        assert_eq!(
            aligner.label(&series, &news("gap after", 310)),
            Err(DropReason::MissingFutureBucket)
        );
    }

    #[test]
    fn test_extreme_publish_timestamps() {
        let last = i64::MAX - 7;
        let series = series(&[(0, 1.0), (last, 2.0)]);
        let aligner = Aligner::new(300).unwrap();

        assert_eq!(
            aligner.label(&series, &news("end of time", i64::MAX)),
            Err(DropReason::MissingFutureBucket)
        );
        assert_eq!(
            aligner.label(&series, &news("start of time", i64::MIN)),
            Err(DropReason::MissingPublishBucket)
        );

        let alignment = aligner.align(
            &series,
            &[news("end of time", i64::MAX), news("start of time", i64::MIN)],
        );
        assert!(alignment.records.is_empty());
        assert_eq!(alignment.stats.missing_future_bucket, 1);
        assert_eq!(alignment.stats.missing_publish_bucket, 1);
    }

    #[test]
    fn test_zero_price_dropped() {
        let series = series(&[(0, 0.0), (300, 5.0), (600, 6.0)]);
        let alignment = Aligner::new(300)
            .unwrap()
            .align(&series, &[news("zero", 1), news("ok", 301)]);

        assert_eq!(alignment.records.len(), 1);
        assert_eq!(alignment.records[0].title, "ok");
        assert_eq!(alignment.stats.undefined_percentage, 1);
        assert!(alignment.records.iter().all(|r| r.percentage.is_finite()));
    }

    #[test]
    fn test_zero_future_price_is_labeled() {
        let series = series(&[(0, 50.0), (300, 0.0)]);
        let record = Aligner::new(300).unwrap().label(&series, &news("crash", 0)).unwrap();
        assert_relative_eq!(record.percentage, 100.0);
    }

    #[test]
    fn test_presence_iff_both_buckets() {
        let series = series(&[(0, 1.0), (300, 2.0), (900, 3.0), (1200, 4.0)]);
        let items: Vec<NewsItem> = (0..1500).step_by(50).map(|ts| news("n", ts)).collect();

        let records = align(&series, &items, 300).unwrap();

        for item in &items {
            let b = bucket_start(item.publish_ts, 300).unwrap();
            let expected = series.contains(b) && series.contains(b + 300);
            let present = records.iter().any(|r| r.publish_ts == item.publish_ts);
            assert_eq!(present, expected, "publish_ts={}", item.publish_ts);
        }
    }

    #[test]
    fn test_order_preserved() {
        let series = series(&[(0, 1.0), (300, 2.0), (600, 3.0), (900, 4.0)]);
        let items = vec![
            news("c", 700),
            news("dropped", 950),
            news("a", 10),
            news("b", 400),
            news("a2", 20),
        ];

        let records = align(&series, &items, 300).unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b", "a2"]);
    }

    #[test]
    fn test_idempotent_output() {
        let series = series(&[(0, 100.0), (300, 90.0), (600, 100.0)]);
        let items = vec![news("x", 250), news("y", 301), news("z", 650)];

        let first = serde_json::to_string(&align(&series, &items, 300).unwrap()).unwrap();
        let second = serde_json::to_string(&align(&series, &items, 300).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wider_window_over_finer_series() {
        // 600s labels over a 300s series: bucket 0 -> 600
        let series = series(&[(0, 100.0), (300, 90.0), (600, 80.0)]);
        let records = align(&series, &[news("wide", 599)], 600).unwrap();
        assert_eq!(records.len(), 1);
        assert_relative_eq!(records[0].price_after_window, 80.0);
        assert_relative_eq!(records[0].percentage, 20.0);
    }

    #[test]
    fn test_invalid_window() {
        assert!(Aligner::new(0).is_err());
        let series = series(&[(0, 1.0)]);
        assert!(align(&series, &[], -5).is_err());
    }

    #[test]
    fn test_empty_inputs() {
        let series = series(&[]);
        let alignment = Aligner::new(300).unwrap().align(&series, &[news("n", 0)]);
        assert!(alignment.records.is_empty());
        assert_eq!(alignment.stats.missing_publish_bucket, 1);
        assert_eq!(alignment.stats.dropped(), 1);
    }
}
