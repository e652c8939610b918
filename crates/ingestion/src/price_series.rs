//! Bucketed price index.
//!
//! Collapses raw price samples of any granularity into fixed-width buckets
//! keyed by bucket start. Lookups are exact: a bucket with no sample is absent.

use newsprice_core::{bucket_start, Error, PriceSample, Result, TimestampSecs};
use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics collected while building a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeriesStats {
    /// Raw samples offered to the builder.
    pub samples_seen: u64,
    /// Samples rejected for a non-finite price or an unbucketable timestamp.
    pub samples_rejected: u64,
    /// Samples that replaced an earlier sample in the same bucket.
    pub collisions: u64,
}

/// Immutable mapping from bucket start to price.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    /// Bucket width in seconds.
    window_secs: i64,
    /// Price per bucket, keyed by bucket start.
    buckets: BTreeMap<TimestampSecs, f64>,
    /// Build statistics.
    stats: SeriesStats,
}

impl PriceSeries {
    /// Build a series from raw samples.
    ///
    /// Samples landing in the same bucket overwrite each other in input order,
    /// so the last one wins.
    pub fn from_samples<I>(samples: I, window_secs: i64) -> Result<Self>
    where
        I: IntoIterator<Item = PriceSample>,
    {
        if window_secs <= 0 {
            return Err(Error::config(format!(
                "price series window must be positive, got {window_secs}"
            )));
        }

        let mut buckets = BTreeMap::new();
        let mut stats = SeriesStats::default();

        for sample in samples {
            stats.samples_seen += 1;
            let key = match bucket_start(sample.ts, window_secs) {
                Some(key) if sample.price.is_finite() => key,
                _ => {
                    stats.samples_rejected += 1;
                    continue;
                }
            };
            if buckets.insert(key, sample.price).is_some() {
                stats.collisions += 1;
            }
        }

        if stats.samples_rejected > 0 {
            tracing::warn!(
                rejected = stats.samples_rejected,
                "dropped unusable price samples"
            );
        }
        tracing::debug!(
            window_secs,
            buckets = buckets.len(),
            samples = stats.samples_seen,
            collisions = stats.collisions,
            "built price series"
        );

        Ok(Self {
            window_secs,
            buckets,
            stats,
        })
    }

    /// Bucket width in seconds.
    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    /// Price of the bucket starting at `bucket`, if any.
    ///
    /// `bucket` must be a bucket start; raw timestamps are not rounded.
    pub fn get(&self, bucket: TimestampSecs) -> Option<f64> {
        self.buckets.get(&bucket).copied()
    }

    pub fn contains(&self, bucket: TimestampSecs) -> bool {
        self.buckets.contains_key(&bucket)
    }

    /// Number of populated buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Iterate over (bucket start, price) in ascending time order.
    pub fn iter(&self) -> impl Iterator<Item = (TimestampSecs, f64)> + '_ {
        self.buckets.iter().map(|(&ts, &price)| (ts, price))
    }

    /// Earliest populated bucket.
    pub fn first_bucket(&self) -> Option<TimestampSecs> {
        self.buckets.keys().next().copied()
    }

    /// Latest populated bucket.
    pub fn last_bucket(&self) -> Option<TimestampSecs> {
        self.buckets.keys().next_back().copied()
    }

    /// Statistics from construction.
    pub fn stats(&self) -> &SeriesStats {
        &self.stats
    }
}
