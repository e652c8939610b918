//! Dataset summary statistics.
//!
//! Describes the label distribution of a finished dataset.

use newsprice_core::{Direction, LabeledRecord};
use ordered_float::OrderedFloat;
use serde::Serialize;
use statrs::statistics::{Data, Median, Statistics};

/// Label distribution of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    /// Number of records.
    pub count: usize,
    /// Records whose price fell (positive delta).
    pub falls: usize,
    /// Records whose price rose (negative delta).
    pub rises: usize,
    /// Records with no change.
    pub flats: usize,
    /// Mean percentage.
    pub mean_percentage: Option<f64>,
    /// Sample standard deviation of percentage (needs two records).
    pub std_dev_percentage: Option<f64>,
    /// Median percentage.
    pub median_percentage: Option<f64>,
    /// Largest positive percentage (biggest fall).
    pub largest_fall_pct: Option<f64>,
    /// Most negative percentage (biggest rise).
    pub largest_rise_pct: Option<f64>,
}

impl DatasetSummary {
    /// Summarize a set of records.
    pub fn from_records(records: &[LabeledRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            count: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.direction() {
                Direction::Fall => summary.falls += 1,
                Direction::Rise => summary.rises += 1,
                Direction::Flat => summary.flats += 1,
            }
        }

        let pcts: Vec<f64> = records.iter().map(|r| r.percentage).collect();

        summary.mean_percentage = finite(pcts.iter().mean());
        summary.std_dev_percentage = finite(pcts.iter().std_dev());
        summary.median_percentage = finite(Data::new(pcts.clone()).median());

        summary.largest_fall_pct = pcts
            .iter()
            .copied()
            .filter(|p| *p > 0.0)
            .max_by_key(|p| OrderedFloat(*p));
        summary.largest_rise_pct = pcts
            .iter()
            .copied()
            .filter(|p| *p < 0.0)
            .min_by_key(|p| OrderedFloat(*p));

        summary
    }

    /// Fraction of records labeled as a fall.
    pub fn fall_ratio(&self) -> f64 {
        if self.count > 0 {
            self.falls as f64 / self.count as f64
        } else {
            0.0
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(percentage: f64) -> LabeledRecord {
        LabeledRecord {
            title: "t".to_string(),
            summary: "s".to_string(),
            publish_ts: 0,
            bucket_start: 0,
            price_at_publish: 100.0,
            price_after_window: 100.0 - percentage,
            delta: percentage,
            percentage,
        }
    }

    #[test]
    fn test_empty() {
        let summary = DatasetSummary::from_records(&[]);
        assert_eq!(summary, DatasetSummary::default());
        assert_eq!(summary.fall_ratio(), 0.0);
    }

    #[test]
    fn test_single_record() {
        let summary = DatasetSummary::from_records(&[record(2.0)]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.falls, 1);
        assert_relative_eq!(summary.mean_percentage.unwrap(), 2.0);
        assert_relative_eq!(summary.median_percentage.unwrap(), 2.0);
        assert_eq!(summary.std_dev_percentage, None);
        assert_eq!(summary.largest_fall_pct, Some(2.0));
        assert_eq!(summary.largest_rise_pct, None);
    }

    #[test]
    fn test_distribution() {
        let records = vec![record(4.0), record(-2.0), record(0.0), record(1.0), record(-6.0)];
        let summary = DatasetSummary::from_records(&records);

        assert_eq!(summary.count, 5);
        assert_eq!(summary.falls, 2);
        assert_eq!(summary.rises, 2);
        assert_eq!(summary.flats, 1);
        assert_relative_eq!(summary.mean_percentage.unwrap(), -0.6, epsilon = 1e-12);
        assert_relative_eq!(summary.median_percentage.unwrap(), 0.0);
        // Sample (n - 1) variance
        let mean = -0.6;
        let var: f64 = [4.0f64, -2.0, 0.0, 1.0, -6.0]
            .iter()
            .map(|x| (x - mean) * (x - mean))
            .sum::<f64>()
            / 4.0;
        assert_relative_eq!(summary.std_dev_percentage.unwrap(), var.sqrt(), epsilon = 1e-9);
        assert_eq!(summary.largest_fall_pct, Some(4.0));
        assert_eq!(summary.largest_rise_pct, Some(-6.0));
        assert_relative_eq!(summary.fall_ratio(), 0.4);
    }
}
