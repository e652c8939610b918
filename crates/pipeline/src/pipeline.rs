//! Dataset build pipeline.
//!
//! fetch -> parse -> align -> persist. All labeling decisions live in the
//! ingestion and labeling crates; this module only moves data between them
//! and the providers / disk.

use crate::provider::{NewsProvider, PriceProvider, PriceRequest};
use crate::snapshot::SnapshotStore;
use newsprice_core::{Config, LabeledRecord, PriceSample, Result};
use newsprice_ingestion::{NewsParser, ParseStats, PriceSeries, SeriesStats};
use newsprice_labeling::{AlignStats, Aligner, DatasetSummary};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Raw inputs of one run, as fetched or loaded from snapshots.
#[derive(Debug, Clone, Default)]
pub struct RawData {
    pub samples: Vec<PriceSample>,
    pub entries: Vec<Value>,
}

/// Labeled output plus the counters gathered on the way.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub records: Vec<LabeledRecord>,
    pub series: SeriesStats,
    pub parse: ParseStats,
    pub align: AlignStats,
    pub summary: DatasetSummary,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub symbol: String,
    pub dataset_path: PathBuf,
    pub records: usize,
    pub series: SeriesStats,
    pub parse: ParseStats,
    pub align: AlignStats,
    pub summary: DatasetSummary,
}

/// Paths written by a snapshot-only fetch.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotPaths {
    pub prices: PathBuf,
    pub news: PathBuf,
    pub samples: usize,
    pub entries: usize,
}

/// Build series, parse news, align and summarize. Pure: no I/O.
pub fn prepare(config: &Config, raw: &RawData) -> Result<Prepared> {
    let window_secs = config.alignment.window_secs;

    let series = PriceSeries::from_samples(raw.samples.iter().copied(), window_secs)?;
    tracing::info!(
        buckets = series.len(),
        first = ?series.first_bucket(),
        last = ?series.last_bucket(),
        "price series ready"
    );

    let mut parser = NewsParser::new();
    let items = parser.parse_all(&raw.entries);

    let alignment = Aligner::new(window_secs)?.align(&series, &items);
    let summary = DatasetSummary::from_records(&alignment.records);

    Ok(Prepared {
        records: alignment.records,
        series: series.stats().clone(),
        parse: parser.stats().clone(),
        align: alignment.stats,
        summary,
    })
}

fn persist(config: &Config, store: &SnapshotStore, prepared: Prepared) -> Result<RunReport> {
    let dataset_path = store.save_dataset(&prepared.records)?;

    tracing::info!(
        records = prepared.records.len(),
        path = %dataset_path.display(),
        falls = prepared.summary.falls,
        rises = prepared.summary.rises,
        fall_ratio = prepared.summary.fall_ratio(),
        mean_pct = ?prepared.summary.mean_percentage,
        "dataset saved"
    );

    Ok(RunReport {
        symbol: config.asset.symbol.clone(),
        dataset_path,
        records: prepared.records.len(),
        series: prepared.series,
        parse: prepared.parse,
        align: prepared.align,
        summary: prepared.summary,
    })
}

/// Rebuild the dataset from previously saved raw snapshots, without network.
pub fn prepare_from_snapshots(config: &Config) -> Result<RunReport> {
    config.validate()?;
    let store = SnapshotStore::new(config.output.clone(), config.asset.symbol.clone());

    let raw = RawData {
        samples: store.load_prices()?,
        entries: store.load_news()?,
    };
    tracing::info!(
        samples = raw.samples.len(),
        entries = raw.entries.len(),
        "loaded snapshots"
    );

    let prepared = prepare(config, &raw)?;
    persist(config, &store, prepared)
}

/// End-to-end dataset builder over a price and a news provider.
pub struct Pipeline<P, N> {
    config: Config,
    prices: P,
    news: N,
    store: SnapshotStore,
}

impl<P, N> Pipeline<P, N>
where
    P: PriceProvider,
    N: NewsProvider,
{
    /// Create a pipeline. Fails on an invalid configuration.
    pub fn new(config: Config, prices: P, news: N) -> Result<Self> {
        config.validate()?;
        let store = SnapshotStore::new(config.output.clone(), config.asset.symbol.clone());
        Ok(Self {
            config,
            prices,
            news,
            store,
        })
    }

    /// Fetch prices and news concurrently. Either failure fails the fetch.
    pub async fn fetch_raw(&self) -> Result<RawData> {
        let request = PriceRequest {
            symbol: self.config.asset.symbol.clone(),
            period: self.config.fetch.period.clone(),
            interval: self.config.fetch.interval.clone(),
        };
        tracing::info!(
            symbol = %request.symbol,
            prices = self.prices.name(),
            news = self.news.name(),
            "fetching raw data"
        );

        let (samples, entries) = tokio::try_join!(
            self.prices.fetch_prices(&request),
            self.news
                .fetch_news(&self.config.asset.symbol, self.config.fetch.news_count),
        )?;

        Ok(RawData { samples, entries })
    }

    /// Fetch and persist raw snapshots only.
    pub async fn fetch_snapshots(&self) -> Result<SnapshotPaths> {
        let raw = self.fetch_raw().await?;
        let prices = self.store.save_prices(&raw.samples)?;
        let news = self.store.save_news(&raw.entries)?;
        Ok(SnapshotPaths {
            prices,
            news,
            samples: raw.samples.len(),
            entries: raw.entries.len(),
        })
    }

    /// Full run: fetch, optionally snapshot, label and persist the dataset.
    pub async fn run(&self) -> Result<RunReport> {
        let raw = self.fetch_raw().await?;

        if self.config.output.save_raw_snapshots {
            self.store.save_prices(&raw.samples)?;
            self.store.save_news(&raw.entries)?;
        }

        let prepared = prepare(&self.config, &raw)?;
        persist(&self.config, &self.store, prepared)
    }
}
