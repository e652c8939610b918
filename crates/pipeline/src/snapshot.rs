//! On-disk JSON persistence.
//!
//! Raw price/news snapshots and the labeled dataset all live in the configured
//! data directory, named after the asset symbol. Files are written to a
//! temporary sibling and renamed into place, so readers never see a partial
//! document.

use newsprice_core::config::OutputConfig;
use newsprice_core::{Error, LabeledRecord, PriceSample, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Serialize `value` as 4-space indented JSON at `path`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    let written = write_pretty(&tmp, value);
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    {
        let mut ser = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut ser)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a JSON document from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::data(format!("snapshot not found: {}", path.display())),
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Snapshot files for one asset.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    output: OutputConfig,
    symbol: String,
}

impl SnapshotStore {
    pub fn new(output: OutputConfig, symbol: impl Into<String>) -> Self {
        Self {
            output,
            symbol: symbol.into(),
        }
    }

    pub fn prices_path(&self) -> PathBuf {
        self.output.prices_snapshot_path(&self.symbol)
    }

    pub fn news_path(&self) -> PathBuf {
        self.output.news_snapshot_path(&self.symbol)
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.output.dataset_path(&self.symbol)
    }

    /// Persist raw price samples.
    pub fn save_prices(&self, samples: &[PriceSample]) -> Result<PathBuf> {
        let path = self.prices_path();
        write_json(&path, samples)?;
        tracing::debug!(path = %path.display(), samples = samples.len(), "saved price snapshot");
        Ok(path)
    }

    pub fn load_prices(&self) -> Result<Vec<PriceSample>> {
        read_json(&self.prices_path())
    }

    /// Persist raw news entries exactly as fetched.
    pub fn save_news(&self, entries: &[Value]) -> Result<PathBuf> {
        let path = self.news_path();
        write_json(&path, entries)?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "saved news snapshot");
        Ok(path)
    }

    pub fn load_news(&self) -> Result<Vec<Value>> {
        read_json(&self.news_path())
    }

    /// Persist the labeled dataset.
    pub fn save_dataset(&self, records: &[LabeledRecord]) -> Result<PathBuf> {
        let path = self.dataset_path();
        write_json(&path, records)?;
        Ok(path)
    }
}
