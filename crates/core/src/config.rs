//! Configuration structures for the newsprice system.

use crate::error::{Error, Result};
use crate::types::DEFAULT_WINDOW_SECS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration for a dataset build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Asset configuration.
    pub asset: AssetConfig,
    /// Upstream provider configuration.
    pub fetch: FetchConfig,
    /// Alignment configuration.
    pub alignment: AlignmentConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Parse a configuration from TOML text. Missing sections take defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let config = Self::read_toml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Deserialize a TOML file without validating it.
    ///
    /// For callers that layer further overrides on top and call
    /// [`Config::validate`] once at the end.
    pub fn read_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Check invariants that the rest of the system relies on.
    pub fn validate(&self) -> Result<()> {
        if self.asset.symbol.trim().is_empty() {
            return Err(Error::config("asset.symbol must not be empty"));
        }
        if self.alignment.window_secs <= 0 {
            return Err(Error::config(format!(
                "alignment.window_secs must be positive, got {}",
                self.alignment.window_secs
            )));
        }
        if self.fetch.period.trim().is_empty() || self.fetch.interval.trim().is_empty() {
            return Err(Error::config("fetch.period and fetch.interval must not be empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(Error::config("fetch.timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// Asset-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Provider ticker symbol (e.g., "BTC-USD").
    pub symbol: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC-USD".to_string(),
        }
    }
}

/// Which column of the provider's price bars becomes the sample price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    /// Bar open.
    Open,
    /// Bar close.
    #[default]
    Close,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceField::Open => write!(f, "open"),
            PriceField::Close => write!(f, "close"),
        }
    }
}

impl FromStr for PriceField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "close" => Ok(PriceField::Close),
            other => Err(format!("unknown price field '{other}' (expected open or close)")),
        }
    }
}

/// Upstream data provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Historical lookback (provider range syntax, e.g. "60d").
    pub period: String,
    /// Sampling interval (provider syntax, e.g. "1m").
    pub interval: String,
    /// Number of news items to request.
    pub news_count: u32,
    /// Price column to use.
    pub price_field: PriceField,
    /// Base URL of the chart endpoint.
    pub chart_base_url: String,
    /// Base URL of the news endpoint.
    pub news_base_url: String,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            period: "60d".to_string(),
            interval: "1m".to_string(),
            news_count: 1000,
            price_field: PriceField::Close,
            chart_base_url: "https://query1.finance.yahoo.com".to_string(),
            news_base_url: "https://finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Alignment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Bucket width and look-ahead horizon in seconds.
    pub window_secs: i64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for the dataset and raw snapshots.
    pub data_dir: PathBuf,
    /// Persist raw price/news snapshots alongside the dataset.
    pub save_raw_snapshots: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            save_raw_snapshots: true,
        }
    }
}

impl OutputConfig {
    /// Labeled dataset location for `symbol`.
    pub fn dataset_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}_news_with_price.json"))
    }

    /// Raw price snapshot location for `symbol`.
    pub fn prices_snapshot_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}_historical_data.json"))
    }

    /// Raw news snapshot location for `symbol`.
    pub fn news_snapshot_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}_news.json"))
    }
}
