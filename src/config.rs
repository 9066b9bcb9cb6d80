// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

/// Optional override file, looked up in the working directory.
pub const CONFIG_FILE: &str = "scamtracker.yaml";

pub const TRACKER_URL: &str = "https://dfpi.ca.gov/consumers/crypto/crypto-scam-tracker/";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub scrape: ScrapeConfig,
    pub categorize: CategorizeConfig,
}

impl Config {
    /// Defaults, overridden by `scamtracker.yaml` when it exists.
    pub fn load() -> Result<Self> {
        Self::from_path(CONFIG_FILE)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub scraped_csv: String,
    pub counts_csv: String,
    pub exploded_csv: String,
    pub chart_png: String,
    pub debug_dump: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            scraped_csv: "dfpi_crypto_scam_data.csv".into(),
            counts_csv: "scam_type_counts.csv".into(),
            exploded_csv: "dfpi_scams_exploded.csv".into(),
            chart_png: "scam_type_counts.png".into(),
            debug_dump: PathBuf::from("page_debug.html"),
        }
    }
}

impl Paths {
    pub fn scraped_csv(&self) -> PathBuf {
        self.data_dir.join(&self.scraped_csv)
    }

    pub fn counts_csv(&self) -> PathBuf {
        self.data_dir.join(&self.counts_csv)
    }

    pub fn exploded_csv(&self) -> PathBuf {
        self.data_dir.join(&self.exploded_csv)
    }

    pub fn chart_png(&self) -> PathBuf {
        self.data_dir.join(&self.chart_png)
    }
}

/// Which [`PageSource`](crate::scrape::PageSource) drives the scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Chrome,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub url: Url,
    pub source: SourceKind,
    pub headless: bool,
    /// Fixed wait after the first navigation, while the page clears its
    /// bot check.
    pub settle_secs: u64,
    pub wait_timeout_secs: u64,
    pub table_selector: String,
    pub page_size: u32,
    pub max_pages: usize,
    pub pace_min_ms: u64,
    pub pace_max_ms: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(TRACKER_URL).expect("tracker URL is valid"),
            source: SourceKind::Chrome,
            headless: true,
            settle_secs: 5,
            wait_timeout_secs: 10,
            table_selector: "td.column-1".into(),
            page_size: 100,
            max_pages: 500,
            pace_min_ms: 1000,
            pace_max_ms: 2000,
        }
    }
}

impl ScrapeConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizeConfig {
    /// Label given to records whose raw `scam_type` is blank. `None` drops
    /// them from the exploded table.
    pub blank_label: Option<String>,
}
