//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.manifeststats.toml` files.

use crate::analysis::{DEFAULT_AGE_BIN_SIZE, DEFAULT_UNKNOWN_PORT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".manifeststats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where and how to read the passenger manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the delimited dataset file.
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Field delimiter (a single ASCII character).
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            delimiter: default_delimiter(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/passengers.csv")
}

fn default_delimiter() -> char {
    ','
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Width of the age histogram buckets, in years.
    #[serde(default = "default_age_bin_size")]
    pub age_bin_size: u32,

    /// Label for passengers with no embarkation port.
    #[serde(default = "default_unknown_port_label")]
    pub unknown_port_label: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            age_bin_size: default_age_bin_size(),
            unknown_port_label: default_unknown_port_label(),
        }
    }
}

fn default_age_bin_size() -> u32 {
    DEFAULT_AGE_BIN_SIZE
}

fn default_unknown_port_label() -> String {
    DEFAULT_UNKNOWN_PORT.to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Title shown at the top of the report.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            title: default_title(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("survival_dashboard.md")
}

fn default_title() -> String {
    "Passenger Survival Dashboard".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from `dir/.manifeststats.toml`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.dataset.path = data.clone();
        }
        if let Some(delimiter) = args.delimiter {
            self.dataset.delimiter = delimiter;
        }

        if let Some(bin_size) = args.bin_size {
            self.analysis.age_bin_size = bin_size;
        }
        if let Some(ref label) = args.unknown_port_label {
            self.analysis.unknown_port_label = label.clone();
        }

        if let Some(ref output) = args.output {
            self.report.output = output.clone();
        }
        if let Some(ref title) = args.title {
            self.report.title = title.clone();
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.age_bin_size == 0 {
            anyhow::bail!("analysis.age_bin_size must be at least 1");
        }
        if self.analysis.unknown_port_label.trim().is_empty() {
            anyhow::bail!("analysis.unknown_port_label cannot be empty");
        }
        if !self.dataset.delimiter.is_ascii() {
            anyhow::bail!(
                "dataset.delimiter must be an ASCII character, got {:?}",
                self.dataset.delimiter
            );
        }
        Ok(())
    }

    /// The delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.dataset.delimiter as u8
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
