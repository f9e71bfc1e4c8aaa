//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ManifestStats - survival statistics dashboard for the passenger manifest
///
/// Loads the passenger dataset once, computes survival rates by sex, class,
/// embarkation port and family size plus an age histogram, and writes the
/// result as a Markdown or JSON dashboard report.
///
/// Examples:
///   manifeststats --data titanic.csv
///   manifeststats --data titanic.csv --sex female --bin-size 5
///   manifeststats --data titanic.csv --format json --stdout
///   manifeststats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the passenger dataset (CSV with a header row)
    ///
    /// Overrides `dataset.path` from the config file.
    #[arg(short, long, value_name = "FILE", env = "MANIFESTSTATS_DATA")]
    pub data: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the report to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Width of the age histogram buckets, in years
    #[arg(long, value_name = "YEARS")]
    pub bin_size: Option<u32>,

    /// Only analyze passengers with this exact sex value
    ///
    /// Example: --sex female
    #[arg(long, value_name = "SEX")]
    pub sex: Option<String>,

    /// Field delimiter of the dataset
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Label for passengers with no recorded embarkation port
    #[arg(long, value_name = "LABEL")]
    pub unknown_port_label: Option<String>,

    /// Report title
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .manifeststats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .manifeststats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.bin_size == Some(0) {
            return Err("Bin size must be at least 1".to_string());
        }

        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err(format!(
                    "Delimiter must be a single ASCII character, got {:?}",
                    delimiter
                ));
            }
        }

        if let Some(ref sex) = self.sex {
            if sex.trim().is_empty() {
                return Err("Sex filter cannot be empty".to_string());
            }
        }

        if let Some(ref label) = self.unknown_port_label {
            if label.trim().is_empty() {
                return Err("Unknown port label cannot be empty".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref data) = self.data {
            if !data.is_file() {
                return Err(format!("Dataset file does not exist: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
