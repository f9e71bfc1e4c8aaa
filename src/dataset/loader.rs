//! CSV loading for the passenger manifest.
//!
//! Columns are located by header name, so both the lowercase manifest
//! export (`pclass,survived,...,home.dest`) and capitalized exports
//! (`Pclass,Survived,...`) load the same way.

use crate::models::Passenger;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be opened.
    #[error("failed to open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The input is not valid delimited text.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A column needed by the dashboard is absent from the header.
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    /// A numeric cell holds something that is not a number.
    #[error("line {line}: invalid number {value:?} in column `{column}`")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// Loader for delimited passenger data.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    delimiter: u8,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl DatasetLoader {
    /// Create a loader for the given field delimiter.
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Load all records from a file.
    pub fn load_path(&self, path: &Path) -> Result<Vec<Passenger>, DatasetError> {
        info!("Loading dataset: {}", path.display());

        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let records = self.load_reader(file)?;
        info!("Loaded {} passenger records", records.len());

        Ok(records)
    }

    /// Load all records from any reader. The first row must be a header.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Vec<Passenger>, DatasetError> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns = Columns::resolve(csv_reader.headers()?)?;
        let mut records = Vec::new();

        for (index, row) in csv_reader.records().enumerate() {
            let row = row?;

            if row.iter().all(str::is_empty) {
                continue;
            }

            // Header is line 1.
            let line = row
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 2);

            records.push(columns.parse(&row, line)?);
        }

        debug!("Parsed {} rows", records.len());
        Ok(records)
    }
}

/// Header positions of each known column.
#[derive(Debug)]
struct Columns {
    pclass: usize,
    survived: usize,
    sex: usize,
    name: Option<usize>,
    age: Option<usize>,
    sibsp: Option<usize>,
    parch: Option<usize>,
    ticket: Option<usize>,
    fare: Option<usize>,
    cabin: Option<usize>,
    embarked: Option<usize>,
    boat: Option<usize>,
    body: Option<usize>,
    home_dest: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, DatasetError> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);
        let require = |name: &'static str| find(name).ok_or(DatasetError::MissingColumn(name));

        Ok(Self {
            pclass: require("pclass")?,
            survived: require("survived")?,
            sex: require("sex")?,
            name: find("name"),
            age: find("age"),
            sibsp: find("sibsp"),
            parch: find("parch"),
            ticket: find("ticket"),
            fare: find("fare"),
            cabin: find("cabin"),
            embarked: find("embarked"),
            boat: find("boat"),
            body: find("body"),
            home_dest: find("homedest"),
        })
    }

    fn parse(&self, row: &StringRecord, line: u64) -> Result<Passenger, DatasetError> {
        let cell = |index: Option<usize>| index.and_then(|i| row.get(i)).unwrap_or("");
        let text = |index: Option<usize>| cell(index).to_string();

        Ok(Passenger {
            pclass: parse_whole(cell(Some(self.pclass)), "pclass", line)?,
            survived: parse_whole(cell(Some(self.survived)), "survived", line)?,
            name: text(self.name),
            sex: text(Some(self.sex)),
            age: parse_optional(cell(self.age), "age", line)?,
            sibsp: parse_whole(cell(self.sibsp), "sibsp", line)?,
            parch: parse_whole(cell(self.parch), "parch", line)?,
            ticket: text(self.ticket),
            fare: parse_optional(cell(self.fare), "fare", line)?,
            cabin: text(self.cabin),
            embarked: text(self.embarked),
            boat: text(self.boat),
            body: text(self.body),
            home_dest: text(self.home_dest),
        })
    }
}

/// Lowercase a header and drop separators, so `home.dest` == `homeDest`.
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| !matches!(c, '.' | '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse an integral cell. Empty cells read as 0; `"3.0"` reads as 3.
fn parse_whole<T>(value: &str, column: &'static str, line: u64) -> Result<T, DatasetError>
where
    T: TryFrom<i64> + Default,
{
    if value.is_empty() {
        return Ok(T::default());
    }

    let invalid = || DatasetError::InvalidNumber {
        line,
        column,
        value: value.to_string(),
    };

    let whole = match value.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let float = value.parse::<f64>().map_err(|_| invalid())?;
            if !float.is_finite() || float.fract() != 0.0 {
                return Err(invalid());
            }
            float as i64
        }
    };

    T::try_from(whole).map_err(|_| invalid())
}

/// Parse an optional numeric cell. Empty cells are unknown, not 0.
fn parse_optional(value: &str, column: &'static str, line: u64) -> Result<Option<f64>, DatasetError> {
    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| DatasetError::InvalidNumber {
            line,
            column,
            value: value.to_string(),
        })
}
