//! Data models for the survival dashboard.
//!
//! This module contains the passenger record consumed by every aggregation
//! and the chart-ready summaries produced from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ages at or above this many years are treated as unknown.
pub const MAX_KNOWN_AGE: f64 = 150.0;

/// One row of the passenger manifest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Passenger {
    /// Passenger class (1-3 in the known dataset, not assumed closed).
    pub pclass: i32,
    /// Outcome flag. Only `1` means the passenger survived.
    pub survived: i32,
    /// Full name.
    pub name: String,
    /// Sex, used verbatim as a grouping key.
    pub sex: String,
    /// Age in years. `None` when unknown.
    pub age: Option<f64>,
    /// Number of siblings/spouses aboard.
    pub sibsp: u32,
    /// Number of parents/children aboard.
    pub parch: u32,
    /// Ticket number.
    pub ticket: String,
    /// Fare paid, if recorded.
    pub fare: Option<f64>,
    /// Cabin identifier.
    pub cabin: String,
    /// Embarkation port code. Empty when unknown.
    pub embarked: String,
    /// Lifeboat identifier.
    pub boat: String,
    /// Body identification number.
    pub body: String,
    /// Home or destination.
    pub home_dest: String,
}

impl Passenger {
    /// Whether this passenger survived.
    pub fn has_survived(&self) -> bool {
        self.survived == 1
    }

    /// Number of relatives aboard (siblings/spouses + parents/children).
    ///
    /// The passenger themself is not counted.
    pub fn family_size(&self) -> u32 {
        self.sibsp.saturating_add(self.parch)
    }

    /// Age usable for histogram bucketing, if any.
    ///
    /// Only ages in `[0, MAX_KNOWN_AGE)` count as known.
    pub fn known_age(&self) -> Option<f64> {
        self.age.filter(|age| (0.0..MAX_KNOWN_AGE).contains(age))
    }
}

/// Survival statistics for one group of passengers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary<K> {
    /// Group discriminator (sex, class, port or family size).
    pub key: K,
    /// Number of passengers in the group.
    pub total: usize,
    /// Number of survivors in the group.
    pub survived: usize,
    /// `survived / total`, or 0 for an empty group.
    pub rate: f64,
}

impl<K> GroupSummary<K> {
    /// Creates a summary, computing the rate from the counts.
    pub fn new(key: K, total: usize, survived: usize) -> Self {
        Self {
            key,
            total,
            survived,
            rate: ratio(survived, total),
        }
    }
}

/// One half-open bucket `[start, end)` of the age histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBin {
    /// Display label, `"<start>-<end - 1>"`.
    pub range: String,
    /// Inclusive lower bound.
    pub start: u32,
    /// Exclusive upper bound.
    pub end: u32,
    /// Number of passengers whose age falls in the bucket.
    pub count: usize,
}

impl AgeBin {
    /// Creates an empty bin covering `[start, end)`.
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            range: format!("{}-{}", start, end.saturating_sub(1)),
            start,
            end,
            count: 0,
        }
    }
}

/// Overall survivor counts (the headline donut chart).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurvivalOverview {
    pub total: usize,
    pub survived: usize,
    pub rate: f64,
}

impl SurvivalOverview {
    /// Number of passengers who did not survive.
    pub fn perished(&self) -> usize {
        self.total - self.survived
    }
}

/// The charts shown on the dashboard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    SurvivalRate,
    SurvivalBySex,
    SurvivalByClass,
    AgeDistribution,
    Embarked,
    Family,
}

impl ChartKind {
    /// All charts in display order.
    pub const ALL: [ChartKind; 6] = [
        ChartKind::SurvivalRate,
        ChartKind::SurvivalBySex,
        ChartKind::SurvivalByClass,
        ChartKind::AgeDistribution,
        ChartKind::Embarked,
        ChartKind::Family,
    ];

    /// Stable identifier of the chart slot, also used as the report anchor.
    pub fn slot_id(&self) -> &'static str {
        match self {
            ChartKind::SurvivalRate => "survival-rate",
            ChartKind::SurvivalBySex => "survival-sex",
            ChartKind::SurvivalByClass => "survival-class",
            ChartKind::AgeDistribution => "age-dist",
            ChartKind::Embarked => "embarked",
            ChartKind::Family => "family",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::SurvivalRate => write!(f, "Survival Rate"),
            ChartKind::SurvivalBySex => write!(f, "Survival by Sex"),
            ChartKind::SurvivalByClass => write!(f, "Survival by Class"),
            ChartKind::AgeDistribution => write!(f, "Age Distribution"),
            ChartKind::Embarked => write!(f, "Embarked vs Survival"),
            ChartKind::Family => write!(f, "Family (SibSp, Parch)"),
        }
    }
}

/// Every chart's data, computed from one record collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub overview: SurvivalOverview,
    pub by_sex: Vec<GroupSummary<String>>,
    pub by_class: Vec<GroupSummary<i32>>,
    pub age_distribution: Vec<AgeBin>,
    pub by_embarked: Vec<GroupSummary<String>>,
    pub by_family_size: Vec<GroupSummary<u32>>,
}

/// Metadata about a generated dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Title shown at the top of the report.
    pub title: String,
    /// Path of the dataset the report was built from.
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of records in the dataset.
    pub records_loaded: usize,
    /// Number of records left after the sex filter.
    pub records_analyzed: usize,
    /// Sex filter applied before aggregation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex_filter: Option<String>,
    /// Width of the age histogram buckets.
    pub age_bin_size: u32,
}

/// A complete dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub dashboard: Dashboard,
}

/// `part / whole`, or 0 when `whole` is 0.
pub fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
