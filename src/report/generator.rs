//! Markdown and JSON report generation.
//!
//! This module renders a computed [`Dashboard`](crate::models::Dashboard) as a text report with one
//! section per chart.

use crate::models::{AgeBin, ChartKind, GroupSummary, Report, ReportMetadata, SurvivalOverview};
use anyhow::{Context, Result};
use std::fmt::Display;
use std::path::Path;

/// Width of the text bars drawn next to each row, in characters.
const BAR_WIDTH: usize = 20;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();
    let dashboard = &report.dashboard;

    output.push_str(&format!("# {}\n\n", report.metadata.title));
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents());

    for chart in ChartKind::ALL {
        output.push_str(&format!("## {} {{#{}}}\n\n", chart, chart.slot_id()));

        let body = match chart {
            ChartKind::SurvivalRate => generate_overview_section(&dashboard.overview),
            ChartKind::SurvivalBySex => generate_group_table("Sex", &dashboard.by_sex),
            ChartKind::SurvivalByClass => generate_group_table("Class", &dashboard.by_class),
            ChartKind::AgeDistribution => generate_age_table(&dashboard.age_distribution),
            ChartKind::Embarked => generate_group_table("Port", &dashboard.by_embarked),
            ChartKind::Family => generate_group_table("Relatives Aboard", &dashboard.by_family_size),
        };
        output.push_str(&body);
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Records Loaded:** {}\n", metadata.records_loaded));
    if let Some(ref sex) = metadata.sex_filter {
        section.push_str(&format!("- **Filter:** sex = `{}`\n", sex));
        section.push_str(&format!(
            "- **Records Analyzed:** {}\n",
            metadata.records_analyzed
        ));
    }
    section.push_str(&format!("- **Age Bucket Width:** {} years\n", metadata.age_bin_size));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents() -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    for chart in ChartKind::ALL {
        toc.push_str(&format!("- [{}](#{})\n", chart, chart.slot_id()));
    }
    toc.push('\n');

    toc
}

/// Generate the headline survival rate section.
fn generate_overview_section(overview: &SurvivalOverview) -> String {
    let mut section = String::new();

    if overview.total == 0 {
        section.push_str("**-** (no passengers)\n\n");
        return section;
    }

    section.push_str(&format!(
        "**{}** survived ({} of {})\n\n",
        format_percent(overview.rate),
        overview.survived,
        overview.total
    ));
    section.push_str("| Outcome | Passengers | |\n");
    section.push_str("|:---|:---:|:---|\n");
    section.push_str(&format!(
        "| Survived | {} | `{}` |\n",
        overview.survived,
        bar(overview.rate)
    ));
    section.push_str(&format!(
        "| Did not survive | {} | `{}` |\n\n",
        overview.perished(),
        bar(1.0 - overview.rate)
    ));

    section
}

/// Generate a table for one survival grouping.
fn generate_group_table<K: Display>(label: &str, groups: &[GroupSummary<K>]) -> String {
    let mut section = String::new();

    if groups.is_empty() {
        section.push_str("No data available.\n\n");
        return section;
    }

    section.push_str(&format!("| {} | Passengers | Survived | Rate | |\n", label));
    section.push_str("|:---|:---:|:---:|:---:|:---|\n");

    for group in groups {
        section.push_str(&format!(
            "| {} | {} | {} | {} | `{}` |\n",
            escape_cell(&group.key.to_string()),
            group.total,
            group.survived,
            format_percent(group.rate),
            bar(group.rate)
        ));
    }
    section.push('\n');

    section
}

/// Generate the age histogram table. Bars are scaled to the fullest bucket.
fn generate_age_table(bins: &[AgeBin]) -> String {
    let mut section = String::new();

    if bins.is_empty() {
        section.push_str("No passengers with a known age.\n\n");
        return section;
    }

    let largest = bins.iter().map(|b| b.count).max().unwrap_or(0);

    section.push_str("| Age | Passengers | |\n");
    section.push_str("|:---|:---:|:---|\n");

    for bin in bins {
        let fill = if largest == 0 {
            0.0
        } else {
            bin.count as f64 / largest as f64
        };
        section.push_str(&format!("| {} | {} | `{}` |\n", bin.range, bin.count, bar(fill)));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by ManifestStats v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Escape text for use inside a Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Format a rate in `[0, 1]` as a percentage with one decimal.
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Draw a fixed-width text bar for a fraction in `[0, 1]`.
fn bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
