//! ManifestStats - survival statistics dashboard
//!
//! A CLI tool that loads the passenger manifest, aggregates survival
//! statistics for each dashboard chart, and writes a Markdown or JSON
//! dashboard report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, config, unreadable dataset, etc.)

mod analysis;
mod cli;
mod config;
mod dataset;
mod models;
mod report;

use analysis::AnalysisOptions;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use dataset::DatasetLoader;
use models::{Passenger, Report, ReportMetadata};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("ManifestStats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Dashboard generation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .manifeststats.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to point at your dataset and tune the charts.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the dataset, build the dashboard and write the report.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let loader = DatasetLoader::new(config.delimiter_byte());
    let passengers = loader
        .load_path(&config.dataset.path)
        .with_context(|| format!("Failed to load dataset {}", config.dataset.path.display()))?;

    if passengers.is_empty() {
        warn!("Dataset contains no passenger records");
    }

    let filtered;
    let analyzed: &[Passenger] = match args.sex {
        Some(ref sex) => {
            filtered = analysis::filter_by_sex(&passengers, sex);
            info!(
                "Filtered to sex = {}: {} of {} records",
                sex,
                filtered.len(),
                passengers.len()
            );
            if filtered.is_empty() {
                warn!("No passengers match sex = {}", sex);
            }
            &filtered
        }
        None => &passengers,
    };

    let options = AnalysisOptions::from(&config.analysis);
    let dashboard = analysis::build_dashboard(analyzed, &options);
    debug!(
        "Dashboard: {} sex groups, {} classes, {} ports, {} family sizes, {} age buckets",
        dashboard.by_sex.len(),
        dashboard.by_class.len(),
        dashboard.by_embarked.len(),
        dashboard.by_family_size.len(),
        dashboard.age_distribution.len()
    );

    let report = Report {
        metadata: ReportMetadata {
            title: config.report.title.clone(),
            source: config.dataset.path.display().to_string(),
            generated_at: Utc::now(),
            records_loaded: passengers.len(),
            records_analyzed: analyzed.len(),
            sex_filter: args.sex.clone(),
            age_bin_size: options.age_bin_size,
        },
        dashboard,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    if args.stdout {
        println!("{}", output);
        return Ok(());
    }

    report::write_report(&output, &config.report.output)?;

    let overview = &report.dashboard.overview;
    println!("\n📊 Survival Summary:");
    println!("   Passengers analyzed: {}", overview.total);
    println!(
        "   Survived: {} ({})",
        overview.survived,
        report::format_percent(analysis::overall_survival_rate(analyzed))
    );
    println!(
        "\n✅ Dashboard saved to: {}",
        config.report.output.display()
    );

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
