//! Dosewise CLI
//!
//! Offline analysis of exported logs:
//! - Analyze injection and symptom CSV exports
//! - Show the adaptive analysis window
//! - Get meal warnings and tips
//! - Show or generate configuration

use anyhow::{bail, Context};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use dosewise::analytics::{AnalysisReport, Analyzer, MealContext, MealType, Snapshot};
use dosewise::config::{generate_default_config, Config};
use dosewise::store::{CsvImportResult, CsvImporter, InjectionEvent};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dosewise")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Injection-symptom analytics for GLP-1 medication logs")]
#[command(long_about = "Dosewise finds how your symptoms line up with your injections.\nAnalyze CSV exports, see when symptoms peak and get meal guidance.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: first of `dosewise config path`)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full analysis over CSV exports
    Analyze {
        /// Injections CSV with headers id,timestamp,medication,dose,site
        #[arg(short, long)]
        injections: PathBuf,
        /// Symptoms CSV with headers id,timestamp,symptom,severity,meal_related,notes
        #[arg(short, long)]
        symptoms: PathBuf,
        /// Evaluate as of this time (default: now). Supports: "now", "yesterday", ISO 8601, date, Unix timestamp
        #[arg(short, long)]
        at: Option<String>,
    },

    /// Show the adaptive analysis window for an injection history
    Window {
        /// Injections CSV
        #[arg(short, long)]
        injections: PathBuf,
    },

    /// Meal warnings and tips for today
    Meal {
        #[arg(short, long)]
        injections: PathBuf,
        #[arg(short, long)]
        symptoms: PathBuf,
        /// breakfast, lunch, dinner or snack
        #[arg(short, long)]
        meal_type: Option<String>,
        #[arg(short, long)]
        at: Option<String>,
    },

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Generate a default config file
    Init {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the config file lookup paths
    Path,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    // Diagnostics go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dosewise=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let importer = CsvImporter::new().with_timestamp_format(&config.store.csv_timestamp_format);
    let analyzer = Analyzer::new(&config.analysis);

    match cli.command {
        Commands::Analyze {
            injections,
            symptoms,
            at,
        } => {
            let now = parse_at(at.as_deref())?;
            let snapshot = load_snapshot(&importer, &injections, &symptoms)?;
            let report = analyzer.analyze(&snapshot, now);

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Table => print_report(&report),
            }
        }

        Commands::Window { injections } => {
            let events = load_injections(&importer, &injections)?;
            let decision = analyzer.selector().decide(&events);

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&decision)?),
                OutputFormat::Table => {
                    println!("Window:       {} days", decision.days);
                    println!(
                        "Cadence:      {}",
                        decision
                            .cadence
                            .map(|c| format!("{:?}", c).to_lowercase())
                            .unwrap_or_else(|| "-".to_string())
                    );
                    println!("Dose changed: {}", if decision.dose_changed { "yes" } else { "no" });
                    println!("Reason:       {:?}", decision.reason);
                }
            }
        }

        Commands::Meal {
            injections,
            symptoms,
            meal_type,
            at,
        } => {
            let now = parse_at(at.as_deref())?;
            let meal_type = meal_type
                .as_deref()
                .map(str::parse::<MealType>)
                .transpose()?;

            let snapshot = load_snapshot(&importer, &injections, &symptoms)?;
            let report = analyzer.analyze(&snapshot, now);
            let context = analyzer.meal_context(&report, meal_type);

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&context)?),
                OutputFormat::Table => print_meal_context(&context, meal_type),
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                print!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Init { output } => {
                let content = generate_default_config();

                match output {
                    Some(path) => {
                        if let Some(parent) = path.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        std::fs::write(&path, &content)
                            .with_context(|| format!("Failed to write {:?}", path))?;
                        println!("Config written to {:?}", path);
                    }
                    None => print!("{}", content),
                }
            }
            ConfigAction::Path => {
                for path in Config::default_paths() {
                    let marker = if path.exists() { " (found)" } else { "" };
                    println!("{}{}", path.display(), marker);
                }
            }
        },
    }

    Ok(())
}

fn load_snapshot(importer: &CsvImporter, injections: &Path, symptoms: &Path) -> anyhow::Result<Snapshot> {
    let events = load_injections(importer, injections)?;

    let result = importer
        .import_symptoms(symptoms)
        .with_context(|| format!("Failed to import symptoms from {:?}", symptoms))?;
    report_import("symptoms", &result);

    Ok(Snapshot::new(events, result.records))
}

fn load_injections(importer: &CsvImporter, path: &Path) -> anyhow::Result<Vec<InjectionEvent>> {
    let result = importer
        .import_injections(path)
        .with_context(|| format!("Failed to import injections from {:?}", path))?;
    report_import("injections", &result);
    Ok(result.records)
}

fn report_import<T>(kind: &str, result: &CsvImportResult<T>) {
    if result.errors.is_empty() {
        return;
    }

    eprintln!(
        "Skipped {} of {} {} rows:",
        result.rows_failed, result.rows_processed, kind
    );
    for error in result.errors.iter().take(10) {
        eprintln!("  {}", error);
    }
    if result.errors.len() > 10 {
        eprintln!("  ... and {} more", result.errors.len() - 10);
    }
}

fn parse_at(at: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    let now = Utc::now();
    let Some(s) = at else {
        return Ok(now);
    };

    match s.trim() {
        "now" => Ok(now),
        "yesterday" => Ok(now - Duration::days(1)),
        s => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc));
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                if let Some(dt) = date.and_hms_opt(23, 59, 59) {
                    return Ok(dt.and_utc());
                }
            }
            if let Ok(secs) = s.parse::<i64>() {
                if let Some(dt) = DateTime::from_timestamp(secs, 0) {
                    return Ok(dt);
                }
            }
            bail!("Invalid time: {}. Use: now, yesterday, 2024-03-01, RFC 3339 or Unix seconds", s)
        }
    }
}

fn print_report(report: &AnalysisReport) {
    println!(
        "Window: {} days ({:?}), {} of {} injections, {} symptoms ({} above noise floor)",
        report.window.days,
        report.window.reason,
        report.injections_in_window,
        report.total_injections,
        report.symptoms_in_window,
        report.weighted_symptoms
    );
    if let Some(days) = report.days_since_injection {
        println!("Days since last injection: {}", days);
    }
    println!("Confidence score: {}", report.correlations.confidence_score);
    println!();

    if report.correlations.patterns.is_empty() {
        println!("No patterns yet.");
    } else {
        println!(
            "{:<20} {:>10} {:>9} {:>10} {:>8}  {}",
            "Symptom", "Confidence", "Tier", "Frequency", "Severity", "Peak day"
        );
        println!("{}", "-".repeat(72));
        for pattern in &report.correlations.patterns {
            println!(
                "{:<20} {:>10} {:>9} {:>10.2} {:>8.1}  {}",
                pattern.symptom,
                pattern.confidence,
                format!("{:?}", pattern.confidence_tier).to_lowercase(),
                pattern.frequency,
                pattern.weighted_severity,
                pattern
                    .modal_offset
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }
    }

    if let Some(peak) = &report.correlations.peak_symptom_window {
        println!();
        println!("{}", peak.description);
    }

    if !report.correlations.site_correlations.is_empty() {
        println!();
        println!("By injection site:");
        for site in &report.correlations.site_correlations {
            let counts: Vec<String> = site
                .symptoms
                .iter()
                .map(|s| format!("{} x{}", s.symptom, s.count))
                .collect();
            println!("  {:<16} {}", site.site.label(), counts.join(", "));
        }
    }

    if !report.correlations.dose_correlations.is_empty() {
        println!();
        println!("By dose:");
        for dose in &report.correlations.dose_correlations {
            println!(
                "  {:>6.2} mg  avg severity {:.1} over {} logs",
                dose.dose, dose.average_severity, dose.sample_size
            );
        }
    }

    println!();
    println!("Recommendations:");
    for recommendation in &report.correlations.recommendations {
        println!("  - {}", recommendation);
    }

    println!();
    println!("Insights:");
    for insight in &report.insights {
        println!(
            "  [{:>3}] {} (valid until {})",
            insight.confidence,
            insight.pattern,
            insight.valid_until.format("%Y-%m-%d")
        );
    }

    println!();
    println!("Today's risk: {}", report.risk_level);
}

fn print_meal_context(context: &MealContext, meal_type: Option<MealType>) {
    if let Some(meal_type) = meal_type {
        println!("Meal: {}", meal_type);
    }
    match context.days_since_injection {
        Some(days) => println!("Days since injection: {}", days),
        None => println!("No injections logged"),
    }
    println!("Risk level: {} (confidence {})", context.risk_level, context.confidence);

    if !context.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &context.warnings {
            println!("  [{:?}] {}", warning.severity, warning.message);
        }
    }

    if !context.tips.is_empty() {
        println!();
        println!("Tips:");
        for tip in &context.tips {
            println!("  - {}", tip);
        }
    }
}

