//! Readmit CLI - explore precomputed readmission risk scores
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Identical input yields byte-for-byte identical output

#![deny(warnings)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use readmit_core::config::{self, ResolvedConfig};
use readmit_core::geo::{self, NationalBenchmarks, StateSort};
use readmit_core::query::{AgeFilter, TierFilter};
use readmit_core::{export, query, render};
use readmit_core::{summarize_with_thresholds, DatasetId, DatasetStore, MemberQuery, SortField, SortOrder, TierCounts};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "readmit")]
#[command(about = "Readmission risk worklists, cost exposure, and cohort summaries from precomputed scores")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a cohort (tiers, distributions, cost exposure)
    Summary {
        /// Path to the bundled data directory
        #[arg(long)]
        data_dir: PathBuf,

        /// Dataset to load (missing datasets fall back to the default)
        #[arg(long)]
        dataset: Option<DatasetArg>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover in the data dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List members with filtering, sorting, and truncation
    Members {
        /// Path to the bundled data directory
        #[arg(long)]
        data_dir: PathBuf,

        /// Dataset to load (missing datasets fall back to the default)
        #[arg(long)]
        dataset: Option<DatasetArg>,

        /// Substring match against the patient id
        #[arg(long)]
        search: Option<String>,

        /// Worklist tier filter
        #[arg(long, default_value = "all")]
        tier: TierArg,

        /// Age band filter
        #[arg(long, default_value = "all")]
        age: AgeArg,

        /// Sort field
        #[arg(long, default_value = "risk-score")]
        sort: SortFieldArg,

        /// Sort direction
        #[arg(long, default_value = "desc")]
        order: OrderArg,

        /// Show only the first N rows (applied after filter and sort)
        #[arg(long)]
        limit: Option<usize>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover in the data dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Export the high-risk worklist as CSV
    Export {
        /// Path to the bundled data directory
        #[arg(long)]
        data_dir: PathBuf,

        /// Dataset to load (missing datasets fall back to the default)
        #[arg(long)]
        dataset: Option<DatasetArg>,

        /// Export only the top N rows by risk score
        #[arg(long)]
        top: Option<usize>,

        /// Output file path (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to config file (default: auto-discover in the data dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Geographic analysis: state rates, penalty estimates, and the
    /// worst-performing facilities
    Geography {
        /// Path to the bundled data directory
        #[arg(long)]
        data_dir: PathBuf,

        /// State table sort key
        #[arg(long, default_value = "rate")]
        sort: StateSortArg,

        /// Number of hospitals to list
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without loading any data
    Validate {
        /// Path to config file (default: auto-discover from the current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from the current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DatasetArg {
    Uci,
    Mimic,
}

impl From<DatasetArg> for DatasetId {
    fn from(arg: DatasetArg) -> DatasetId {
        match arg {
            DatasetArg::Uci => DatasetId::Uci,
            DatasetArg::Mimic => DatasetId::Mimic,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum TierArg {
    All,
    Critical,
    VeryHigh,
    High,
}

impl From<TierArg> for TierFilter {
    fn from(arg: TierArg) -> TierFilter {
        match arg {
            TierArg::All => TierFilter::All,
            TierArg::Critical => TierFilter::Critical,
            TierArg::VeryHigh => TierFilter::VeryHigh,
            TierArg::High => TierFilter::High,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum AgeArg {
    All,
    #[value(name = "under50")]
    Under50,
    #[value(name = "50-69")]
    FiftyToSixtyNine,
    #[value(name = "70plus")]
    SeventyPlus,
}

impl From<AgeArg> for AgeFilter {
    fn from(arg: AgeArg) -> AgeFilter {
        match arg {
            AgeArg::All => AgeFilter::All,
            AgeArg::Under50 => AgeFilter::Under50,
            AgeArg::FiftyToSixtyNine => AgeFilter::FiftyToSixtyNine,
            AgeArg::SeventyPlus => AgeFilter::SeventyPlus,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SortFieldArg {
    PatientId,
    HadmId,
    Age,
    Tier,
    TimeInHospital,
    NumMedications,
    NumberDiagnoses,
    TotalVisits,
    MedicationCount,
    HadIcuStay,
    RiskScore,
}

impl From<SortFieldArg> for SortField {
    fn from(arg: SortFieldArg) -> SortField {
        match arg {
            SortFieldArg::PatientId => SortField::PatientId,
            SortFieldArg::HadmId => SortField::HadmId,
            SortFieldArg::Age => SortField::Age,
            SortFieldArg::Tier => SortField::Tier,
            SortFieldArg::TimeInHospital => SortField::TimeInHospital,
            SortFieldArg::NumMedications => SortField::NumMedications,
            SortFieldArg::NumberDiagnoses => SortField::NumberDiagnoses,
            SortFieldArg::TotalVisits => SortField::TotalVisits,
            SortFieldArg::MedicationCount => SortField::MedicationCount,
            SortFieldArg::HadIcuStay => SortField::HadIcuStay,
            SortFieldArg::RiskScore => SortField::RiskScore,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum StateSortArg {
    Rate,
    Penalty,
}

impl From<StateSortArg> for StateSort {
    fn from(arg: StateSortArg) -> StateSort {
        match arg {
            StateSortArg::Rate => StateSort::Rate,
            StateSortArg::Penalty => StateSort::Penalty,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> SortOrder {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            data_dir,
            dataset,
            format,
            config: config_path,
        } => {
            let resolved = load_config(&data_dir, config_path.as_deref())?;
            let dataset = load_dataset(&data_dir, dataset, &resolved)?;
            let summary = summarize_with_thresholds(
                &dataset.records,
                &dataset.model,
                &resolved.bases,
                &resolved.thresholds,
            );
            match format {
                OutputFormat::Text => {
                    println!("Dataset: {}", dataset.id.as_str());
                    print!("{}", render::render_summary_text(&summary));
                    let comparisons =
                        geo::benchmark_summary(&summary, &NationalBenchmarks::default());
                    print!("{}", render::render_benchmarks_text(&comparisons));
                }
                OutputFormat::Json => println!("{}", render::render_summary_json(&summary)),
            }
        }
        Commands::Members {
            data_dir,
            dataset,
            search,
            tier,
            age,
            sort,
            order,
            limit,
            format,
            config: config_path,
        } => {
            let resolved = load_config(&data_dir, config_path.as_deref())?;
            let dataset = load_dataset(&data_dir, dataset, &resolved)?;

            let member_query = MemberQuery {
                search,
                tier: tier.into(),
                age: age.into(),
                sort_field: sort.into(),
                sort_order: order.into(),
                limit: limit.or(resolved.limit),
            };

            // Tier counts read the filtered set before any limit.
            let matching = query::filtered(&dataset.records, &member_query);
            let counts = TierCounts::of(matching.iter().copied());
            let rows = query::query(&dataset.records, &member_query);

            match format {
                OutputFormat::Text => {
                    print!("{}", render::render_members_text(&rows, &resolved.bases));
                    println!(
                        "Showing {} of {} members  |  Critical: {}  Very High: {}  High: {}",
                        rows.len(),
                        matching.len(),
                        counts.critical,
                        counts.very_high,
                        counts.high
                    );
                }
                OutputFormat::Json => {
                    println!("{}", render::render_members_json(&rows, &resolved.bases));
                }
            }
        }
        Commands::Export {
            data_dir,
            dataset,
            top,
            output,
            config: config_path,
        } => {
            let resolved = load_config(&data_dir, config_path.as_deref())?;
            let dataset = load_dataset(&data_dir, dataset, &resolved)?;

            // The export worklist is the high-risk cohort, highest risk
            // first. The floor applies before --top takes its cut.
            let rows = query::high_risk_worklist(&dataset.records, resolved.high_risk_floor, top);
            let csv = export::render_csv(&rows, dataset.id, &resolved.bases);

            match output {
                Some(path) => {
                    write_export(&path, &csv)?;
                    eprintln!("Exported {} member(s) to {}", rows.len(), path.display());
                }
                None => println!("{csv}"),
            }
        }
        Commands::Geography {
            data_dir,
            sort,
            top,
            format,
        } => {
            if !data_dir.is_dir() {
                anyhow::bail!("data directory does not exist: {}", data_dir.display());
            }
            let store = DatasetStore::open(&data_dir);
            let geography = store.load_geography()?;
            match format {
                OutputFormat::Text => {
                    print!("{}", render::render_geography_text(&geography, sort.into(), top));
                }
                OutputFormat::Json => {
                    println!("{}", render::render_geography_json(&geography, sort.into(), top));
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let root = std::env::current_dir()?;
                match config::load_and_resolve(&root, path.as_deref()) {
                    Ok(resolved) => {
                        if let Some(ref p) = resolved.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&root, path.as_deref())
                    .context("failed to load configuration")?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                println!();
                println!("Cost bases:");
                println!("  low: {}", resolved.bases.low);
                println!("  mid: {}", resolved.bases.mid);
                println!("  high: {}", resolved.bases.high);
                println!();
                println!("Tier thresholds:");
                println!("  high: {}", resolved.thresholds.high);
                println!("  very_high: {}", resolved.thresholds.very_high);
                println!("  critical: {}", resolved.thresholds.critical);
                println!();
                println!("Filters:");
                println!("  high_risk_floor: {}", resolved.high_risk_floor);
                println!(
                    "  limit: {}",
                    resolved
                        .limit
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "none".to_string())
                );
                println!(
                    "  default_dataset: {}",
                    resolved.default_dataset.as_str()
                );
            }
        },
    }

    Ok(())
}

/// Resolve configuration from the data directory (or an explicit path).
fn load_config(data_dir: &Path, explicit: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    if !data_dir.is_dir() {
        anyhow::bail!("data directory does not exist: {}", data_dir.display());
    }
    let resolved =
        config::load_and_resolve(data_dir, explicit).context("failed to load configuration")?;
    if let Some(ref path) = resolved.config_path {
        eprintln!("Using config: {}", path.display());
    }
    Ok(resolved)
}

/// Open the store and load the requested (or default) dataset.
fn load_dataset(
    data_dir: &Path,
    requested: Option<DatasetArg>,
    resolved: &ResolvedConfig,
) -> anyhow::Result<readmit_core::Dataset> {
    let store = DatasetStore::open(data_dir);
    let id = requested.map(DatasetId::from).unwrap_or(resolved.default_dataset);
    log::debug!("loading dataset '{}' from {}", id.as_str(), data_dir.display());
    store.load(id)
}

/// Write an export file with the atomic temp + rename pattern.
fn write_export(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    let temp_path = path.with_extension("csv.tmp");
    std::fs::write(&temp_path, contents)
        .with_context(|| format!("failed to write temporary file: {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("failed to rename temporary file to: {}", path.display()))?;
    Ok(())
}
