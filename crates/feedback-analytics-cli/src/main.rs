mod commands;
mod config;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::organization::OrganizationArgs;
use commands::peers::PeersArgs;
use commands::ratings::{ClassifyArgs, GapsArgs, NormalizeArgs};
use commands::rollup::{IndividualArgs, RollupArgs};
use commands::trends::TrendsArgs;

/// 360-degree feedback analytics
#[derive(Parser)]
#[command(
    name = "fba",
    version,
    about = "360-degree feedback analytics",
    long_about = "A CLI for analysing 360-degree feedback with decimal precision. \
                  Normalizes ratings, classifies self-vs-reviewer gaps, rolls results \
                  up to sections and competencies, builds anonymised cohort reports, \
                  and computes dashboard trend and peer metrics."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Analytics config file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log debug events to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clamp raw responses onto each question's scale
    Normalize(NormalizeArgs),
    /// Per-question self vs reviewer gaps
    Gaps(GapsArgs),
    /// Classify a single gap value
    Classify(ClassifyArgs),
    /// Roll question results up to sections, competencies and the assessment
    Rollup(RollupArgs),
    /// Full report for one respondent
    Individual(IndividualArgs),
    /// Anonymised cohort rollup with minimum-size suppression
    Organization(OrganizationArgs),
    /// Dashboard trend metrics for a reporting window
    Trends(TrendsArgs),
    /// Percentile and rank within a population
    Peers(PeersArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn run(cli: Cli) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let loaded = cli.config.as_deref().map(config::load).transpose()?;
    let loaded = loaded.as_ref();

    match cli.command {
        Commands::Normalize(args) => commands::ratings::run_normalize(args),
        Commands::Gaps(args) => commands::ratings::run_gaps(args, loaded),
        Commands::Classify(args) => commands::ratings::run_classify(args, loaded),
        Commands::Rollup(args) => commands::rollup::run_rollup(args, loaded),
        Commands::Individual(args) => commands::rollup::run_individual(args, loaded),
        Commands::Organization(args) => commands::organization::run_organization(args, loaded),
        Commands::Trends(args) => commands::trends::run_trends(args, loaded),
        Commands::Peers(args) => commands::peers::run_peers(args),
        Commands::Version => Ok(serde_json::json!({ "fba": env!("CARGO_PKG_VERSION") })),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("fba {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(e) = telemetry::init(cli.verbose) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let format = cli.output.clone();
    match run(cli) {
        Ok(value) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
