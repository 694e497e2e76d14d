//! Sociogram - command-line driver
//!
//! Reads nomination lists as JSON, runs the analysis engine and prints the
//! report as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sociogram::{AnalysisConfig, AnalysisEngine, AnalysisInput, SociogramEngine};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sociogram")]
#[command(about = "Sociometric analysis of positive/negative nomination networks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a nomination file
    Analyze {
        /// JSON file with `a` and `b` nomination lists
        #[arg(short, long)]
        input: PathBuf,

        /// YAML configuration (defaults to ./sociogram.yaml if present)
        #[arg(short, long, env = "SOCIOGRAM_CONFIG")]
        config: Option<PathBuf>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective configuration as YAML
    Config {
        /// YAML configuration (defaults to ./sociogram.yaml if present)
        #[arg(short, long, env = "SOCIOGRAM_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sociogram=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            config,
            pretty,
        } => run_analyze(&input, config.as_deref(), pretty),
        Commands::Config { config } => {
            let config = AnalysisConfig::from_yaml_and_env(config.as_deref())?;
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

fn run_analyze(input: &Path, config: Option<&Path>, pretty: bool) -> Result<()> {
    let config = AnalysisConfig::from_yaml_and_env(config)?;

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let nominations: AnalysisInput = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse nominations in {}", input.display()))?;

    tracing::info!("Analyzing {}", input.display());
    let engine = SociogramEngine::new(config)?;
    let report = engine.analyze(&nominations)?;

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);
    Ok(())
}
