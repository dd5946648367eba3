//! Zefix CLI - Owner names of Swiss companies
//!
//! Usage:
//!   zefix search <key> [--out <dir>] [--strategy rules|model]
//!   zefix extract <file> [--strategy rules|model]
//!   zefix detail <uid>

mod export;
mod pipeline;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use zefix_core::{AppConfig, CompanyDetail, LoggingConfig, PublicationRecord, Strategy};
use zefix_extractor::{build_extractor, ModelRegistry, NameExtractor};
use zefix_registry::ZefixClient;

use crate::pipeline::{Pipeline, Progress};

#[derive(Parser)]
#[command(name = "zefix")]
#[command(about = "Extract owner names of Swiss companies from the ZEFIX registry")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search companies by name and export their owners to CSV
    Search {
        /// Company name fragment (at least 3 characters)
        key: String,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Extraction strategy
        #[arg(long)]
        strategy: Option<Strategy>,
        /// Drop repeated names
        #[arg(long)]
        dedup: bool,
    },
    /// Extract names from a JSON file of publications or company details
    Extract {
        /// JSON array of publication records or registry company details
        file: PathBuf,
        /// Extraction strategy
        #[arg(long)]
        strategy: Option<Strategy>,
        /// Drop repeated names
        #[arg(long)]
        dedup: bool,
    },
    /// Fetch one company and print its export row
    Detail {
        /// Company UID, e.g. CHE-123.456.789
        uid: String,
    },
}

/// Offline extraction input
#[derive(Deserialize)]
#[serde(untagged)]
enum ExtractInput {
    Companies(Vec<CompanyDetail>),
    Publications(Vec<PublicationRecord>),
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn apply_overrides(config: &mut AppConfig, strategy: Option<Strategy>, dedup: bool) {
    if let Some(strategy) = strategy {
        config.extraction.strategy = strategy;
    }
    if dedup {
        config.extraction.deduplicate = true;
    }
}

fn pipeline(config: &AppConfig, models: Arc<ModelRegistry>) -> anyhow::Result<Pipeline> {
    let client = ZefixClient::from_config(&config.registry)?;
    let extractor = build_extractor(&config.extraction, models);
    Ok(Pipeline::new(Arc::new(client), extractor)
        .with_concurrency(config.registry.max_concurrent_requests)
        .with_join_separator(config.extraction.join_separator.clone()))
}

fn extract_file(path: &Path, extractor: &dyn NameExtractor) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: ExtractInput = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    match input {
        ExtractInput::Companies(companies) => {
            for company in companies {
                println!("# {} ({})", company.name, company.uid);
                for name in extractor.extract(&company.sogc_pub).to_output() {
                    println!("{name}");
                }
            }
        }
        ExtractInput::Publications(records) => {
            for name in extractor.extract(&records).to_output() {
                println!("{name}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let models = Arc::new(ModelRegistry::with_default_models());

    match cli.command {
        Commands::Search {
            key,
            out,
            strategy,
            dedup,
        } => {
            apply_overrides(&mut config, strategy, dedup);
            if let Some(out) = out {
                config.export.output_dir = out;
            }

            let pipeline = pipeline(&config, models)?;
            let rows = pipeline
                .run(&key, |p: Progress| {
                    tracing::info!("[{:>3}%] {}/{} {}", p.percent(), p.completed, p.total, p.uid);
                })
                .await?;

            match export::write_csv(&config.export, &key, &rows)? {
                Some(path) => println!("{}", path.display()),
                None => println!("No matching companies found."),
            }
        }
        Commands::Extract {
            file,
            strategy,
            dedup,
        } => {
            apply_overrides(&mut config, strategy, dedup);
            let extractor = build_extractor(&config.extraction, models);
            extract_file(&file, extractor.as_ref())?;
        }
        Commands::Detail { uid } => {
            let pipeline = pipeline(&config, models)?;
            let rows = pipeline.company(&uid).await?;
            if rows.is_empty() {
                println!("No active company found for {uid}.");
            }
            for row in rows {
                println!("{}", serde_json::to_string_pretty(&row)?);
            }
        }
    }

    Ok(())
}
