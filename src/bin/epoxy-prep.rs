//! epoxy-prep CLI - extract numeric features from the raw epoxy composite table
//!
//! Run without arguments to preprocess `data/all_epoxy_data.csv` into
//! `data/preprocessed_data.csv`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use epoxy_prep::runtime::config_loader::DEFAULT_CONFIG_FILE;
use epoxy_prep::{ColumnRule, PipelineConfig, RawColumn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "epoxy-prep")]
#[command(version, about = "Feature extraction for epoxy composite experiment tables", long_about = None)]
struct Cli {
    /// Path to YAML configuration (default: epoxy-prep.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base directory for relative paths
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Raw CSV table
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Processed CSV table
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// One-hot encode filler type and accelerator
    #[arg(long, global = true)]
    encode_categories: bool,

    /// Write a JSON run report to this path
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Preprocess the raw table (default)
    Run,

    /// Check the raw table header against the extractor registry
    Validate,

    /// List registered columns and what they produce
    Columns,
}

fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(&cli).and_then(|config| match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_pipeline(&config),
        Commands::Validate => validate_input(&config),
        Commands::Columns => list_columns(&config),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolve configuration with precedence: CLI > ENV > config file > defaults
fn load_config(cli: &Cli) -> Result<PipelineConfig, String> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load_from_file(path).map_err(|e| e.to_string())?,
        None if PathBuf::from(DEFAULT_CONFIG_FILE).exists() => {
            PipelineConfig::load_from_file(DEFAULT_CONFIG_FILE).map_err(|e| e.to_string())?
        }
        None => PipelineConfig::default(),
    };

    config.apply_env();

    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(input) = &cli.input {
        config.input_path = input.clone();
    }
    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if let Some(report) = &cli.report {
        config.report_path = Some(report.clone());
    }
    if cli.encode_categories {
        config.encode_categories = true;
    }

    Ok(config)
}

fn run_pipeline(config: &PipelineConfig) -> Result<(), String> {
    let registry = epoxy_prep::registry_for(config).map_err(|e| e.to_string())?;

    let report = epoxy_prep::run(config, &registry).map_err(|e| e.to_string())?;
    println!(
        "  ✓ Processed {} rows into {} columns",
        report.rows,
        report.output_columns.len()
    );
    println!("Preprocessed data saved to '{}'", config.output().display());
    Ok(())
}

fn validate_input(config: &PipelineConfig) -> Result<(), String> {
    let registry = epoxy_prep::registry_for(config).map_err(|e| e.to_string())?;

    let raw = epoxy_prep::validate(config, &registry).map_err(|e| e.to_string())?;
    println!(
        "  ✓ All {} columns of '{}' are registered ({} rows)",
        raw.column_count(),
        config.input().display(),
        raw.row_count()
    );
    Ok(())
}

fn list_columns(config: &PipelineConfig) -> Result<(), String> {
    let registry = epoxy_prep::registry_for(config).map_err(|e| e.to_string())?;

    // Output names come from running each extractor on an empty column
    for (name, rule) in registry.iter() {
        match rule {
            ColumnRule::PassThrough(label) => println!("{}\tpass-through ({})", name, label),
            ColumnRule::Extractor(func) => {
                let outputs = func.extract(&RawColumn::new(name, Vec::new()));
                let names = outputs.column_names();
                if names.is_empty() {
                    println!("{}\t(data-dependent columns)", name);
                } else {
                    println!("{}\t{}", name, names.join(", "));
                }
            }
        }
    }
    Ok(())
}
