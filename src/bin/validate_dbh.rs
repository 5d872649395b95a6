use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use arboretum_pipeline::io;
use arboretum_pipeline::metrics::METRICS;
use arboretum_pipeline::species::SpeciesLimits;
use arboretum_pipeline::validator;

#[derive(Parser, Debug)]
#[command(name = "validate_dbh")]
#[command(about = "Flags and excludes implausible DBH values in the extracted tree table", long_about = None)]
struct Args {
    /// Extracted tree table (output of extract_trees)
    #[arg(long, default_value = "data/processed/trees_clean.csv")]
    input: PathBuf,

    /// Output CSV with dbh_clean and dbh_status columns added
    #[arg(long, default_value = "data/processed/trees_corrected.csv")]
    out: PathBuf,

    /// Optional JSON file of per-species max DBH overrides
    #[arg(long, env = "SPECIES_LIMITS")]
    species_limits: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let limits = match &args.species_limits {
        Some(path) => SpeciesLimits::load_with_overrides(path)
            .with_context(|| format!("Failed to load species limits from {}", path.display()))?,
        None => SpeciesLimits::builtin(),
    };
    info!("Using {} species limit entries", limits.len());

    let records = io::read_tree_records(&args.input)
        .with_context(|| format!("Failed to load tree records from {}", args.input.display()))?;
    let validated = validator::validate_records(&records, &limits);
    io::write_records(&args.out, &validated)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    info!("Saved -> {}", args.out.display());

    METRICS.lock().print_validation_summary();
    Ok(())
}
