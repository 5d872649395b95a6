use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::collections::HashMap;
use std::path::PathBuf;

use arboretum_pipeline::extractor::{self, is_established};
use arboretum_pipeline::io;
use arboretum_pipeline::metrics::METRICS;
use arboretum_pipeline::models::TreeRecord;

#[derive(Parser, Debug)]
#[command(name = "extract_trees")]
#[command(about = "Parses the campus tree-map KML export into a clean CSV", long_about = None)]
struct Args {
    /// Source KML map export
    #[arg(long, default_value = "data/raw/campus_tree_map.kml")]
    kml: PathBuf,

    /// Output CSV of extracted tree records
    #[arg(long, default_value = "data/processed/trees_clean.csv")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let records = extractor::extract_trees(&args.kml)
        .with_context(|| format!("Failed to extract tree records from {}", args.kml.display()))?;
    io::write_records(&args.out, &records)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    info!("Saved -> {}", args.out.display());

    print_cohort_breakdown(&records);
    print_top_species(&records);
    METRICS.lock().print_extraction_summary();
    Ok(())
}

fn print_cohort_breakdown(records: &[TreeRecord]) {
    let mut cohorts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *cohorts.entry(record.planting_cohort.as_str()).or_default() += 1;
    }
    let mut cohorts: Vec<_> = cohorts.into_iter().collect();
    cohorts.sort();

    println!("\n-- Cohort Breakdown ------------------------------");
    for (cohort, count) in cohorts {
        let label = if is_established(cohort) {
            "established"
        } else {
            "newly planted"
        };
        println!("  {count:4}  {cohort}  ({label})");
    }

    let established = records.iter().filter(|r| r.established).count();
    println!("\n  Established trees: {established}");
    println!("  New plantings:     {}", records.len() - established);
}

fn print_top_species(records: &[TreeRecord]) {
    let mut species: HashMap<&str, usize> = HashMap::new();
    for record in records.iter().filter(|r| r.established) {
        if !record.common_name.is_empty() {
            *species.entry(record.common_name.as_str()).or_default() += 1;
        }
    }
    let mut species: Vec<_> = species.into_iter().collect();
    species.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    println!("\n-- Top 10 Species (established) ------------------");
    for (name, count) in species.iter().take(10) {
        println!("  {count:4}  {name}");
    }
}
