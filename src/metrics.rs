use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::models::DbhStatus;

/// Global metrics instance
pub static METRICS: Lazy<Mutex<PipelineMetrics>> = Lazy::new(|| Mutex::new(PipelineMetrics::new()));

/// Run counters for both pipeline stages.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    pub placemarks_seen: u64,
    pub non_tree_filtered: u64,
    pub missing_coordinates: u64,
    pub records_extracted: u64,
    pub clean_single: u64,
    pub clean_multi: u64,
    pub excluded_single_stem: u64,
    pub excluded_multi_stem: u64,
    pub no_dbh: u64,
    pub new_planting: u64,
    pub start_time: Option<Instant>,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_placemark(&mut self) {
        self.placemarks_seen += 1;
    }

    pub fn record_non_tree(&mut self) {
        self.non_tree_filtered += 1;
    }

    pub fn record_missing_coordinates(&mut self) {
        self.missing_coordinates += 1;
    }

    pub fn record_extracted(&mut self, count: u64) {
        self.records_extracted += count;
    }

    pub fn record_status(&mut self, status: &DbhStatus, multi_stem: bool) {
        match status {
            DbhStatus::Clean if multi_stem => self.clean_multi += 1,
            DbhStatus::Clean => self.clean_single += 1,
            DbhStatus::ExcludedSingleStem { .. } => self.excluded_single_stem += 1,
            DbhStatus::ExcludedMultiStem(_) => self.excluded_multi_stem += 1,
            DbhStatus::NoData => self.no_dbh += 1,
            DbhStatus::NewPlanting => self.new_planting += 1,
        }
    }

    pub fn get_total_duration(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    pub fn print_extraction_summary(&self) {
        println!("\n========== Extraction Summary ==========");
        println!("Placemarks Seen: {}", self.placemarks_seen);
        println!("Non-Tree Placemarks Removed: {}", self.non_tree_filtered);
        println!("Dropped (no usable coordinates): {}", self.missing_coordinates);
        println!("Tree Records Kept: {}", self.records_extracted);
        println!("Total Duration: {:.2?}", self.get_total_duration());
        println!("========================================\n");
    }

    pub fn print_validation_summary(&self) {
        let total_clean = self.clean_single + self.clean_multi;
        let total_excluded = self.excluded_single_stem + self.excluded_multi_stem;
        let established = total_clean + total_excluded + self.no_dbh;
        let excluded_pct = if established > 0 {
            total_excluded as f64 / established as f64 * 100.0
        } else {
            0.0
        };
        println!("\n========== DBH Cleaning Summary ==========");
        println!("Clean single-stem:    {:>5}", self.clean_single);
        println!("Clean multi-stem:     {:>5}", self.clean_multi);
        println!("Total clean:          {:>5}", total_clean);
        println!(
            "Excluded single-stem: {:>5}  (exceeds species max DBH)",
            self.excluded_single_stem
        );
        println!(
            "Excluded multi-stem:  {:>5}  (implausible stem parse)",
            self.excluded_multi_stem
        );
        println!(
            "Total excluded:       {:>5}  ({excluded_pct:.1}% of established trees)",
            total_excluded
        );
        println!("No DBH data:          {:>5}", self.no_dbh);
        println!("New plantings:        {:>5}", self.new_planting);
        println!("Total Duration: {:.2?}", self.get_total_duration());
        println!("==========================================\n");
    }
}
