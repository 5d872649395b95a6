//! Stage 1: campus map KML export -> flat tree table.
//!
//! Per placemark: drop known non-tree fixtures, require a usable coordinate
//! pair, pull the labeled fields out of the description blob, derive the
//! planting cohort and established flag from the name, and tokenize the raw
//! DBH field. Malformed individual fields degrade to empty/unset values;
//! only a missing coordinate pair drops a record, and only an unreadable or
//! malformed source file aborts the run.

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::dbh;
use crate::errors::{ParseError, PipelineError};
use crate::metrics::METRICS;
use crate::models::TreeRecord;
use crate::parsers::description::parse_description;
use crate::parsers::kml::{self, Placemark};

/// Placemarks in the source map that are campus fixtures, not trees.
pub const NON_TREE_NAMES: &[&str] = &[
    "Restroom",
    "Water Bottle Fill Station & Fountain",
    "Steel Sculpture IPRO Project Fall Semester 1996",
    "Sculpture",
    "U-Farm",
];

/// Cohort year whose plantings are saplings, not established trees.
pub const NEW_PLANTING_YEAR: &str = "2025";

/// Ordered placemark-name patterns for the planting cohort; first match
/// wins. Group 1 captures the 4-digit year, group 2 the cohort letter.
static COHORT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // "42-2022 U": map ordinal, planting year, cohort letter
        Regex::new(r"^\d+-(\d{4})\s*([A-Za-z]?)").expect("cohort pattern"),
        // bare "2022 U" / "2022-U" labels
        Regex::new(r"^(\d{4})\s*-?\s*([A-Za-z])\b").expect("cohort pattern"),
    ]
});

/// True for placemarks that should be dropped before any other processing.
pub fn is_non_tree(name: &str) -> bool {
    NON_TREE_NAMES.contains(&name)
}

/// Planting cohort code from a placemark name, e.g. "42-2022 U" -> "2022-U".
/// A matched name with no cohort letter defaults to "U"; no pattern match
/// yields "unknown".
pub fn cohort_from_name(name: &str) -> String {
    for pattern in COHORT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(name) {
            let year = &caps[1];
            let code = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            if code.is_empty() {
                return format!("{year}-U");
            }
            return format!("{year}-{}", code.to_uppercase());
        }
    }
    "unknown".to_string()
}

/// False only for the designated new-planting cohort year; unknown cohorts
/// count as established.
pub fn is_established(cohort: &str) -> bool {
    !cohort.starts_with(NEW_PLANTING_YEAR)
}

/// Runs the extraction over a KML file on disk.
pub fn extract_trees(kml_path: &Path) -> Result<Vec<TreeRecord>, PipelineError> {
    info!("Loading KML file {}", kml_path.display());
    let xml = fs::read_to_string(kml_path).map_err(|e| ParseError::IoError {
        path: kml_path.to_path_buf(),
        source: e,
    })?;
    extract_from_str(&xml, kml_path)
}

/// Runs the extraction over an in-memory KML document. Output order follows
/// placemark order in the document.
pub fn extract_from_str(xml: &str, source: &Path) -> Result<Vec<TreeRecord>, PipelineError> {
    let placemarks = kml::parse_placemarks(xml).map_err(|e| ParseError::KmlError {
        path: source.to_path_buf(),
        source: e,
    })?;
    info!("Found {} total placemarks", placemarks.len());

    let progress = ProgressBar::new(placemarks.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut records = Vec::new();
    for placemark in &placemarks {
        METRICS.lock().record_placemark();
        if let Some(record) = build_record(placemark) {
            records.push(record);
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    METRICS.lock().record_extracted(records.len() as u64);
    info!("Kept {} tree records", records.len());
    Ok(records)
}

/// Turns one placemark into a tree record, or drops it (non-tree fixture,
/// or no usable coordinates).
fn build_record(placemark: &Placemark) -> Option<TreeRecord> {
    if is_non_tree(&placemark.name) {
        debug!("Removed non-tree placemark '{}'", placemark.name);
        METRICS.lock().record_non_tree();
        return None;
    }
    let Some((latitude, longitude)) = placemark.coordinates else {
        warn!(
            "Dropped placemark '{}': no usable coordinate pair",
            placemark.name
        );
        METRICS.lock().record_missing_coordinates();
        return None;
    };

    let fields = parse_description(&placemark.description);
    let cohort = cohort_from_name(&placemark.name);
    let established = is_established(&cohort);
    let reading = dbh::derive_reading(&fields.dbh_raw);

    Some(TreeRecord {
        tree_id: fields.tree_id.parse().ok(),
        placemark_name: placemark.name.clone(),
        planting_cohort: cohort,
        established,
        common_name: fields.common_name,
        scientific_name: fields.scientific_name,
        additional_taxonomy: fields.additional_taxonomy,
        dbh_inches: reading.single_stem_in,
        dbh_raw: fields.dbh_raw,
        dbh_equiv: reading.equivalent_in,
        is_multi_stem: reading.multi_stem,
        source: fields.source,
        community_tags: fields.community_tags,
        memorial: fields.memorial,
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placemark(name: &str, description: &str, coordinates: Option<(f64, f64)>) -> Placemark {
        Placemark {
            name: name.to_string(),
            description: description.to_string(),
            coordinates,
        }
    }

    #[test]
    fn non_tree_label_set_has_five_entries() {
        assert_eq!(NON_TREE_NAMES.len(), 5);
        assert!(is_non_tree("U-Farm"));
        assert!(!is_non_tree("42-2022 U"));
    }

    #[test]
    fn cohort_patterns_first_match_wins() {
        assert_eq!(cohort_from_name("42-2022 U"), "2022-U");
        assert_eq!(cohort_from_name("7-2025 O"), "2025-O");
        assert_eq!(cohort_from_name("103-2019"), "2019-U");
        assert_eq!(cohort_from_name("2021 b"), "2021-B");
        assert_eq!(cohort_from_name("Sculpture Garden"), "unknown");
    }

    #[test]
    fn established_follows_new_planting_year() {
        assert!(!is_established("2025-O"));
        assert!(is_established("2022-U"));
        assert!(is_established("unknown"));
    }

    #[test]
    fn record_fields_come_from_name_and_description() {
        let pm = placemark(
            "42-2022 U",
            "Common Name: Ginkgo<br>Scientific Name: Ginkgo biloba<br>Tree ID: 17<br>DBH: 8.5",
            Some((41.835, -87.627)),
        );
        let record = build_record(&pm).unwrap();
        assert_eq!(record.tree_id, Some(17));
        assert_eq!(record.planting_cohort, "2022-U");
        assert!(record.established);
        assert_eq!(record.common_name, "Ginkgo");
        assert_eq!(record.dbh_inches, Some(8.5));
        assert_eq!(record.dbh_equiv, None);
        assert!(!record.is_multi_stem);
        assert_eq!(record.latitude, 41.835);
    }

    #[test]
    fn multi_stem_record_gets_equivalent_diameter() {
        let pm = placemark("9-2021 A", "DBH: 322", Some((41.8, -87.6)));
        let record = build_record(&pm).unwrap();
        assert_eq!(record.dbh_inches, None);
        assert_eq!(record.dbh_equiv, Some(32.06));
        assert!(record.is_multi_stem);
        assert_eq!(record.stem_tokens(), vec!["32", "2"]);
    }

    #[test]
    fn unparseable_dbh_leaves_no_diameter_data() {
        let pm = placemark("9-2021 A", "DBH: n/a", Some((41.8, -87.6)));
        let record = build_record(&pm).unwrap();
        assert_eq!(record.dbh_inches, None);
        assert_eq!(record.dbh_equiv, None);
    }

    #[test]
    fn missing_coordinates_drop_the_record() {
        let pm = placemark("42-2022 U", "DBH: 8.5", None);
        assert!(build_record(&pm).is_none());
    }

    #[test]
    fn non_tree_placemark_is_dropped_entirely() {
        let pm = placemark("Restroom", "", Some((41.8, -87.6)));
        assert!(build_record(&pm).is_none());
    }

    #[test]
    fn diameter_exclusivity_holds_for_extracted_records() {
        for raw in ["DBH: 8.5", "DBH: 322", "DBH: n/a", ""] {
            let pm = placemark("42-2022 U", raw, Some((41.8, -87.6)));
            let record = build_record(&pm).unwrap();
            assert!(!(record.dbh_inches.is_some() && record.dbh_equiv.is_some()));
        }
    }
}
