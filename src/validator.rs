//! Stage 2: species-specific DBH validation.
//!
//! Assigns every extracted record a trustworthy clean diameter and an
//! explanatory status. Rows are never dropped: an implausible value is
//! excluded via its status and an unset clean diameter, so every flagged
//! tree stays traceable with its reason. The transform is a pure function
//! of each record plus the read-only species limits.

use log::info;

use crate::metrics::METRICS;
use crate::models::{DbhStatus, MultiStemExclusion, TreeRecord, ValidatedTreeRecord};
use crate::species::SpeciesLimits;

/// Validates a whole table, preserving row count and order.
pub fn validate_records(
    records: &[TreeRecord],
    limits: &SpeciesLimits,
) -> Vec<ValidatedTreeRecord> {
    let validated: Vec<ValidatedTreeRecord> = records
        .iter()
        .map(|record| validate_record(record, limits))
        .collect();
    info!("Validated {} tree records", validated.len());
    validated
}

/// Validates one record against the species limits.
pub fn validate_record(record: &TreeRecord, limits: &SpeciesLimits) -> ValidatedTreeRecord {
    let (dbh_clean, dbh_status) = classify(record, limits);
    METRICS.lock().record_status(&dbh_status, record.is_multi_stem);
    ValidatedTreeRecord::from_record(record, dbh_clean, dbh_status)
}

fn classify(record: &TreeRecord, limits: &SpeciesLimits) -> (Option<f64>, DbhStatus) {
    // Saplings are out of scope for diameter analysis regardless of any
    // recorded value.
    if !record.established {
        return (None, DbhStatus::NewPlanting);
    }

    let cap = limits.max_for(&record.scientific_name, &record.common_name);
    match (record.dbh_inches, record.dbh_equiv) {
        (None, None) => (None, DbhStatus::NoData),
        (Some(single), _) => match cap {
            Some(max_in) if single > max_in => (None, DbhStatus::ExcludedSingleStem { max_in }),
            _ => (Some(single), DbhStatus::Clean),
        },
        (None, Some(equivalent)) => classify_multi_stem(record, equivalent, cap),
    }
}

/// Re-derives the per-stem values from the raw text and checks each against
/// the cap. A raw field that no longer re-tokenizes into the recorded stem
/// count is malformed and gets its own exclusion sub-reason instead of a
/// guessed split.
fn classify_multi_stem(
    record: &TreeRecord,
    equivalent: f64,
    cap: Option<f64>,
) -> (Option<f64>, DbhStatus) {
    let tokens = record.stem_tokens();
    let stems: Vec<u32> = tokens
        .iter()
        .filter_map(|token| token.parse::<u32>().ok())
        .collect();

    if stems.len() != tokens.len() || stems.len() < 2 {
        return (
            None,
            DbhStatus::ExcludedMultiStem(MultiStemExclusion::StemCountMismatch {
                recorded: tokens.len(),
                reparsed: stems.len(),
            }),
        );
    }

    if let Some(max_in) = cap {
        if stems.iter().any(|&stem| f64::from(stem) > max_in) {
            return (
                None,
                DbhStatus::ExcludedMultiStem(MultiStemExclusion::ImplausibleStem {
                    stems,
                    max_in,
                }),
            );
        }
    }

    (Some(equivalent), DbhStatus::Clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbh;

    fn limits() -> SpeciesLimits {
        SpeciesLimits::builtin()
    }

    fn record(common_name: &str, dbh_raw: &str) -> TreeRecord {
        let reading = dbh::derive_reading(dbh_raw);
        TreeRecord {
            placemark_name: "1-2022 U".to_string(),
            planting_cohort: "2022-U".to_string(),
            established: true,
            common_name: common_name.to_string(),
            dbh_inches: reading.single_stem_in,
            dbh_raw: dbh_raw.to_string(),
            dbh_equiv: reading.equivalent_in,
            is_multi_stem: reading.multi_stem,
            latitude: 41.8,
            longitude: -87.6,
            ..TreeRecord::default()
        }
    }

    #[test]
    fn sapling_overrides_any_recorded_diameter() {
        let mut sapling = record("Redbud-Eastern", "98");
        sapling.planting_cohort = "2025-O".to_string();
        sapling.established = false;
        let validated = validate_record(&sapling, &limits());
        assert_eq!(validated.dbh_status, DbhStatus::NewPlanting);
        assert_eq!(validated.dbh_clean, None);
    }

    #[test]
    fn missing_diameters_mean_no_data() {
        let validated = validate_record(&record("Hawthorn", ""), &limits());
        assert_eq!(validated.dbh_status, DbhStatus::NoData);
        assert_eq!(validated.dbh_clean, None);
    }

    #[test]
    fn single_stem_within_cap_is_clean() {
        let validated = validate_record(&record("Redbud-Eastern", "15"), &limits());
        assert_eq!(validated.dbh_status, DbhStatus::Clean);
        assert_eq!(validated.dbh_clean, Some(15.0));
    }

    #[test]
    fn single_stem_above_cap_is_excluded() {
        let validated = validate_record(&record("Redbud-Eastern", "98"), &limits());
        assert_eq!(
            validated.dbh_status,
            DbhStatus::ExcludedSingleStem { max_in: 15.0 }
        );
        assert_eq!(validated.dbh_clean, None);
    }

    #[test]
    fn unknown_species_is_not_capped() {
        let validated = validate_record(&record("Oak-Bur", "98"), &limits());
        assert_eq!(validated.dbh_status, DbhStatus::Clean);
        assert_eq!(validated.dbh_clean, Some(98.0));
    }

    #[test]
    fn scientific_name_cap_takes_precedence() {
        let limits = SpeciesLimits::from_entries([
            ("Cercis canadensis".to_string(), 10.0),
            ("Redbud-Eastern".to_string(), 15.0),
        ]);
        let mut tree = record("Redbud-Eastern", "12");
        tree.scientific_name = "Cercis canadensis".to_string();
        let validated = validate_record(&tree, &limits);
        assert_eq!(
            validated.dbh_status,
            DbhStatus::ExcludedSingleStem { max_in: 10.0 }
        );
    }

    #[test]
    fn multi_stem_with_plausible_stems_is_clean() {
        // "322" -> [32, 2]; no cap for an unlisted species
        let validated = validate_record(&record("Oak-Bur", "322"), &limits());
        assert_eq!(validated.dbh_status, DbhStatus::Clean);
        assert_eq!(validated.dbh_clean, Some(32.06));
    }

    #[test]
    fn multi_stem_with_implausible_stem_is_excluded() {
        // "643" -> greedy [64, 3]; 64 exceeds the 15in redbud cap
        let validated = validate_record(&record("Redbud-Eastern", "643"), &limits());
        assert_eq!(
            validated.dbh_status,
            DbhStatus::ExcludedMultiStem(MultiStemExclusion::ImplausibleStem {
                stems: vec![64, 3],
                max_in: 15.0,
            })
        );
        assert_eq!(validated.dbh_clean, None);
    }

    #[test]
    fn reparse_count_mismatch_is_its_own_exclusion() {
        // A multi-stem row whose raw text was mangled to a single reading
        // between the passes must not be silently re-split.
        let mut tree = record("Oak-Bur", "322");
        tree.dbh_raw = "12.5".to_string();
        let validated = validate_record(&tree, &limits());
        assert_eq!(
            validated.dbh_status,
            DbhStatus::ExcludedMultiStem(MultiStemExclusion::StemCountMismatch {
                recorded: 1,
                reparsed: 0,
            })
        );
        assert_eq!(validated.dbh_clean, None);
    }

    #[test]
    fn clean_status_and_clean_value_are_coupled() {
        let limits = limits();
        for raw in ["15", "98", "322", "643", "", "n/a"] {
            for species in ["Redbud-Eastern", "Oak-Bur"] {
                let validated = validate_record(&record(species, raw), &limits);
                assert_eq!(
                    validated.dbh_clean.is_some(),
                    validated.dbh_status.is_clean(),
                    "coupling broken for species {species:?}, raw {raw:?}"
                );
            }
        }
    }

    #[test]
    fn validation_preserves_row_count_and_order() {
        let rows = vec![
            record("Redbud-Eastern", "8"),
            record("Redbud-Eastern", "98"),
            record("Oak-Bur", ""),
        ];
        let validated = validate_records(&rows, &limits());
        assert_eq!(validated.len(), rows.len());
        for (row, out) in rows.iter().zip(&validated) {
            assert_eq!(row.dbh_raw, out.dbh_raw);
        }
    }
}
