use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::dbh;

/// One cleaned tree row produced by the extractor. Field order matches the
/// 16-column CSV layout exactly (serde/csv derive headers from it).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreeRecord {
    /// Numeric id from the map description, when present.
    pub tree_id: Option<u64>,
    pub placemark_name: String,
    /// "<year>-<code>" planting cohort, or "unknown".
    pub planting_cohort: String,
    /// False only for the designated new-planting cohort year.
    pub established: bool,
    pub common_name: String,
    pub scientific_name: String,
    pub additional_taxonomy: String,
    /// Single-stem DBH in inches; set iff exactly one stem token parses.
    pub dbh_inches: Option<f64>,
    /// Raw DBH text as found in the map. The ordered stem tokens are
    /// re-derived from this by both pipeline stages.
    pub dbh_raw: String,
    /// Basal-area equivalent diameter over two or more stems.
    pub dbh_equiv: Option<f64>,
    pub is_multi_stem: bool,
    pub source: String,
    pub community_tags: String,
    pub memorial: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl TreeRecord {
    /// Ordered stem tokens recorded for this row, re-derived from the raw
    /// DBH text with the shared tokenizer.
    pub fn stem_tokens(&self) -> Vec<String> {
        dbh::split_stems(&self.dbh_raw)
    }
}

/// Why a multi-stem record was excluded from analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum MultiStemExclusion {
    /// The greedy re-parse produced a stem wider than the species allows,
    /// i.e. the concatenated digits were almost certainly mis-split.
    ImplausibleStem { stems: Vec<u32>, max_in: f64 },
    /// Re-tokenizing the raw text no longer yields the recorded number of
    /// stems; the raw field is malformed and is never silently re-split.
    StemCountMismatch { recorded: usize, reparsed: usize },
}

/// Per-row outcome of DBH validation. Closed set so downstream consumers can
/// handle every case exhaustively; rendered into the CSV as a stable string.
#[derive(Debug, Clone, PartialEq)]
pub enum DbhStatus {
    Clean,
    ExcludedSingleStem { max_in: f64 },
    ExcludedMultiStem(MultiStemExclusion),
    NoData,
    NewPlanting,
}

impl DbhStatus {
    pub fn is_clean(&self) -> bool {
        matches!(self, DbhStatus::Clean)
    }

    pub fn is_excluded(&self) -> bool {
        matches!(
            self,
            DbhStatus::ExcludedSingleStem { .. } | DbhStatus::ExcludedMultiStem(_)
        )
    }
}

/// Formats a cap in inches without a trailing ".0" for whole-inch caps.
fn format_inches(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

impl fmt::Display for DbhStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbhStatus::Clean => write!(f, "clean"),
            DbhStatus::ExcludedSingleStem { max_in } => write!(
                f,
                "excluded_single_stem_exceeds_{}in_max_for_species",
                format_inches(*max_in)
            ),
            DbhStatus::ExcludedMultiStem(MultiStemExclusion::ImplausibleStem {
                stems,
                max_in,
            }) => write!(
                f,
                "excluded_multi_stem_implausible_parse_{:?}_exceeds_{}in_max_for_species",
                stems,
                format_inches(*max_in)
            ),
            DbhStatus::ExcludedMultiStem(MultiStemExclusion::StemCountMismatch {
                recorded,
                reparsed,
            }) => write!(
                f,
                "excluded_multi_stem_stem_count_mismatch_recorded_{recorded}_reparsed_{reparsed}"
            ),
            DbhStatus::NoData => write!(f, "no_dbh"),
            DbhStatus::NewPlanting => write!(f, "new_planting"),
        }
    }
}

impl Serialize for DbhStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Validator output row: the extracted record plus the clean diameter and
/// its explanatory status. 18-column CSV layout, in field order.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedTreeRecord {
    pub tree_id: Option<u64>,
    pub placemark_name: String,
    pub planting_cohort: String,
    pub established: bool,
    pub common_name: String,
    pub scientific_name: String,
    pub additional_taxonomy: String,
    pub dbh_inches: Option<f64>,
    pub dbh_raw: String,
    pub dbh_equiv: Option<f64>,
    /// The diameter to use for analysis; set iff `dbh_status` is clean.
    pub dbh_clean: Option<f64>,
    pub dbh_status: DbhStatus,
    pub is_multi_stem: bool,
    pub source: String,
    pub community_tags: String,
    pub memorial: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ValidatedTreeRecord {
    /// Builds the output row from an extracted record and the validation
    /// outcome. The input record is never mutated; every validator run
    /// produces a fresh row set.
    pub fn from_record(record: &TreeRecord, dbh_clean: Option<f64>, dbh_status: DbhStatus) -> Self {
        Self {
            tree_id: record.tree_id,
            placemark_name: record.placemark_name.clone(),
            planting_cohort: record.planting_cohort.clone(),
            established: record.established,
            common_name: record.common_name.clone(),
            scientific_name: record.scientific_name.clone(),
            additional_taxonomy: record.additional_taxonomy.clone(),
            dbh_inches: record.dbh_inches,
            dbh_raw: record.dbh_raw.clone(),
            dbh_equiv: record.dbh_equiv,
            dbh_clean,
            dbh_status,
            is_multi_stem: record.is_multi_stem,
            source: record.source.clone(),
            community_tags: record.community_tags.clone(),
            memorial: record.memorial.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_are_stable() {
        assert_eq!(DbhStatus::Clean.to_string(), "clean");
        assert_eq!(DbhStatus::NoData.to_string(), "no_dbh");
        assert_eq!(DbhStatus::NewPlanting.to_string(), "new_planting");
        assert_eq!(
            DbhStatus::ExcludedSingleStem { max_in: 15.0 }.to_string(),
            "excluded_single_stem_exceeds_15in_max_for_species"
        );
        assert_eq!(
            DbhStatus::ExcludedMultiStem(MultiStemExclusion::ImplausibleStem {
                stems: vec![64, 3],
                max_in: 15.0,
            })
            .to_string(),
            "excluded_multi_stem_implausible_parse_[64, 3]_exceeds_15in_max_for_species"
        );
        assert_eq!(
            DbhStatus::ExcludedMultiStem(MultiStemExclusion::StemCountMismatch {
                recorded: 3,
                reparsed: 1,
            })
            .to_string(),
            "excluded_multi_stem_stem_count_mismatch_recorded_3_reparsed_1"
        );
    }

    #[test]
    fn stem_tokens_follow_raw_text() {
        let record = TreeRecord {
            dbh_raw: "643".to_string(),
            ..TreeRecord::default()
        };
        assert_eq!(record.stem_tokens(), vec!["64", "3"]);
    }
}
