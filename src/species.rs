//! Species-specific DBH plausibility limits.
//!
//! A read-only map from species name to the maximum realistic single-stem
//! DBH in inches, derived from species biology and the clean part of the
//! reference inventory. Loaded once per run and passed to the validator
//! explicitly; a species with no entry is not capped at all.

use log::info;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct SpeciesLimits {
    max_dbh_in: HashMap<String, f64>,
}

impl SpeciesLimits {
    /// Curated table for the species that dominate the campus inventory.
    pub fn builtin() -> Self {
        let table: &[(&str, f64)] = &[
            ("Redbud-Eastern", 15.0),
            ("Hawthorn", 16.0),
            ("Serviceberry", 10.0),
            ("Hornbeam-American", 10.0),
            ("Arborvitae-Eastern", 12.0),
            ("Crabapple", 14.0),
            ("Birch-Gray", 14.0),
            ("Dogwood-Pagoda", 8.0),
            ("Maple-Amur", 12.0),
            ("Hophornbeam- American", 10.0),
            ("Viburnum", 6.0),
            ("Black Lace Elderberry", 6.0),
        ];
        Self {
            max_dbh_in: table
                .iter()
                .map(|(name, max)| (name.to_string(), *max))
                .collect(),
        }
    }

    /// Builds a table from explicit entries (test and override plumbing).
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self {
            max_dbh_in: entries.into_iter().collect(),
        }
    }

    /// Loads a JSON object of `{"<species>": <max_in>}` and layers it over
    /// the built-in table; the file wins per key.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);
        let overrides: HashMap<String, f64> =
            serde_json::from_reader(reader).map_err(|e| ConfigError::JsonParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        info!(
            "Loaded {} species limit overrides from {}",
            overrides.len(),
            path.display()
        );
        let mut limits = Self::builtin();
        limits.max_dbh_in.extend(overrides);
        Ok(limits)
    }

    /// Cap for one record: scientific name first, then common name. A miss
    /// on both means the record is not subject to species-specific capping.
    pub fn max_for(&self, scientific_name: &str, common_name: &str) -> Option<f64> {
        self.lookup(scientific_name).or_else(|| self.lookup(common_name))
    }

    fn lookup(&self, name: &str) -> Option<f64> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.max_dbh_in.get(trimmed).copied()
    }

    pub fn len(&self) -> usize {
        self.max_dbh_in.len()
    }

    pub fn is_empty(&self) -> bool {
        self.max_dbh_in.is_empty()
    }
}
