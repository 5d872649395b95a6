//! Batch cleaning pipeline for the campus tree inventory.
//!
//! Two sequential single-pass stages share this library: `extract_trees`
//! parses the campus map KML export into a flat tree table, and
//! `validate_dbh` applies species-specific plausibility rules to produce the
//! final table with a clean diameter column and a per-row status.

pub mod dbh;
pub mod errors;
pub mod extractor;
pub mod io;
pub mod metrics;
pub mod models;
pub mod parsers;
pub mod species;
pub mod validator;

pub use errors::{ConfigError, ParseError, PipelineError};
pub use models::{DbhStatus, MultiStemExclusion, TreeRecord, ValidatedTreeRecord};
pub use species::SpeciesLimits;
