//! CSV read/write for the record tables.

use log::info;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::errors::{ParseError, PipelineError};
use crate::models::TreeRecord;

/// Loads the extracted tree table. A missing or malformed file is fatal;
/// the extractor guarantees well-formed rows.
pub fn read_tree_records(path: &Path) -> Result<Vec<TreeRecord>, PipelineError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| ParseError::CsvError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: TreeRecord = row.map_err(|e| ParseError::CsvError {
            path: path.to_path_buf(),
            source: e,
        })?;
        records.push(record);
    }
    info!("Loaded {} tree records from {}", records.len(), path.display());
    Ok(records)
}

/// Writes a record table with a header row derived from the struct fields.
/// Output is write-once per run; re-running regenerates it from the same
/// inputs.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::OutputIo {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }
    let mut writer = csv::Writer::from_path(path).map_err(|e| PipelineError::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    for record in records {
        writer.serialize(record).map_err(|e| PipelineError::CsvWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    writer.flush().map_err(|e| PipelineError::OutputIo {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("Saved {} rows -> {}", records.len(), path.display());
    Ok(())
}
