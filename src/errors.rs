use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading species limit file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse species limit JSON in {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Species limit file not found at {path}")]
    NotFound { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading data file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed KML document in {path}: {source}")]
    KmlError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("Error reading CSV rows in {path}: {source}")]
    CsvError {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Species limit loading failed: {0}")]
    Config(#[from] ConfigError),
    #[error("Parsing failed: {0}")]
    Parse(#[from] ParseError),
    #[error("IO error writing {path}: {source}")]
    OutputIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error writing CSV rows to {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
