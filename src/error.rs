//! Error taxonomy for the preprocessing pipeline.
//!
//! Every variant is fatal for a run. Cells whose text does not parse are not
//! errors; they become missing values inside the extractors.

use std::fmt;
use std::path::PathBuf;

/// Error type for pipeline operations
#[derive(Debug)]
pub enum PipelineError {
    /// The raw input CSV does not exist
    MissingInputFile(PathBuf),
    /// A raw column has no registered extraction rule
    UnknownColumn(String),
    /// A column with a registered extractor is absent from the raw table
    MissingColumn(String),
    /// An extractor returned columns that cannot be assembled into the output table
    InvalidExtractorOutput {
        column: String,
        reason: String,
    },
    /// No extractor produced an output column
    EmptyResult,
    /// Columns that cannot form a table (ragged or duplicated)
    Table(String),
    Config(String),
    Csv(String),
    Json(String),
    Io(std::io::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::MissingInputFile(path) => {
                write!(f, "Data file '{}' does not exist", path.display())
            }
            PipelineError::UnknownColumn(name) => {
                write!(f, "Feature '{}' not found in extractor registry", name)
            }
            PipelineError::MissingColumn(name) => {
                write!(f, "Feature '{}' has an extractor but is missing from the data", name)
            }
            PipelineError::InvalidExtractorOutput { column, reason } => {
                write!(f, "Extractor for '{}' returned invalid output: {}", column, reason)
            }
            PipelineError::EmptyResult => {
                write!(f, "No results. Check the extractor registry and data")
            }
            PipelineError::Table(msg) => write!(f, "Table error: {}", msg),
            PipelineError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PipelineError::Csv(msg) => write!(f, "CSV error: {}", msg),
            PipelineError::Json(msg) => write!(f, "JSON error: {}", msg),
            PipelineError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err)
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Csv(err.to_string())
    }
}

impl From<serde_yaml::Error> for PipelineError {
    fn from(err: serde_yaml::Error) -> Self {
        PipelineError::Config(format!("Failed to parse YAML: {}", err))
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Json(err.to_string())
    }
}

impl From<regex::Error> for PipelineError {
    fn from(err: regex::Error) -> Self {
        PipelineError::Config(format!("Invalid parsing rule: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
