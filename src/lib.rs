//! # epoxy-prep: Feature Extraction for Epoxy Composite Experiment Tables
//!
//! Turns a raw CSV of free-text experiment records (values with units,
//! Chinese annotations, mixing ratios) into a clean numeric dataset.
//!
//! ## Features
//!
//! - **Extractor registry**: ordered map from raw column name to either a
//!   pass-through label or an extraction function
//! - **Parsing rules**: named patterns for decimal numbers, `a:b` ratios and
//!   room-temperature tokens
//! - **Transform driver**: validates the header, runs extractors in registry
//!   order and writes the processed table atomically
//!
//! ## Example
//!
//! ```
//! use epoxy_prep::{transform, ExtractorRegistry, RawColumn, RawTable};
//!
//! let registry = ExtractorRegistry::epoxy()
//!     .unwrap()
//!     .retain_columns(&["温度", "填料比例"]);
//! let raw = RawTable::from_columns(vec![
//!     RawColumn::from_strs("温度", &["25", "室温"]),
//!     RawColumn::from_strs("填料比例", &["30:70", "45%"]),
//! ])
//! .unwrap();
//!
//! let processed = transform(&raw, &registry).unwrap();
//! assert_eq!(processed.column_names(), vec!["filler_proportion(%)", "temperature(K)"]);
//! assert_eq!(processed.row(1), Some(vec![Some(45.0), Some(299.15)]));
//! ```

// Core modules
pub mod error;
pub mod table;
pub mod extraction;
pub mod extractors;
pub mod transform_registry;
pub mod serialization;

// Configuration and transform driver
pub mod runtime;

// Re-export key types
pub use error::PipelineError;
pub use table::{ExtractorOutput, OutputColumn, ProcessedTable, RawColumn, RawTable};
pub use extraction::ParsingRules;
pub use transform_registry::{ColumnRule, ExtractFn, ExtractorRegistry};

pub use runtime::{
    registry_for, run, transform, validate, ColumnSummary, PipelineConfig, TransformReport,
};
