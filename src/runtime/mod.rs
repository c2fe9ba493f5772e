//! Pipeline runtime: configuration and the table transform driver.

pub mod config_loader;
pub mod pipeline;

pub use config_loader::PipelineConfig;
pub use pipeline::{registry_for, run, transform, validate, ColumnSummary, TransformReport};
