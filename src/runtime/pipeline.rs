//! Table transform driver.
//!
//! Validates the raw header against the registry, runs each extractor in
//! registry order and assembles the processed table.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::runtime::config_loader::PipelineConfig;
use crate::serialization::{read_raw_table, write_json, write_processed_table};
use crate::table::{ExtractorOutput, ProcessedTable, RawTable};
use crate::transform_registry::{ColumnRule, ExtractorRegistry};

/// Missing-value count for one output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub missing: usize,
}

/// Summary of a completed transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformReport {
    pub rows: usize,
    pub input_columns: usize,
    pub output_columns: Vec<ColumnSummary>,
}

impl TransformReport {
    pub fn from_tables(raw: &RawTable, processed: &ProcessedTable) -> Self {
        Self {
            rows: processed.row_count(),
            input_columns: raw.column_count(),
            output_columns: processed
                .columns()
                .iter()
                .map(|c| ColumnSummary {
                    name: c.name.clone(),
                    missing: c.missing_count(),
                })
                .collect(),
        }
    }
}

/// Transform a raw table into the processed table.
///
/// Every raw column must be registered, and every column with an extractor
/// must be present in the raw table.
pub fn transform(raw: &RawTable, registry: &ExtractorRegistry) -> Result<ProcessedTable> {
    registry.validate_columns(raw.column_names())?;
    registry.require_columns(raw.column_names())?;

    let mut processed = ProcessedTable::with_rows(raw.row_count());

    for (name, rule) in registry.iter() {
        let func = match rule {
            ColumnRule::Extractor(func) => func,
            ColumnRule::PassThrough(label) => {
                debug!(column = name, label = %label, "Skipping pass-through column");
                continue;
            }
        };

        let column = raw
            .column(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))?;

        let output = func.extract(column);
        debug!(column = name, outputs = ?output.column_names(), "Extracted column");

        if let ExtractorOutput::Frame(columns) = &output {
            if columns.is_empty() {
                warn!(column = name, "Extractor produced no output columns");
            }
        }

        for out in output.into_columns() {
            if !out.is_empty() && out.missing_count() == out.len() {
                warn!(column = name, output = %out.name, "Every value is missing");
            }
            processed.push(name, out)?;
        }
    }

    if processed.is_empty() {
        return Err(PipelineError::EmptyResult);
    }

    Ok(processed)
}

/// Build the registry a config asks for
pub fn registry_for(config: &PipelineConfig) -> Result<ExtractorRegistry> {
    let registry = ExtractorRegistry::epoxy()?;
    Ok(if config.encode_categories {
        registry.with_category_encoding()
    } else {
        registry
    })
}

/// Load and validate the raw table without transforming it
pub fn validate(config: &PipelineConfig, registry: &ExtractorRegistry) -> Result<RawTable> {
    let raw = read_raw_table(config.input())?;
    registry.validate_columns(raw.column_names())?;
    registry.require_columns(raw.column_names())?;
    Ok(raw)
}

/// Full run: directories, load, validate, transform, write.
///
/// Nothing is written to the output path unless every step succeeds. The
/// optional report is written after the output and a failure there is only
/// logged.
pub fn run(config: &PipelineConfig, registry: &ExtractorRegistry) -> Result<TransformReport> {
    config.ensure_directories()?;

    let raw = read_raw_table(config.input())?;
    let processed = transform(&raw, registry)?;
    write_processed_table(&processed, config.output())?;

    let report = TransformReport::from_tables(&raw, &processed);
    info!(
        rows = report.rows,
        input_columns = report.input_columns,
        output_columns = report.output_columns.len(),
        "Transform complete"
    );

    if let Some(path) = config.report() {
        match write_json(&report, &path) {
            Ok(()) => info!(path = %path.display(), "Wrote run report"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to write run report"),
        }
    }

    Ok(report)
}
