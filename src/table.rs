//! Column-oriented table types for raw and processed data.
//!
//! The raw table holds free text exactly as read from the CSV. The processed
//! table holds the numeric features, one row per original sample.

use indexmap::IndexMap;

use crate::error::{PipelineError, Result};

/// A raw text column. `None` is a null (empty) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<Option<String>>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Build a column from string literals, treating `""` as null
    pub fn from_strs(name: impl Into<String>, values: &[&str]) -> Self {
        let values = values
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect();
        Self::new(name, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate cells as `Option<&str>`
    pub fn cells(&self) -> impl Iterator<Item = Option<&str>> {
        self.values.iter().map(|v| v.as_deref())
    }
}

/// Ordered set of named text columns, all of the same length.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    columns: IndexMap<String, RawColumn>,
    row_count: usize,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from columns in order.
    ///
    /// Fails if the columns disagree on row count or a name repeats.
    pub fn from_columns(columns: Vec<RawColumn>) -> Result<Self> {
        let mut table = Self::new();
        for column in columns {
            table.push(column)?;
        }
        Ok(table)
    }

    pub fn push(&mut self, column: RawColumn) -> Result<()> {
        if self.columns.is_empty() {
            self.row_count = column.len();
        } else if column.len() != self.row_count {
            return Err(PipelineError::Table(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.row_count
            )));
        }

        if self.columns.contains_key(&column.name) {
            return Err(PipelineError::Table(format!(
                "duplicate column '{}'",
                column.name
            )));
        }

        self.columns.insert(column.name.clone(), column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

/// A named numeric output column. `None` is a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl OutputColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// What an extractor returns: one column, or a frame of several.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractorOutput {
    Single(OutputColumn),
    Frame(Vec<OutputColumn>),
}

impl ExtractorOutput {
    /// Flatten into the produced columns, in order
    pub fn into_columns(self) -> Vec<OutputColumn> {
        match self {
            ExtractorOutput::Single(column) => vec![column],
            ExtractorOutput::Frame(columns) => columns,
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        match self {
            ExtractorOutput::Single(column) => vec![column.name.as_str()],
            ExtractorOutput::Frame(columns) => columns.iter().map(|c| c.name.as_str()).collect(),
        }
    }
}

impl From<OutputColumn> for ExtractorOutput {
    fn from(column: OutputColumn) -> Self {
        ExtractorOutput::Single(column)
    }
}

/// Numeric table assembled column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTable {
    columns: Vec<OutputColumn>,
    row_count: usize,
}

impl ProcessedTable {
    /// Create an empty table that will hold `row_count` rows
    pub fn with_rows(row_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            row_count,
        }
    }

    /// Append a column produced by the extractor for `source`.
    ///
    /// The column must have exactly one value per row and a name not
    /// already present.
    pub fn push(&mut self, source: &str, column: OutputColumn) -> Result<()> {
        if column.len() != self.row_count {
            return Err(PipelineError::InvalidExtractorOutput {
                column: source.to_string(),
                reason: format!(
                    "output '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    self.row_count
                ),
            });
        }

        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(PipelineError::InvalidExtractorOutput {
                column: source.to_string(),
                reason: format!("output '{}' is already present", column.name),
            });
        }

        self.columns.push(column);
        Ok(())
    }

    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&OutputColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Row `i` across all columns
    pub fn row(&self, i: usize) -> Option<Vec<Option<f64>>> {
        if i >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[i]).collect())
    }
}
