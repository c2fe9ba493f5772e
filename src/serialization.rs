//! CSV and JSON boundaries of the pipeline.
//!
//! The raw table is read entirely as text. The processed table is written to
//! a temporary file next to the destination and renamed into place once it
//! is complete, so a failed run never leaves a partial output file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::table::{ProcessedTable, RawColumn, RawTable};

/// Read a raw CSV table. Every cell is text; empty fields are null.
pub fn read_raw_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PipelineError::MissingInputFile(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let table = read_raw_csv(BufReader::new(file))?;

    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "Loaded raw table"
    );
    Ok(table)
}

/// Read a raw CSV table from any reader
pub fn read_raw_csv<R: std::io::Read>(reader: R) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            PipelineError::Csv(format!("Failed to read CSV row {}: {}", row_idx + 1, e))
        })?;

        for (i, field) in record.iter().enumerate() {
            values[i].push(if field.is_empty() {
                None
            } else {
                Some(field.to_string())
            });
        }
    }

    RawTable::from_columns(
        headers
            .into_iter()
            .zip(values)
            .map(|(name, values)| RawColumn::new(name, values))
            .collect(),
    )
}

/// Write the processed table to `path`, replacing any existing file
pub fn write_processed_table<P: AsRef<Path>>(table: &ProcessedTable, path: P) -> Result<()> {
    let path = path.as_ref();
    write_atomic(path, |writer| write_processed_csv(table, writer))?;

    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.columns().len(),
        "Wrote processed table"
    );
    Ok(())
}

/// Write through a temp file in the destination directory, then rename.
/// The destination is untouched if `write` fails.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;
    Ok(())
}

/// Serialize the processed table as CSV into any writer
pub fn write_processed_csv<W: Write>(table: &ProcessedTable, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(table.column_names())?;
    for i in 0..table.row_count() {
        let row = table.columns().iter().map(|column| match column.values[i] {
            Some(value) => format_value(value),
            None => String::new(),
        });
        writer.write_record(row)?;
    }
    writer.flush()?;

    debug!(rows = table.row_count(), "Serialized processed table");
    Ok(())
}

/// Decimal form of a value; integral values keep a trailing `.0`
pub fn format_value(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Write any serializable value as pretty JSON
pub fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    write_atomic(path.as_ref(), |writer| {
        serde_json::to_writer_pretty(&mut *writer, value)?;
        writeln!(writer)?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::OutputColumn;
    use tempfile::TempDir;

    #[test]
    fn test_read_raw_csv_nulls_and_text() {
        let data = "温度,分子量\n25,\n室温,380 g/mol\n";
        let table = read_raw_csv(data.as_bytes()).unwrap();

        assert_eq!(table.row_count(), 2);
        let temp = table.column("温度").unwrap();
        assert_eq!(temp.values, vec![Some("25".to_string()), Some("室温".to_string())]);
        let weight = table.column("分子量").unwrap();
        assert_eq!(weight.values, vec![None, Some("380 g/mol".to_string())]);
    }

    #[test]
    fn test_read_raw_csv_rejects_ragged_rows() {
        let data = "a,b\n1,2\n3\n";
        assert!(matches!(read_raw_csv(data.as_bytes()), Err(PipelineError::Csv(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_raw_table(dir.path().join("nope.csv"));
        assert!(matches!(result, Err(PipelineError::MissingInputFile(_))));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(3.0), "3.0");
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(42.86), "42.86");
        assert_eq!(format_value(298.15), "298.15");
    }

    #[test]
    fn test_write_processed_csv_missing_as_empty() {
        let mut table = ProcessedTable::with_rows(2);
        table.push("a", OutputColumn::new("ratio_epoxy", vec![Some(3.0), None])).unwrap();
        table.push("a", OutputColumn::new("ratio_curing", vec![Some(1.0), None])).unwrap();

        let mut out = Vec::new();
        write_processed_csv(&table, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "ratio_epoxy,ratio_curing\n3.0,1.0\n,\n");
    }

    #[test]
    fn test_write_processed_table_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale").unwrap();

        let mut table = ProcessedTable::with_rows(1);
        table.push("温度", OutputColumn::new("temperature(K)", vec![Some(298.15)])).unwrap();
        write_processed_table(&table, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "temperature(K)\n298.15\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_json_into_missing_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent").join("report.json");

        let result = write_json(&vec![1, 2], &path);

        assert!(matches!(result, Err(PipelineError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_json_pretty_with_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");

        write_json(&vec![1, 2], &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[\n  1,\n  2\n]\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
