use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, StringArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use auditlens_core::{AuditError, RawTable, Value};
use tracing::{debug, info};

use crate::column_type::{clean_cell, infer_kind, to_value, ColumnKind};

const BATCH_SIZE: usize = 8192;

/// Reads one delimited audit-log file into a [`RawTable`].
///
/// The header row is required. Cells are read as text through Arrow's CSV
/// reader and each column is typed once afterwards (see
/// [`crate::column_type`]). Any structural problem (empty input, missing
/// header, ragged rows, undecodable bytes) is reported as a single
/// [`AuditError::Load`] naming the source.
#[derive(Debug, Clone)]
pub struct CsvImporter {
    delimiter: u8,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn load_path(&self, path: &Path) -> Result<RawTable, AuditError> {
        let bytes = std::fs::read(path).map_err(|e| AuditError::load(path.display().to_string(), e))?;
        self.load_bytes(&path.display().to_string(), &bytes)
    }

    pub fn load_bytes(&self, source_name: &str, bytes: &[u8]) -> Result<RawTable, AuditError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(AuditError::load(source_name, "input is empty"));
        }

        let format = Format::default()
            .with_header(true)
            .with_delimiter(self.delimiter);
        let (header_schema, _) = format
            .infer_schema(bytes, Some(0))
            .map_err(|e| AuditError::load(source_name, e))?;
        if header_schema.fields().is_empty() {
            return Err(AuditError::load(source_name, "no header row"));
        }

        let columns = disambiguate(
            header_schema
                .fields()
                .iter()
                .enumerate()
                .map(|(i, f)| header_name(i, f.name()))
                .collect(),
        );

        // Read every column as text; typing happens per column below.
        let text_schema = Arc::new(Schema::new(
            columns
                .iter()
                .map(|name| Field::new(name, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ));
        let reader = ReaderBuilder::new(text_schema)
            .with_header(true)
            .with_delimiter(self.delimiter)
            .with_batch_size(BATCH_SIZE)
            .build(bytes)
            .map_err(|e| AuditError::load(source_name, e))?;

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); columns.len()];
        for batch_result in reader {
            let batch = batch_result.map_err(|e| AuditError::load(source_name, e))?;
            for (col_idx, column) in batch.columns().iter().enumerate() {
                let arr = column
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| AuditError::load(source_name, "column is not text"))?;
                for row_idx in 0..arr.len() {
                    let raw = (!arr.is_null(row_idx)).then(|| arr.value(row_idx));
                    cells[col_idx].push(clean_cell(raw).map(str::to_string));
                }
            }
        }

        let kinds: Vec<ColumnKind> = cells
            .iter()
            .map(|col| infer_kind(&col.iter().map(Option::as_deref).collect::<Vec<_>>()))
            .collect();
        for (name, kind) in columns.iter().zip(&kinds) {
            debug!(column = %name, kind = ?kind, "column typed");
        }

        let num_rows = cells.first().map_or(0, Vec::len);
        let rows: Vec<Vec<Value>> = (0..num_rows)
            .map(|row_idx| {
                cells
                    .iter()
                    .zip(&kinds)
                    .map(|(col, kind)| to_value(col[row_idx].as_deref(), *kind))
                    .collect()
            })
            .collect();

        let table = RawTable::new(columns, rows).map_err(|e| AuditError::load(source_name, e))?;
        info!(
            "Loaded {} records with {} columns from {}",
            table.len(),
            table.columns().len(),
            source_name
        );
        Ok(table)
    }
}

fn header_name(idx: usize, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("Unnamed: {idx}")
    } else {
        trimmed.to_string()
    }
}

/// Suffix repeated header names with `.1`, `.2`, ... so every column is unique.
fn disambiguate(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{name}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}
