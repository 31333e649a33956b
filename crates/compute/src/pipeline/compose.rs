//! Text composition: one text blob (plus hour of day) per record.

use std::collections::BTreeMap;

use auditlens_core::timestamp::parse_hour;
use auditlens_core::{CanonicalField, FieldMapping, RawTable, Value};
use chrono::Timelike;
use serde::Serialize;
use tracing::debug;

/// A record after composition. Indexes back into the source table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    /// Position of the record in the source table.
    pub index: usize,
    /// Values of the resolved canonical fields for this record.
    pub canonical: BTreeMap<CanonicalField, Value>,
    pub combined_text: String,
    /// Hour of day (0-23) when the Timestamp field resolves and parses.
    pub hour: Option<u32>,
}

impl EnrichedRecord {
    /// Value of a resolved canonical field, skipping nulls.
    pub fn field(&self, field: CanonicalField) -> Option<&Value> {
        self.canonical.get(&field).filter(|v| !v.is_null())
    }
}

/// Output of the compositor, aligned 1:1 with the table's rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComposedBatch {
    pub records: Vec<EnrichedRecord>,
}

impl ComposedBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.combined_text.as_str()).collect()
    }

    pub fn hours(&self) -> Vec<Option<u32>> {
        self.records.iter().map(|r| r.hour).collect()
    }
}

/// Join each record's resolved fields (canonical order) into one string.
///
/// When nothing resolves, every column is joined in table order instead.
/// Null cells contribute an empty string, so separators stay stable.
pub fn compose(table: &RawTable, mapping: &FieldMapping) -> ComposedBatch {
    let resolved: Vec<(CanonicalField, usize)> = mapping
        .resolved_fields()
        .filter_map(|(field, col)| table.column_index(col).map(|idx| (field, idx)))
        .collect();
    let timestamp_idx = resolved
        .iter()
        .find(|(field, _)| *field == CanonicalField::Timestamp)
        .map(|(_, idx)| *idx);

    if resolved.is_empty() {
        debug!("no canonical field resolved; composing from all columns");
    }

    let records = table
        .rows()
        .enumerate()
        .map(|(index, row)| {
            let combined_text = if resolved.is_empty() {
                join(row.iter())
            } else {
                join(resolved.iter().map(|(_, idx)| &row[*idx]))
            };
            EnrichedRecord {
                index,
                canonical: resolved
                    .iter()
                    .map(|(field, idx)| (*field, row[*idx].clone()))
                    .collect(),
                combined_text,
                hour: timestamp_idx.and_then(|idx| hour_of(&row[idx])),
            }
        })
        .collect();

    ComposedBatch { records }
}

fn join<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values.map(Value::to_string).collect::<Vec<_>>().join(" ")
}

/// Hour of day for a timestamp cell. Text is parsed leniently; other
/// kinds carry no hour.
fn hour_of(value: &Value) -> Option<u32> {
    match value {
        Value::Timestamp { at, .. } => Some(at.hour()),
        Value::Text(s) => parse_hour(s),
        _ => None,
    }
}
