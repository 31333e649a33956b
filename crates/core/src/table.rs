use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::timestamp::parse_datetime;

/// Typed cell values. Source data arrives as text; the load stage types
/// each column once so later stages never re-guess.
///
/// Timestamps keep the cell text they were parsed from. Offsets, `T`
/// separators and date-only layouts all survive into rendered output;
/// the parsed value only feeds hour-of-day checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp { at: NaiveDateTime, raw: String },
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extract as string, returning None for non-text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Parse `raw` as a timestamp cell, keeping the text as written.
    pub fn timestamp(raw: &str) -> Option<Value> {
        parse_datetime(raw).map(|at| Value::Timestamp {
            at,
            raw: raw.to_string(),
        })
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp { at, .. } => Some(*at),
            _ => None,
        }
    }
}

/// Textual rendering used wherever cells are joined or displayed.
///
/// `Null` renders as the empty string. Timestamps render their source text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Timestamp { raw, .. } => f.write_str(raw),
            Value::Null => Ok(()),
        }
    }
}

/// An ordered batch of audit records with a schema discovered at load time.
///
/// Rows are stored positionally, aligned with `columns`, so every record
/// carries exactly the header's column set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RawTable {
    /// Build a table, rejecting duplicate column names and ragged rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, AuditError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(AuditError::Table(format!("duplicate column `{col}`")));
            }
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(AuditError::Table(format!(
                "row {idx} has {} values, header has {}",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, idx: usize) -> Option<&[Value]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Look up a single cell by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> &[Vec<Value>] {
        &self.rows[..n.min(self.rows.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn sample() -> RawTable {
        RawTable::new(
            vec!["ts".into(), "user".into()],
            vec![
                vec![Value::Text("a".into()), Value::Integer(1)],
                vec![Value::Null, Value::Float(2.5)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = RawTable::new(vec!["a".into(), "a".into()], vec![]).unwrap_err();
        assert!(err.to_string().contains("duplicate column `a`"));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = RawTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![Value::Null]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("row 0 has 1 values"));
    }

    #[test]
    fn lookup_by_name() {
        let t = sample();
        assert_eq!(t.len(), 2);
        assert_eq!(t.value(1, "user"), Some(&Value::Float(2.5)));
        assert_eq!(t.value(0, "missing"), None);
        assert_eq!(t.head(10).len(), 2);
        assert_eq!(t.head(1).len(), 1);
    }

    #[test]
    fn display_rules() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Integer(7).to_string(), "7");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }

    #[test]
    fn timestamps_render_as_written() {
        for raw in ["2025-06-14T02:00:00+05:00", "2025-06-14T02:00:00Z", "2025-06-14"] {
            let value = Value::timestamp(raw).unwrap();
            assert_eq!(value.to_string(), raw);
        }
        let value = Value::timestamp("2025-06-14T02:00:00+05:00").unwrap();
        assert_eq!(value.as_timestamp().map(|ts| ts.hour()), Some(2));
        assert!(Value::timestamp("soon").is_none());
    }
}
