//! Per-column type inference.
//!
//! Every cell arrives as text. A column takes the narrowest kind that all
//! of its non-null cells satisfy, checked in the order Integer, Float,
//! Boolean, Timestamp, and falls back to Text. Typing happens once per
//! column so a stray value cannot silently change how a single cell is
//! rendered downstream.
//!
//! Typing never changes a cell's text. Numbers and booleans qualify only
//! when they print back exactly as written (`007`, `1.50` and `TRUE` stay
//! Text), and timestamps carry their source text alongside the parsed value.

use std::fmt::Display;
use std::str::FromStr;

use auditlens_core::timestamp::parse_datetime;
use auditlens_core::Value;

/// Cell spellings treated as missing data.
const NULL_SENTINELS: &[&str] = &["null", "none", "nan", "na", "n/a", "undefined"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Timestamp,
    Text,
}

/// Normalize a raw cell: trims whitespace and maps null sentinels to `None`.
pub fn clean_cell(raw: Option<&str>) -> Option<&str> {
    let val = raw?.trim();
    if val.is_empty() || NULL_SENTINELS.iter().any(|s| val.eq_ignore_ascii_case(s)) {
        None
    } else {
        Some(val)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parse `s` as `T`, accepting it only if it prints back unchanged.
fn parse_exact<T: FromStr + Display>(s: &str) -> Option<T> {
    s.parse::<T>().ok().filter(|v| v.to_string() == s)
}

/// Infer the kind of a column from its cleaned cells.
///
/// A column without any non-null cell is Text.
pub fn infer_kind(cells: &[Option<&str>]) -> ColumnKind {
    let present: Vec<&str> = cells.iter().flatten().copied().collect();
    if present.is_empty() {
        return ColumnKind::Text;
    }

    if present.iter().all(|s| parse_exact::<i64>(s).is_some()) {
        ColumnKind::Integer
    } else if present.iter().all(|s| parse_exact::<f64>(s).is_some()) {
        ColumnKind::Float
    } else if present.iter().all(|s| parse_bool(s).is_some()) {
        ColumnKind::Boolean
    } else if present.iter().all(|s| parse_datetime(s).is_some()) {
        ColumnKind::Timestamp
    } else {
        ColumnKind::Text
    }
}

/// Convert a cleaned cell into a [`Value`] of the column's kind.
///
/// Cells that do not fit the kind become `Null`; with kinds produced by
/// [`infer_kind`] that only happens for cells that were already null.
pub fn to_value(cell: Option<&str>, kind: ColumnKind) -> Value {
    let Some(s) = cell else {
        return Value::Null;
    };
    match kind {
        ColumnKind::Integer => parse_exact(s).map(Value::Integer).unwrap_or(Value::Null),
        ColumnKind::Float => parse_exact(s).map(Value::Float).unwrap_or(Value::Null),
        ColumnKind::Boolean => parse_bool(s).map(Value::Boolean).unwrap_or(Value::Null),
        ColumnKind::Timestamp => Value::timestamp(s).unwrap_or(Value::Null),
        ColumnKind::Text => Value::Text(s.to_string()),
    }
}
