//! Report assembly: compliance summary, display table, export rows.

use auditlens_core::{CanonicalField, FieldMapping};
use serde::Serialize;

use super::compose::EnrichedRecord;
use super::explain::ExplainedAnomaly;

/// Summary text when a batch has no anomalies.
pub const NO_ANOMALIES: &str = "No anomalies detected.";

/// Identifier used when a record has no timestamp value.
pub const UNKNOWN_TIME: &str = "unknown time";

pub const REASON_HEADER: &str = "AnomalyReason";

/// Canonical fields shown in the anomaly table, in column order.
const DISPLAY_FIELDS: [CanonicalField; 3] = [
    CanonicalField::Timestamp,
    CanonicalField::EventType,
    CanonicalField::User,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub identifier: String,
    pub reason: String,
}

/// Final, immutable summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceSummary {
    pub total_records: usize,
    pub anomaly_count: usize,
    pub mapping: FieldMapping,
    pub entries: Vec<SummaryEntry>,
    pub text: String,
}

impl ComplianceSummary {
    /// One-line outcome, e.g. `3 anomalies detected out of 120 entries.`
    pub fn status_line(&self) -> String {
        format!(
            "{} anomalies detected out of {} entries.",
            self.anomaly_count, self.total_records
        )
    }

    pub fn has_anomalies(&self) -> bool {
        self.anomaly_count > 0
    }
}

fn identifier(record: &EnrichedRecord) -> String {
    record
        .field(CanonicalField::Timestamp)
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

/// Build the compliance summary for a scored batch of `total` records.
pub fn assemble(mapping: &FieldMapping, total: usize, anomalies: &[ExplainedAnomaly]) -> ComplianceSummary {
    let entries: Vec<SummaryEntry> = anomalies
        .iter()
        .map(|a| SummaryEntry {
            identifier: identifier(&a.scored.record),
            reason: a.reason.clone(),
        })
        .collect();

    let text = if entries.is_empty() {
        NO_ANOMALIES.to_string()
    } else {
        let mut lines = vec![format!(
            "AI detected {} anomalies out of {} records.",
            entries.len(),
            total
        )];
        for (field, column) in mapping.iter() {
            lines.push(match column {
                Some(col) => format!("- {field} mapped to column `{col}`"),
                None => format!("- {field} mapped to column: Not Found"),
            });
        }
        for entry in &entries {
            lines.push(format!("- {}: {}", entry.identifier, entry.reason));
        }
        lines.join("\n")
    };

    ComplianceSummary {
        total_records: total,
        anomaly_count: entries.len(),
        mapping: mapping.clone(),
        entries,
        text,
    }
}

/// Tabular view of the first anomalies for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnomalyTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl AnomalyTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolved Timestamp, EventType and User columns (each physical column
/// once) plus the reason, for the first `limit` anomalies.
pub fn anomaly_table(mapping: &FieldMapping, anomalies: &[ExplainedAnomaly], limit: usize) -> AnomalyTable {
    let mut columns: Vec<(CanonicalField, &str)> = Vec::new();
    for field in DISPLAY_FIELDS {
        if let Some(col) = mapping.resolved(field) {
            if !columns.iter().any(|(_, c)| *c == col) {
                columns.push((field, col));
            }
        }
    }

    let mut headers: Vec<String> = columns.iter().map(|(_, c)| c.to_string()).collect();
    headers.push(REASON_HEADER.to_string());

    let rows = anomalies
        .iter()
        .take(limit)
        .map(|a| {
            let record = &a.scored.record;
            let mut row: Vec<String> = columns
                .iter()
                .map(|(field, _)| record.field(*field).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            row.push(a.reason.clone());
            row
        })
        .collect();

    AnomalyTable { headers, rows }
}

/// One row handed to document export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopAnomaly {
    pub timestamp: Option<String>,
    pub user: Option<String>,
    pub event_type: Option<String>,
    pub reason: String,
}

pub fn top_anomalies(anomalies: &[ExplainedAnomaly], limit: usize) -> Vec<TopAnomaly> {
    anomalies
        .iter()
        .take(limit)
        .map(|a| {
            let record = &a.scored.record;
            let text = |field| record.field(field).map(|v| v.to_string());
            TopAnomaly {
                timestamp: text(CanonicalField::Timestamp),
                user: text(CanonicalField::User),
                event_type: text(CanonicalField::EventType),
                reason: a.reason.clone(),
            }
        })
        .collect()
}
