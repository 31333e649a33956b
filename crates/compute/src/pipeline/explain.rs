//! Rule-based explanations for flagged records.
//!
//! Every rule that matches fires, in the fixed order below. Keyword rules
//! are case-insensitive substring checks against the composed text; the
//! hour rule needs a parsed hour. A record no rule matches gets the
//! fallback tag.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::anomaly::ScoredRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonTag {
    ManualOverride,
    SystemAlarm,
    UnexpectedShutdown,
    ProcedureDeviation,
    EmergencyCondition,
    OutsideStandardHours,
    UnusualPattern,
}

impl ReasonTag {
    pub fn label(self) -> &'static str {
        match self {
            ReasonTag::ManualOverride => "manual override",
            ReasonTag::SystemAlarm => "system alarm or fault",
            ReasonTag::UnexpectedShutdown => "unexpected shutdown",
            ReasonTag::ProcedureDeviation => "procedure deviation",
            ReasonTag::EmergencyCondition => "emergency condition",
            ReasonTag::OutsideStandardHours => "outside standard hours",
            ReasonTag::UnusualPattern => "unusual pattern detected",
        }
    }
}

/// Keyword rules in firing order.
const KEYWORD_RULES: &[(ReasonTag, &[&str])] = &[
    (ReasonTag::ManualOverride, &["override"]),
    (ReasonTag::SystemAlarm, &["alarm", "fault"]),
    (ReasonTag::UnexpectedShutdown, &["shutdown"]),
    (ReasonTag::ProcedureDeviation, &["deviation"]),
    (ReasonTag::EmergencyCondition, &["emergency"]),
];

/// Standard hours run from 06:00 through 20:59.
const FIRST_STANDARD_HOUR: u32 = 6;
const LAST_STANDARD_HOUR: u32 = 20;

/// Reason tags for one record. Never empty.
pub fn explain(text: &str, hour: Option<u32>) -> Vec<ReasonTag> {
    let lowered = text.to_lowercase();
    let mut tags: Vec<ReasonTag> = KEYWORD_RULES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(tag, _)| *tag)
        .collect();

    if hour.is_some_and(|h| h < FIRST_STANDARD_HOUR || h > LAST_STANDARD_HOUR) {
        tags.push(ReasonTag::OutsideStandardHours);
    }
    if tags.is_empty() {
        tags.push(ReasonTag::UnusualPattern);
    }
    tags
}

/// Labels joined with `", "` in tag order.
pub fn render_reasons(tags: &[ReasonTag]) -> String {
    tags.iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A flagged record with its reasons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedAnomaly {
    pub scored: ScoredRecord,
    pub tags: Vec<ReasonTag>,
    pub reason: String,
}

/// Explain every anomalous record, keeping batch order.
pub fn explain_anomalies(records: &[ScoredRecord]) -> Vec<ExplainedAnomaly> {
    let explained: Vec<ExplainedAnomaly> = records
        .par_iter()
        .filter(|r| r.is_anomalous())
        .map(|scored| {
            let tags = explain(&scored.record.combined_text, scored.record.hour);
            ExplainedAnomaly {
                scored: scored.clone(),
                reason: render_reasons(&tags),
                tags,
            }
        })
        .collect();
    debug!(count = explained.len(), "anomalies explained");
    explained
}
