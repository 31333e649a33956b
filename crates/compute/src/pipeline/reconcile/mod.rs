//! Field reconciliation: maps arbitrary column names onto canonical fields.
//!
//! Each target is matched case-insensitively by sequence similarity
//! against every column. The best-scoring column wins if its ratio reaches
//! the cutoff; otherwise the target's aliases are tried as exact
//! (case-insensitive) header names. Nothing here fails: a field with no
//! match is simply left unresolved.
//!
//! Two targets may resolve to the same physical column. That is kept as
//! observable behavior rather than arbitrated away.

pub mod sequence;

use auditlens_core::{CanonicalField, FieldMapping};
use tracing::debug;

pub use sequence::similarity_ratio;

/// A canonical field plus the exact header spellings accepted for it when
/// fuzzy matching on the field name fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTarget {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
}

impl FieldTarget {
    /// Match on the canonical name only.
    pub fn name_only(field: CanonicalField) -> Self {
        Self { field, aliases: Vec::new() }
    }

    /// Canonical name plus the built-in header aliases for the field.
    pub fn with_default_aliases(field: CanonicalField) -> Self {
        let aliases: &[&str] = match field {
            CanonicalField::Timestamp => &[
                "ts", "time", "datetime", "date", "@timestamp", "event_time", "logged_at",
                "created_at",
            ],
            CanonicalField::User => &[
                "actor", "operator", "username", "user_id", "userid", "account", "principal",
            ],
            CanonicalField::EventType => &["type", "event", "action", "category", "activity"],
            CanonicalField::Message => &["msg", "description", "details", "detail", "text", "comment"],
        };
        Self {
            field,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// The four canonical fields with their default aliases, in canonical order.
///
/// With these targets a column can resolve through an exact alias even when
/// no header reaches the ratio cutoff (`ts`, `actor`). Use
/// [`FieldTarget::name_only`] targets for the pure ratio rule.
pub fn default_targets() -> Vec<FieldTarget> {
    CanonicalField::ALL
        .iter()
        .map(|f| FieldTarget::with_default_aliases(*f))
        .collect()
}

/// Build the mapping for `columns` against `targets`.
///
/// A target whose fuzzy match falls below `cutoff` still resolves when a
/// column equals one of its aliases, so only alias-free targets are left
/// unresolved purely on ratio.
///
/// Fuzzy ranking orders candidates by (ratio, lower-cased name) descending,
/// so equal ratios favour the lexicographically greatest lower-cased name.
/// The returned column is the first one in `columns` whose lower-cased name
/// equals the winner, keeping the original casing.
pub fn reconcile(columns: &[String], targets: &[FieldTarget], cutoff: f64) -> FieldMapping {
    let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();

    FieldMapping::new(targets.iter().map(|target| {
        let matched = best_fuzzy_match(&target.field.name().to_lowercase(), &lowered, cutoff)
            .or_else(|| alias_match(&target.aliases, &lowered))
            .and_then(|winner| {
                lowered
                    .iter()
                    .position(|c| *c == winner)
                    .map(|idx| columns[idx].clone())
            });
        debug!(field = %target.field, column = ?matched, "field reconciled");
        (target.field, matched)
    }))
}

/// Highest-ranked lower-cased column whose ratio against `name` reaches `cutoff`.
fn best_fuzzy_match(name: &str, lowered: &[String], cutoff: f64) -> Option<String> {
    let mut best: Option<(f64, &str)> = None;
    for candidate in lowered {
        let ratio = similarity_ratio(name, candidate);
        if ratio < cutoff {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_ratio, best_name)) => {
                ratio > best_ratio || (ratio == best_ratio && candidate.as_str() > best_name)
            }
        };
        if better {
            best = Some((ratio, candidate.as_str()));
        }
    }
    best.map(|(_, name)| name.to_string())
}

/// First alias (in alias order) that equals a lower-cased, trimmed column.
fn alias_match(aliases: &[String], lowered: &[String]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        let alias = alias.trim().to_lowercase();
        lowered.iter().find(|c| c.trim() == alias).cloned()
    })
}
