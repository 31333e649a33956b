use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Semantic roles every incoming schema is reconciled against.
///
/// Declaration order is the canonical order used when composing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    Timestamp,
    User,
    EventType,
    Message,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 4] = [
        CanonicalField::Timestamp,
        CanonicalField::User,
        CanonicalField::EventType,
        CanonicalField::Message,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Timestamp => "Timestamp",
            CanonicalField::User => "User",
            CanonicalField::EventType => "EventType",
            CanonicalField::Message => "Message",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical field → physical column assignments for one table.
///
/// Entries keep canonical order regardless of insertion order. `None`
/// marks a field no column matched. Two fields may name the same column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: IndexMap<CanonicalField, Option<String>>,
}

impl FieldMapping {
    pub fn new(entries: impl IntoIterator<Item = (CanonicalField, Option<String>)>) -> Self {
        let mut entries: IndexMap<_, _> = entries.into_iter().collect();
        entries.sort_keys();
        Self { entries }
    }

    /// Column assigned to `field`, if any.
    pub fn resolved(&self, field: CanonicalField) -> Option<&str> {
        self.entries.get(&field).and_then(|c| c.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, Option<&str>)> {
        self.entries.iter().map(|(f, c)| (*f, c.as_deref()))
    }

    /// Resolved (field, column) pairs in canonical order.
    pub fn resolved_fields(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.entries
            .iter()
            .filter_map(|(f, c)| c.as_deref().map(|c| (*f, c)))
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved_fields().count()
    }

    pub fn has_resolved(&self) -> bool {
        self.resolved_count() > 0
    }

    /// True when every mapped column is one of `columns`.
    pub fn belongs_to(&self, columns: &[String]) -> bool {
        self.resolved_fields()
            .all(|(_, col)| columns.iter().any(|c| c == col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_canonical_order() {
        let mapping = FieldMapping::new([
            (CanonicalField::Message, Some("msg".to_string())),
            (CanonicalField::Timestamp, None),
            (CanonicalField::User, Some("actor".to_string())),
        ]);
        let order: Vec<_> = mapping.iter().map(|(f, _)| f).collect();
        assert_eq!(
            order,
            vec![CanonicalField::Timestamp, CanonicalField::User, CanonicalField::Message]
        );
        assert_eq!(mapping.resolved(CanonicalField::User), Some("actor"));
        assert_eq!(mapping.resolved(CanonicalField::Timestamp), None);
        assert_eq!(mapping.resolved(CanonicalField::EventType), None);
        assert_eq!(mapping.resolved_count(), 2);
    }

    #[test]
    fn membership_check() {
        let mapping = FieldMapping::new([(CanonicalField::User, Some("actor".to_string()))]);
        assert!(mapping.belongs_to(&["actor".to_string()]));
        assert!(!mapping.belongs_to(&["user".to_string()]));
        assert!(FieldMapping::default().belongs_to(&[]));
    }

    #[test]
    fn serializes_as_field_map() {
        let mapping = FieldMapping::new([
            (CanonicalField::Timestamp, Some("ts".to_string())),
            (CanonicalField::User, None),
        ]);
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["Timestamp"], "ts");
        assert!(json["User"].is_null());
    }
}
