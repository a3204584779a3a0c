//! Field-level diff result types

use serde::{Deserialize, Serialize};
use crate::dictionary::RestrictionKind;

/// Classification of a field against a previous dictionary version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffStatus {
    /// Field did not exist in the previous version
    New,

    /// Field exists in both versions with at least one difference
    Changed,

    /// Field is identical in both versions
    Unchanged,
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Changed => write!(f, "changed"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// An attribute of a field that differs between versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAttribute {
    Label,
    ValueType,
    Controlled,

    /// Restrictions of this kind differ, or exist on one side only
    Restriction(RestrictionKind),
}

impl std::fmt::Display for FieldAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Label => write!(f, "label"),
            Self::ValueType => write!(f, "valueType"),
            Self::Controlled => write!(f, "controlled"),
            Self::Restriction(kind) => write!(f, "restriction:{}", kind),
        }
    }
}

/// Result of comparing one field against its previous version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub status: DiffStatus,

    /// Differing attributes, only populated for `Changed`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diffs: Vec<FieldAttribute>,
}

impl DiffResult {
    pub fn new_field() -> Self {
        Self {
            status: DiffStatus::New,
            diffs: Vec::new(),
        }
    }

    pub fn unchanged() -> Self {
        Self {
            status: DiffStatus::Unchanged,
            diffs: Vec::new(),
        }
    }

    /// `Changed` with the given differences, or `Unchanged` when there are none
    pub fn from_diffs(diffs: Vec<FieldAttribute>) -> Self {
        if diffs.is_empty() {
            Self::unchanged()
        } else {
            Self {
                status: DiffStatus::Changed,
                diffs,
            }
        }
    }

    pub fn is_new(&self) -> bool {
        self.status == DiffStatus::New
    }

    pub fn is_changed(&self) -> bool {
        self.status == DiffStatus::Changed
    }

    /// Whether the given attribute is listed as different
    pub fn has_diff(&self, attribute: FieldAttribute) -> bool {
        self.diffs.contains(&attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_diffs_classifies() {
        assert_eq!(DiffResult::from_diffs(vec![]), DiffResult::unchanged());

        let changed = DiffResult::from_diffs(vec![FieldAttribute::Label]);
        assert!(changed.is_changed());
        assert!(changed.has_diff(FieldAttribute::Label));
        assert!(!changed.has_diff(FieldAttribute::Controlled));
    }

    #[test]
    fn diff_result_serialization() {
        let result = DiffResult::from_diffs(vec![
            FieldAttribute::ValueType,
            FieldAttribute::Restriction(RestrictionKind::Regex),
        ]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "CHANGED", "diffs": ["value_type", {"restriction": "regex"}]})
        );

        let new_json = serde_json::to_string(&DiffResult::new_field()).unwrap();
        assert_eq!(new_json, r#"{"status":"NEW"}"#);
    }

    #[test]
    fn attribute_display() {
        assert_eq!(FieldAttribute::ValueType.to_string(), "valueType");
        assert_eq!(
            FieldAttribute::Restriction(RestrictionKind::Codelist).to_string(),
            "restriction:codelist"
        );
    }
}
