//! Structural validation issues for dictionary documents
//!
//! IMPORTANT: Issue codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Issue code registry (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Two file types share a name
    DuplicateFileType,

    /// Two fields of one file type share a name
    DuplicateField,

    /// A relation points at a file type missing from the dictionary
    UnresolvedRelation,

    /// A relation joins a different number of fields on each side
    RelationArityMismatch,

    /// A unique-field entry names a field the file type does not have
    UnknownUniqueField,

    /// A relation join field is not declared on its file type
    UnknownRelationField,
}

impl IssueCode {
    /// Get the issue code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateFileType => "DUPLICATE_FILE_TYPE",
            Self::DuplicateField => "DUPLICATE_FIELD",
            Self::UnresolvedRelation => "UNRESOLVED_RELATION",
            Self::RelationArityMismatch => "RELATION_ARITY_MISMATCH",
            Self::UnknownUniqueField => "UNKNOWN_UNIQUE_FIELD",
            Self::UnknownRelationField => "UNKNOWN_RELATION_FIELD",
        }
    }

    /// Severity this code is reported with
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnknownUniqueField | Self::UnknownRelationField => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issue severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suspicious but loadable
    Warn,

    /// Document must be rejected
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A structural problem found in a dictionary document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,

    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// File type the issue was found in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    /// Field the issue refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationIssue {
    /// Create an issue with the code's default severity
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            file_type: None,
            field: None,
        }
    }

    pub fn in_file_type(mut self, name: impl Into<String>) -> Self {
        self.file_type = Some(name.into());
        self
    }

    pub fn on_field(mut self, name: impl Into<String>) -> Self {
        self.field = Some(name.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_code_stability() {
        assert_eq!(IssueCode::DuplicateField.as_str(), "DUPLICATE_FIELD");
        assert_eq!(IssueCode::UnresolvedRelation.as_str(), "UNRESOLVED_RELATION");
    }

    #[test]
    fn default_severities() {
        assert!(ValidationIssue::new(IssueCode::DuplicateFileType, "dup").is_error());
        assert!(!ValidationIssue::new(IssueCode::UnknownUniqueField, "unknown").is_error());
    }

    #[test]
    fn issue_serialization() {
        let issue = ValidationIssue::new(IssueCode::UnresolvedRelation, "specimen -> nowhere")
            .in_file_type("specimen");
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("UNRESOLVED_RELATION"));
        assert!(json.contains("\"file_type\":\"specimen\""));
        assert!(!json.contains("\"field\""));
    }
}
