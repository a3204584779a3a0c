//! Comparison report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use crate::diff::{DiffResult, DiffStatus};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Diff result for one field of a file type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldComparison {
    pub name: String,

    #[serde(flatten)]
    pub result: DiffResult,
}

/// Comparison of one file type of the current version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeComparison {
    /// File type name
    pub name: String,

    /// True when the file type is absent from the previous version
    pub is_new: bool,

    /// Per-field results, in current field order
    pub fields: Vec<FieldComparison>,

    /// Fields present only in the previous version
    #[serde(default)]
    pub removed_fields: Vec<String>,
}

impl FileTypeComparison {
    /// Count fields with the given status
    pub fn count(&self, status: DiffStatus) -> usize {
        self.fields.iter().filter(|f| f.result.status == status).count()
    }

    /// Whether anything in this file type differs from the previous version
    pub fn has_changes(&self) -> bool {
        self.is_new
            || !self.removed_fields.is_empty()
            || self.fields.iter().any(|f| f.result.status != DiffStatus::Unchanged)
    }

    /// Look up the comparison of a field
    pub fn field(&self, name: &str) -> Option<&FieldComparison> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub file_types: usize,
    pub new_file_types: usize,
    pub removed_file_types: usize,
    pub new_fields: usize,
    pub changed_fields: usize,
    pub unchanged_fields: usize,
    pub removed_fields: usize,
}

/// Dictionary comparison report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Version compared against, absent when there was no previous version
    pub from_version: Option<String>,

    /// Version being described
    pub to_version: String,

    /// Fingerprint of the previous document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_fingerprint: Option<String>,

    /// Fingerprint of the current document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_fingerprint: Option<String>,

    pub summary: ComparisonSummary,

    /// Current file types, in document order
    pub file_types: Vec<FileTypeComparison>,

    /// File types present only in the previous version
    #[serde(default)]
    pub removed_file_types: Vec<String>,
}

impl ComparisonReport {
    /// Build a report, computing the summary from the comparisons
    pub fn new(
        from_version: Option<String>,
        to_version: impl Into<String>,
        file_types: Vec<FileTypeComparison>,
        removed_file_types: Vec<String>,
    ) -> Self {
        let summary = ComparisonSummary {
            file_types: file_types.len(),
            new_file_types: file_types.iter().filter(|f| f.is_new).count(),
            removed_file_types: removed_file_types.len(),
            new_fields: file_types.iter().map(|f| f.count(DiffStatus::New)).sum(),
            changed_fields: file_types.iter().map(|f| f.count(DiffStatus::Changed)).sum(),
            unchanged_fields: file_types.iter().map(|f| f.count(DiffStatus::Unchanged)).sum(),
            removed_fields: file_types.iter().map(|f| f.removed_fields.len()).sum(),
        };

        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            from_version,
            to_version: to_version.into(),
            from_fingerprint: None,
            to_fingerprint: None,
            summary,
            file_types,
            removed_file_types,
        }
    }

    /// Attach document fingerprints
    pub fn with_fingerprints(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.from_fingerprint = from;
        self.to_fingerprint = to;
        self
    }

    /// Look up a file type comparison by name
    pub fn file_type(&self, name: &str) -> Option<&FileTypeComparison> {
        self.file_types.iter().find(|f| f.name == name)
    }

    /// Check if the two versions differ at all
    pub fn has_changes(&self) -> bool {
        !self.removed_file_types.is_empty() || self.file_types.iter().any(|f| f.has_changes())
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
