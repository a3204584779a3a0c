//! dictlens core
//!
//! Core domain model with stable, versioned types.
//! Never rename issue codes or report fields - they are part of the public API.

pub mod dictionary;
pub mod diff;
pub mod issue;
pub mod report;
pub mod config;

pub use dictionary::{
    CodeList, CodeListTerm, Dictionary, EdgeDirection, Field, FileType, RegexExamples, Relation,
    Restriction, RestrictionKind,
};
pub use diff::{DiffResult, DiffStatus, FieldAttribute};
pub use issue::{IssueCode, Severity, ValidationIssue};
pub use report::{
    ComparisonReport, ComparisonSummary, FieldComparison, FileTypeComparison, ReportVersion,
};
pub use config::{Config, ConfigError, SourceConfig, SourceKind, SubmissionConfig};
