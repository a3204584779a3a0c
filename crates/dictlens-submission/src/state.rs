//! Submission documents and the state held by the view model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Data types whose files are grouped as clinical
pub const CLINICAL_DATA_TYPES: [&str; 2] = ["CLINICAL_SUPPLEMENTAL_TYPE", "CLINICAL_CORE_TYPE"];

/// Validation report of a single submitted file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file_name: String,

    #[serde(default)]
    pub file_type: Option<String>,

    #[serde(default)]
    pub file_state: Option<String>,

    /// Error, summary and field reports, kept as sent
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTypeReport {
    #[serde(default)]
    pub file_type: Option<String>,

    #[serde(default)]
    pub file_type_state: Option<String>,

    #[serde(default)]
    pub file_reports: Vec<FileReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeReport {
    #[serde(default)]
    pub data_type: Option<String>,

    #[serde(default)]
    pub data_type_state: Option<String>,

    #[serde(default)]
    pub file_type_reports: Vec<FileTypeReport>,
}

/// Submission report, grouped by data type then file type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    #[serde(default)]
    pub data_type_reports: Vec<DataTypeReport>,
}

impl SubmissionReport {
    /// All file reports, in report order
    pub fn file_reports(&self) -> impl Iterator<Item = &FileReport> {
        self.data_type_reports
            .iter()
            .flat_map(|d| &d.file_type_reports)
            .flat_map(|f| &f.file_reports)
    }

    pub fn file_report(&self, file_name: &str) -> Option<&FileReport> {
        self.file_reports().find(|r| r.file_name == file_name)
    }
}

/// A file uploaded to a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFile {
    pub name: String,

    /// Milliseconds since the epoch
    #[serde(default)]
    pub last_update: Option<i64>,

    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub file_type: Option<String>,

    #[serde(default)]
    pub data_type: Option<String>,

    /// Attached from the submission report after each fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<FileReport>,
}

impl SubmissionFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            last_update: None,
            size,
            file_type: None,
            data_type: None,
            report: None,
        }
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn group(&self) -> FileGroup {
        match self.data_type.as_deref() {
            Some(dt) if CLINICAL_DATA_TYPES.contains(&dt) => FileGroup::Clinical,
            Some(dt) if !dt.is_empty() => FileGroup::Experimental,
            _ => FileGroup::Unrecognized,
        }
    }
}

/// Coarse grouping of submission files by data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileGroup {
    Clinical,
    Experimental,
    Unrecognized,
}

impl FileGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileGroup::Clinical => "CLINICAL",
            FileGroup::Experimental => "EXPERIMENTAL",
            FileGroup::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for FileGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submission as served by `GET /ws/releases/{release}/submissions/{project}`
///
/// Every key is optional: only keys present in the response overwrite state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<SubmissionReport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_files: Option<Vec<SubmissionFile>>,
}

/// State observed by subscribers of a submission model
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionState {
    pub is_loading: bool,
    pub last_updated: Option<i64>,
    pub locked: bool,
    pub project_alias: Option<String>,
    pub project_key: String,
    pub project_name: Option<String>,
    pub release_name: String,
    pub report: SubmissionReport,
    pub state: Option<String>,
    pub submission_files: Vec<SubmissionFile>,
}

impl SubmissionState {
    pub fn new(release_name: impl Into<String>, project_key: impl Into<String>) -> Self {
        Self {
            release_name: release_name.into(),
            project_key: project_key.into(),
            ..Self::default()
        }
    }

    /// Overwrite the keys present in `document`, then re-attach file reports
    pub fn merge(&mut self, document: SubmissionDocument) {
        if let Some(v) = document.last_updated {
            self.last_updated = Some(v);
        }
        if let Some(v) = document.locked {
            self.locked = v;
        }
        if let Some(v) = document.project_alias {
            self.project_alias = Some(v);
        }
        if let Some(v) = document.project_key {
            self.project_key = v;
        }
        if let Some(v) = document.project_name {
            self.project_name = Some(v);
        }
        if let Some(v) = document.release_name {
            self.release_name = v;
        }
        if let Some(v) = document.report {
            self.report = v;
        }
        if let Some(v) = document.state {
            self.state = Some(v);
        }
        if let Some(v) = document.submission_files {
            self.submission_files = v;
        }

        self.inject_reports();
    }

    /// Attach each file's report, matched by file name
    pub fn inject_reports(&mut self) {
        for file in &mut self.submission_files {
            file.report = self.report.file_report(&file.name).cloned();
        }
    }

    pub fn total_file_size_in_bytes(&self) -> u64 {
        self.submission_files.iter().map(|f| f.size).sum()
    }

    /// Files grouped as clinical, experimental or unrecognized
    ///
    /// Groups without files are absent; files keep their submission order.
    pub fn grouped_submission_files(&self) -> BTreeMap<FileGroup, Vec<SubmissionFile>> {
        let mut groups: BTreeMap<FileGroup, Vec<SubmissionFile>> = BTreeMap::new();
        for file in &self.submission_files {
            groups.entry(file.group()).or_default().push(file.clone());
        }
        groups
    }
}
