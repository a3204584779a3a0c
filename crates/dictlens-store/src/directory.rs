//! Directory-backed dictionary source
//!
//! Layout:
//!
//! ```text
//! dictionaries/
//!   0.6c.json        one document per version
//!   0.7a.json
//!   codelists.json   array of code lists
//! ```

use crate::source::{parse_dictionary, DictionarySource, SourceError};
use dictlens_core::{CodeList, Dictionary};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const CODE_LISTS_FILE: &str = "codelists.json";

/// Reads dictionary documents from a local directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dictionary_path(&self, version: &str) -> PathBuf {
        self.root.join(format!("{}.json", version))
    }
}

#[async_trait::async_trait]
impl DictionarySource for DirectorySource {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn fetch_dictionary(&self, version: &str) -> Result<Dictionary, SourceError> {
        let path = self.dictionary_path(version);
        tracing::debug!(path = %path.display(), "reading dictionary");

        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(version.to_string()));
            }
            Err(e) => return Err(SourceError::IoError(format!("{}: {}", path.display(), e))),
        };

        parse_dictionary(&json, version)
    }

    async fn fetch_code_lists(&self) -> Result<Vec<CodeList>, SourceError> {
        let path = self.root.join(CODE_LISTS_FILE);

        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no code lists file");
                return Ok(Vec::new());
            }
            Err(e) => return Err(SourceError::IoError(format!("{}: {}", path.display(), e))),
        };

        serde_json::from_str(&json)
            .map_err(|e| SourceError::InvalidDocument(format!("{}: {}", CODE_LISTS_FILE, e)))
    }

    async fn list_versions(&self) -> Result<Vec<String>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::IoError(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        let mut versions: Vec<String> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.file_name() != CODE_LISTS_FILE)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    return None;
                }
                path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
            })
            .collect();

        versions.sort();
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[tokio::test]
    async fn reads_versions_and_documents() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "2.json", r#"{"version": "2", "files": []}"#);
        write(dir.path(), "1.json", r#"{"version": "1", "files": [{"name": "donor"}]}"#);
        write(dir.path(), "codelists.json", r#"[{"name": "sex", "terms": [{"code": "1", "value": "male"}]}]"#);
        write(dir.path(), "README.md", "not a dictionary");

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.list_versions().await.unwrap(), vec!["1", "2"]);

        let dict = source.fetch_dictionary("1").await.unwrap();
        assert_eq!(dict.file_type_names(), vec!["donor"]);

        let lists = source.fetch_code_lists().await.unwrap();
        assert_eq!(lists[0].value_for("1"), Some("male"));
    }

    #[tokio::test]
    async fn missing_version_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());

        let err = source.fetch_dictionary("9").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(v) if v == "9"));
        assert!(source.fetch_code_lists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_directory_cannot_list() {
        let source = DirectorySource::new("/nonexistent/dictlens");
        assert!(matches!(
            source.list_versions().await,
            Err(SourceError::IoError(_))
        ));
    }
}
