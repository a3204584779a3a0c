//! Dictionary source trait for fetching versioned documents

use dictlens_core::{CodeList, Dictionary};

/// Errors that can occur when fetching documents
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Dictionary version not found: {0}")]
    NotFound(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },
}

/// Trait for sources that can fetch dictionary documents
///
/// Each call is a single request: no retries and no caching. Caching is the
/// job of [`crate::DictionaryStore`].
#[async_trait::async_trait]
pub trait DictionarySource: Send + Sync {
    /// Get the source name (e.g., "directory", "http")
    fn name(&self) -> &'static str;

    /// Fetch the dictionary with the given version
    async fn fetch_dictionary(&self, version: &str) -> Result<Dictionary, SourceError>;

    /// Fetch all code lists
    async fn fetch_code_lists(&self) -> Result<Vec<CodeList>, SourceError>;

    /// List the versions this source can serve
    async fn list_versions(&self) -> Result<Vec<String>, SourceError>;
}

/// Parse a dictionary document and check it is the requested version
pub(crate) fn parse_dictionary(json: &str, version: &str) -> Result<Dictionary, SourceError> {
    let dictionary = Dictionary::from_json(json)
        .map_err(|e| SourceError::InvalidDocument(format!("{}: {}", version, e)))?;

    if dictionary.version != version {
        return Err(SourceError::InvalidDocument(format!(
            "requested version {} but document is version {}",
            version, dictionary.version
        )));
    }

    Ok(dictionary)
}
