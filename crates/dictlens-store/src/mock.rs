//! Mock dictionary source for testing
//!
//! Serves predefined documents from memory. Useful for:
//! - Unit testing store and CLI logic
//! - Simulating per-version failures and slow sources
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dictlens_store::{MockSource, DictionarySource};
//! use dictlens_core::Dictionary;
//!
//! let source = MockSource::new().with_dictionary(Dictionary::new("1", vec![]));
//! let dict = source.fetch_dictionary("1").await?;
//! ```

use crate::source::{DictionarySource, SourceError};
use dictlens_core::{CodeList, Dictionary};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory dictionary source
pub struct MockSource {
    /// Documents by version
    dictionaries: Arc<RwLock<HashMap<String, Dictionary>>>,

    /// Errors to return for specific versions
    errors: Arc<RwLock<HashMap<String, SourceError>>>,

    code_lists: Arc<RwLock<Vec<CodeList>>>,

    /// Simulate request latency (milliseconds)
    latency_ms: u64,

    /// Number of dictionary fetches served
    fetches: Arc<std::sync::atomic::AtomicUsize>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            dictionaries: Arc::new(RwLock::new(HashMap::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            code_lists: Arc::new(RwLock::new(Vec::new())),
            latency_ms: 0,
            fetches: Arc::new(std::sync::atomic::AtomicUsize::new(0)),
        }
    }

    /// Add a document at construction time
    pub fn with_dictionary(self, dictionary: Dictionary) -> Self {
        if let Ok(mut map) = self.dictionaries.try_write() {
            map.insert(dictionary.version.clone(), dictionary);
        }
        self
    }

    /// Set the code lists at construction time
    pub fn with_code_lists(self, code_lists: Vec<CodeList>) -> Self {
        if let Ok(mut lists) = self.code_lists.try_write() {
            *lists = code_lists;
        }
        self
    }

    /// Configure simulated latency for all operations
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Add or replace a document
    pub async fn add_dictionary(&self, dictionary: Dictionary) {
        self.dictionaries
            .write()
            .await
            .insert(dictionary.version.clone(), dictionary);
    }

    /// Configure an error to be returned for a specific version
    pub async fn add_error(&self, version: impl Into<String>, error: SourceError) {
        self.errors.write().await.insert(version.into(), error);
    }

    /// Number of `fetch_dictionary` calls served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockSource {
    fn clone(&self) -> Self {
        Self {
            dictionaries: Arc::clone(&self.dictionaries),
            errors: Arc::clone(&self.errors),
            code_lists: Arc::clone(&self.code_lists),
            latency_ms: self.latency_ms,
            fetches: Arc::clone(&self.fetches),
        }
    }
}

#[async_trait::async_trait]
impl DictionarySource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_dictionary(&self, version: &str) -> Result<Dictionary, SourceError> {
        self.simulate_latency().await;
        self.fetches.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        // Check for configured errors first
        if let Some(error) = self.errors.read().await.get(version) {
            return Err(error.clone());
        }

        self.dictionaries
            .read()
            .await
            .get(version)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(version.to_string()))
    }

    async fn fetch_code_lists(&self) -> Result<Vec<CodeList>, SourceError> {
        self.simulate_latency().await;
        Ok(self.code_lists.read().await.clone())
    }

    async fn list_versions(&self) -> Result<Vec<String>, SourceError> {
        let mut versions: Vec<String> = self.dictionaries.read().await.keys().cloned().collect();
        versions.sort();
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_documents_and_errors() {
        let source = MockSource::new()
            .with_dictionary(Dictionary::new("1", vec![]))
            .with_code_lists(vec![CodeList::new("sex", [("1", "male")])]);
        source.add_dictionary(Dictionary::new("2", vec![])).await;
        source
            .add_error("3", SourceError::NetworkError("down".to_string()))
            .await;

        assert_eq!(source.list_versions().await.unwrap(), vec!["1", "2"]);
        assert_eq!(source.fetch_dictionary("2").await.unwrap().version, "2");
        assert!(matches!(
            source.fetch_dictionary("3").await,
            Err(SourceError::NetworkError(_))
        ));
        assert!(matches!(
            source.fetch_dictionary("4").await,
            Err(SourceError::NotFound(_))
        ));
        assert_eq!(source.fetch_code_lists().await.unwrap().len(), 1);
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let source = MockSource::new();
        let clone = source.clone();
        clone.add_dictionary(Dictionary::new("1", vec![])).await;
        assert!(source.fetch_dictionary("1").await.is_ok());
    }
}
