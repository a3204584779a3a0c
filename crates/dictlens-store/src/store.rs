//! In-memory store of loaded dictionaries and code lists

use crate::source::{DictionarySource, SourceError};
use crate::validate::validate;
use dictlens_core::{CodeList, Dictionary, ValidationIssue};
use std::collections::HashMap;
use std::sync::Arc;

/// Errors raised while loading into the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Dictionary {version} failed validation ({} issue(s))", .issues.len())]
    Invalid {
        version: String,
        issues: Vec<ValidationIssue>,
    },
}

/// Read-only cache of dictionaries by version and code lists by name
///
/// Filled through the async `load*` methods; every lookup after that is
/// synchronous. A stored dictionary is never mutated.
#[derive(Debug, Default)]
pub struct DictionaryStore {
    dictionaries: HashMap<String, Arc<Dictionary>>,
    code_lists: HashMap<String, Arc<CodeList>>,
    /// Warnings recorded for each accepted version
    issues: HashMap<String, Vec<ValidationIssue>>,
}

impl DictionaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch, validate and cache a dictionary version
    ///
    /// A version already in the store is returned without touching the source.
    pub async fn load(
        &mut self,
        source: &dyn DictionarySource,
        version: &str,
    ) -> Result<Arc<Dictionary>, StoreError> {
        if let Some(dictionary) = self.dictionaries.get(version) {
            return Ok(Arc::clone(dictionary));
        }

        tracing::debug!(source = source.name(), version, "loading dictionary");
        let dictionary = source.fetch_dictionary(version).await?;
        self.insert(dictionary)
    }

    /// Fetch all code lists, replacing any previously loaded list of the same name
    pub async fn load_code_lists(&mut self, source: &dyn DictionarySource) -> Result<usize, StoreError> {
        let lists = source.fetch_code_lists().await?;
        let count = lists.len();

        for list in lists {
            self.code_lists.insert(list.name.clone(), Arc::new(list));
        }

        tracing::debug!(source = source.name(), count, "loaded code lists");
        Ok(count)
    }

    /// Validate and store an already-parsed dictionary
    pub fn insert(&mut self, dictionary: Dictionary) -> Result<Arc<Dictionary>, StoreError> {
        let version = dictionary.version.clone();
        let issues = validate(&dictionary);

        if issues.iter().any(ValidationIssue::is_error) {
            tracing::warn!(version = %version, issues = issues.len(), "rejected dictionary");
            return Err(StoreError::Invalid { version, issues });
        }

        for issue in &issues {
            tracing::warn!(version = %version, code = issue.code.as_str(), "{}", issue.message);
        }

        let dictionary = Arc::new(dictionary);
        self.dictionaries.insert(version.clone(), Arc::clone(&dictionary));
        self.issues.insert(version, issues);
        Ok(dictionary)
    }

    pub fn get_dictionary(&self, version: &str) -> Option<Arc<Dictionary>> {
        self.dictionaries.get(version).cloned()
    }

    pub fn get_code_list(&self, name: &str) -> Option<Arc<CodeList>> {
        self.code_lists.get(name).cloned()
    }

    /// Warnings recorded when `version` was accepted
    pub fn issues(&self, version: &str) -> &[ValidationIssue] {
        self.issues.get(version).map(Vec::as_slice).unwrap_or_default()
    }

    /// Loaded versions, sorted
    pub fn versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = self.dictionaries.keys().map(String::as_str).collect();
        versions.sort_unstable();
        versions
    }
}
