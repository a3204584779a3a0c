//! Submission view model with change notification

use crate::service::{QueueRequest, SubmissionError, SubmissionService};
use crate::state::{FileGroup, SubmissionFile, SubmissionState};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// One project's submission in one release
///
/// State lives in a watch channel: every mutation goes through
/// [`SubmissionModel::update`] and wakes all subscribers.
pub struct SubmissionModel {
    service: Arc<dyn SubmissionService>,
    state: watch::Sender<SubmissionState>,
}

impl SubmissionModel {
    pub fn new(
        service: Arc<dyn SubmissionService>,
        release_name: impl Into<String>,
        project_key: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionState::new(release_name, project_key));
        Self { service, state }
    }

    /// Receiver that observes every later state change
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Apply a mutation and notify subscribers
    fn update(&self, mutate: impl FnOnce(&mut SubmissionState)) {
        self.state.send_modify(mutate);
    }

    /// Fetch the submission and merge it into the state
    ///
    /// `is_loading` is `true` while the request is in flight and `false`
    /// afterwards, whatever the outcome.
    pub async fn fetch(&self) -> Result<(), SubmissionError> {
        let (release, project) = {
            let state = self.state.borrow();
            (state.release_name.clone(), state.project_key.clone())
        };

        self.update(|s| s.is_loading = true);
        let result = self.service.fetch_submission(&release, &project).await;

        match result {
            Ok(document) => {
                self.update(|s| {
                    s.is_loading = false;
                    s.merge(document);
                });
                tracing::debug!(release = %release, project = %project, "submission updated");
                Ok(())
            }
            Err(e) => {
                self.update(|s| s.is_loading = false);
                Err(e)
            }
        }
    }

    /// Queue this project for validation of the given data types
    ///
    /// Only `is_loading` changes; the server payload is returned as is.
    pub async fn queue_for_validation(
        &self,
        emails: Vec<String>,
        data_types: Vec<String>,
    ) -> Result<Value, SubmissionError> {
        let request = QueueRequest {
            key: self.state.borrow().project_key.clone(),
            emails,
            data_types,
        };

        self.update(|s| s.is_loading = true);
        let result = self.service.queue_for_validation(&[request]).await;
        self.update(|s| s.is_loading = false);

        if let Err(e) = &result {
            tracing::warn!(error = %e, "queue for validation failed");
        }
        result
    }

    pub fn total_file_size_in_bytes(&self) -> u64 {
        self.state.borrow().total_file_size_in_bytes()
    }

    pub fn grouped_submission_files(&self) -> BTreeMap<FileGroup, Vec<SubmissionFile>> {
        self.state.borrow().grouped_submission_files()
    }
}
