//! Submission server client
//!
//! Endpoints:
//! - `GET {base}/ws/releases/{release}/submissions/{project}`
//! - `POST {base}/ws/nextRelease/queue` with `[{key, emails, dataTypes}]`

use crate::state::SubmissionDocument;
use dictlens_core::SubmissionConfig;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Errors returned by submission services
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmissionError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response, carrying the server's payload
    #[error("Request rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: Value },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SubmissionError {
    /// Server payload of a rejected request
    pub fn body(&self) -> Option<&Value> {
        match self {
            SubmissionError::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// One entry of a validation queue request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRequest {
    /// Project key
    pub key: String,
    pub emails: Vec<String>,
    pub data_types: Vec<String>,
}

/// Access to the submission server
#[async_trait::async_trait]
pub trait SubmissionService: Send + Sync {
    /// Fetch a project's submission in a release
    async fn fetch_submission(
        &self,
        release: &str,
        project: &str,
    ) -> Result<SubmissionDocument, SubmissionError>;

    /// Queue projects for validation, returning the server's payload
    ///
    /// An empty success response yields `Value::Null`.
    async fn queue_for_validation(&self, requests: &[QueueRequest]) -> Result<Value, SubmissionError>;
}

/// reqwest-backed submission service
#[derive(Debug, Clone)]
pub struct HttpSubmissionService {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpSubmissionService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    /// Build from configuration, reading the token from the configured variable
    pub fn from_config(config: &SubmissionConfig) -> Self {
        let service = Self::new(config.base_url.clone());
        match config.auth_token() {
            Some(token) => service.with_auth_token(token),
            None => service,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// `{base}/ws/` followed by the percent-encoded segments
    fn url(&self, segments: &[&str]) -> Result<Url, SubmissionError> {
        let invalid = || SubmissionError::Network(format!("invalid base URL: {}", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("ws")
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token),
            None => request,
        }
    }
}

/// Decode a response payload: empty bodies are `Null`, non-JSON bodies are kept as text
fn parse_body(status: StatusCode, text: &str) -> Value {
    if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

async fn read_response(response: reqwest::Response) -> Result<Value, SubmissionError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| SubmissionError::Network(e.to_string()))?;
    let body = parse_body(status, &text);

    if !status.is_success() {
        tracing::error!(status = status.as_u16(), body = %body, "submission request rejected");
        return Err(SubmissionError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

#[async_trait::async_trait]
impl SubmissionService for HttpSubmissionService {
    async fn fetch_submission(
        &self,
        release: &str,
        project: &str,
    ) -> Result<SubmissionDocument, SubmissionError> {
        let url = self.url(&["releases", release, "submissions", project])?;
        tracing::debug!(url = %url, "fetching submission");

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        let body = read_response(response).await?;
        serde_json::from_value(body).map_err(|e| SubmissionError::InvalidResponse(e.to_string()))
    }

    async fn queue_for_validation(&self, requests: &[QueueRequest]) -> Result<Value, SubmissionError> {
        let url = self.url(&["nextRelease", "queue"])?;
        tracing::debug!(url = %url, projects = requests.len(), "queueing for validation");

        let response = self
            .authorize(self.client.post(url).json(requests))
            .send()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        read_response(response).await
    }
}

/// In-memory submission service for tests
#[derive(Clone, Default)]
pub struct MockSubmissionService {
    submissions: Arc<Mutex<HashMap<(String, String), SubmissionDocument>>>,
    queue_response: Arc<Mutex<Option<Result<Value, SubmissionError>>>>,
    queued: Arc<Mutex<Vec<QueueRequest>>>,
}

impl MockSubmissionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_submission(
        &self,
        release: impl Into<String>,
        project: impl Into<String>,
        document: SubmissionDocument,
    ) {
        self.submissions
            .lock()
            .await
            .insert((release.into(), project.into()), document);
    }

    /// Result returned by every later queue call (default `Ok(Null)`)
    pub async fn set_queue_response(&self, response: Result<Value, SubmissionError>) {
        *self.queue_response.lock().await = Some(response);
    }

    /// Every request queued so far
    pub async fn queued(&self) -> Vec<QueueRequest> {
        self.queued.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl SubmissionService for MockSubmissionService {
    async fn fetch_submission(
        &self,
        release: &str,
        project: &str,
    ) -> Result<SubmissionDocument, SubmissionError> {
        self.submissions
            .lock()
            .await
            .get(&(release.to_string(), project.to_string()))
            .cloned()
            .ok_or_else(|| SubmissionError::Rejected {
                status: 404,
                body: Value::String(format!("no submission for {} in {}", project, release)),
            })
    }

    async fn queue_for_validation(&self, requests: &[QueueRequest]) -> Result<Value, SubmissionError> {
        self.queued.lock().await.extend_from_slice(requests);
        self.queue_response
            .lock()
            .await
            .clone()
            .unwrap_or(Ok(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn queue_request_wire_format() {
        let request = QueueRequest {
            key: "PACA-CA".to_string(),
            emails: vec!["a@example.org".to_string()],
            data_types: vec!["SSM_TYPE".to_string()],
        };
        assert_eq!(
            serde_json::to_value([&request]).unwrap(),
            json!([{"key": "PACA-CA", "emails": ["a@example.org"], "dataTypes": ["SSM_TYPE"]}])
        );
    }

    #[test]
    fn path_values_are_encoded_segments() {
        let service = HttpSubmissionService::new("http://localhost:5380/");
        assert_eq!(
            service.url(&["releases", "ICGC25", "submissions", "PACA/CA?x"]).unwrap().as_str(),
            "http://localhost:5380/ws/releases/ICGC25/submissions/PACA%2FCA%3Fx"
        );
        assert!(matches!(
            HttpSubmissionService::new("::").url(&["nextRelease"]),
            Err(SubmissionError::Network(_))
        ));
    }

    #[test]
    fn body_parsing() {
        assert_eq!(parse_body(StatusCode::NO_CONTENT, ""), Value::Null);
        assert_eq!(parse_body(StatusCode::OK, "  "), Value::Null);
        assert_eq!(
            parse_body(StatusCode::BAD_REQUEST, r#"{"code":"InvalidState"}"#),
            json!({"code": "InvalidState"})
        );
        assert_eq!(
            parse_body(StatusCode::BAD_GATEWAY, "<html>"),
            Value::String("<html>".to_string())
        );
    }

    #[test]
    fn rejected_exposes_body() {
        let err = SubmissionError::Rejected {
            status: 400,
            body: json!({"code": "NoSuchProject"}),
        };
        assert_eq!(err.body(), Some(&json!({"code": "NoSuchProject"})));
        assert!(err.to_string().contains("HTTP 400"));
        assert!(SubmissionError::Network("x".to_string()).body().is_none());
    }

    #[tokio::test]
    async fn mock_records_queued_requests() {
        let service = MockSubmissionService::new();
        let request = QueueRequest {
            key: "p".to_string(),
            emails: vec![],
            data_types: vec![],
        };

        assert_eq!(service.queue_for_validation(&[request.clone()]).await.unwrap(), Value::Null);
        assert_eq!(service.queued().await, vec![request]);
        assert!(service.fetch_submission("r", "p").await.is_err());
    }
}
