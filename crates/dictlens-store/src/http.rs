//! Dictionary source backed by the submission server's web service
//!
//! Endpoints:
//! - `GET {base}/ws/dictionaries` - all dictionaries (only versions are read)
//! - `GET {base}/ws/dictionaries/{version}` - one dictionary
//! - `GET {base}/ws/codeLists` - all code lists

use crate::source::{parse_dictionary, DictionarySource, SourceError};
use dictlens_core::{CodeList, Dictionary};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

/// Fetches dictionaries over HTTP
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

#[derive(Deserialize)]
struct VersionOnly {
    version: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    /// Send this value in the `Authorization` header
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/ws/` followed by the percent-encoded segments
    fn url(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let invalid = || SourceError::NetworkError(format!("invalid base URL: {}", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("ws")
            .extend(segments);
        Ok(url)
    }

    /// GET a path and return the status and body
    async fn get_text(&self, segments: &[&str]) -> Result<(StatusCode, String), SourceError> {
        let url = self.url(segments)?;
        tracing::debug!(url = %url, "fetching");

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.auth_token {
            request = request.header(reqwest::header::AUTHORIZATION, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::NetworkError(e.to_string()))?;

        tracing::debug!(url = %url, status = %status, "response");
        Ok((status, body))
    }
}

fn check_status(status: StatusCode, body: String) -> Result<String, SourceError> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(SourceError::HttpError {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait::async_trait]
impl DictionarySource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_dictionary(&self, version: &str) -> Result<Dictionary, SourceError> {
        let (status, body) = self.get_text(&["dictionaries", version]).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(version.to_string()));
        }

        let json = check_status(status, body)?;
        parse_dictionary(&json, version)
    }

    async fn fetch_code_lists(&self) -> Result<Vec<CodeList>, SourceError> {
        let (status, body) = self.get_text(&["codeLists"]).await?;
        let json = check_status(status, body)?;

        serde_json::from_str(&json).map_err(|e| SourceError::InvalidDocument(e.to_string()))
    }

    async fn list_versions(&self) -> Result<Vec<String>, SourceError> {
        let (status, body) = self.get_text(&["dictionaries"]).await?;
        let json = check_status(status, body)?;

        let entries: Vec<VersionOnly> = serde_json::from_str(&json)
            .map_err(|e| SourceError::InvalidDocument(e.to_string()))?;

        let mut versions: Vec<String> = entries.into_iter().map(|e| e.version).collect();
        versions.sort();
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let source = HttpSource::new("https://submissions.example.org/");
        assert_eq!(source.base_url(), "https://submissions.example.org");
        assert_eq!(
            source.url(&["dictionaries", "0.6c"]).unwrap().as_str(),
            "https://submissions.example.org/ws/dictionaries/0.6c"
        );
    }

    #[test]
    fn version_is_a_single_encoded_segment() {
        let source = HttpSource::new("http://localhost:5380/api");
        assert_eq!(
            source.url(&["dictionaries", "0.6c/../x?y#z"]).unwrap().as_str(),
            "http://localhost:5380/api/ws/dictionaries/0.6c%2F..%2Fx%3Fy%23z"
        );
    }

    #[test]
    fn unparseable_base_is_an_error() {
        let source = HttpSource::new("not a url");
        assert!(matches!(source.url(&["codeLists"]), Err(SourceError::NetworkError(_))));
    }

    #[test]
    fn non_success_status_is_http_error() {
        let err = check_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()).unwrap_err();
        assert!(matches!(err, SourceError::HttpError { status: 500, ref body } if body == "boom"));
        assert_eq!(check_status(StatusCode::OK, "{}".to_string()).unwrap(), "{}");
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let source = HttpSource::new("http://127.0.0.1:1");
        assert!(matches!(
            source.fetch_dictionary("1").await,
            Err(SourceError::NetworkError(_))
        ));
    }
}
