//! End-to-end loading into the store from a dictionary directory and from
//! an in-process axum server standing in for the submission web service

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    Router,
};
use dictlens_core::{CodeList, IssueCode};
use dictlens_store::{
    DictionarySource, DictionaryStore, DirectorySource, HttpSource, SourceError, StoreError,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

const V1: &str = r#"{
  "version": "0.6c",
  "files": [
    {
      "name": "donor",
      "label": "Donor",
      "fields": [
        {"name": "donor_id", "valueType": "TEXT", "restrictions": [{"type": "required", "config": {}}]},
        {"name": "donor_sex", "valueType": "INTEGER", "controlled": true,
         "restrictions": [{"type": "codelist", "config": {"name": "donor.donor_sex"}}]}
      ],
      "uniqueFields": ["donor_id"],
      "relations": [{"other": "specimen", "fields": ["donor_id"], "otherFields": ["donor_id"]}]
    },
    {
      "name": "specimen",
      "fields": [
        {"name": "donor_id", "valueType": "TEXT"},
        {"name": "specimen_id", "valueType": "TEXT"}
      ]
    }
  ]
}"#;

const BROKEN: &str = r#"{
  "version": "0.7a",
  "files": [
    {
      "name": "donor",
      "fields": [{"name": "donor_id", "valueType": "TEXT"}],
      "relations": [{"other": "surgery", "fields": ["donor_id"], "otherFields": ["donor_id"]}]
    }
  ]
}"#;

const CODE_LISTS: &str = r#"[
  {"name": "donor.donor_sex", "label": "Sex",
   "terms": [{"code": "1", "value": "male"}, {"code": "2", "value": "female"}]}
]"#;

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[tokio::test]
async fn loads_valid_directory() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "0.6c.json", V1);
    write(dir.path(), "0.7a.json", BROKEN);
    write(dir.path(), "codelists.json", CODE_LISTS);

    let source = DirectorySource::new(dir.path());
    assert_eq!(source.list_versions().await.unwrap(), vec!["0.6c", "0.7a"]);

    let mut store = DictionaryStore::new();
    let dict = store.load(&source, "0.6c").await.unwrap();
    assert_eq!(dict.file_type_names(), vec!["donor", "specimen"]);
    assert!(store.issues("0.6c").is_empty());

    store.load_code_lists(&source).await.unwrap();
    let sex = dict
        .file_type("donor")
        .and_then(|ft| ft.field("donor_sex"))
        .and_then(|f| f.codelist_name())
        .and_then(|name| store.get_code_list(name))
        .unwrap();
    assert_eq!(sex.value_for("1"), Some("male"));
}

#[tokio::test]
async fn rejects_unresolved_relation() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "0.7a.json", BROKEN);

    let source = DirectorySource::new(dir.path());
    let mut store = DictionaryStore::new();

    let err = store.load(&source, "0.7a").await.unwrap_err();
    let StoreError::Invalid { issues, .. } = err else {
        panic!("expected validation failure");
    };
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, IssueCode::UnresolvedRelation);
    assert!(store.versions().is_empty());
}

#[tokio::test]
async fn document_version_must_match_file_name() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "0.9.json", V1);

    let source = DirectorySource::new(dir.path());
    let mut store = DictionaryStore::new();

    let err = store.load(&source, "0.9").await.unwrap_err();
    assert!(err.to_string().contains("requested version 0.9"));
}

/// Serves canned bodies by path, 404 for anything else, and records each
/// request's path and `Authorization` header
#[derive(Clone)]
struct MockServer {
    responses: Arc<HashMap<&'static str, &'static str>>,
    requests: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl MockServer {
    async fn start(responses: &[(&'static str, &'static str)]) -> (HttpSource, Self) {
        let server = Self {
            responses: Arc::new(responses.iter().copied().collect()),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new().fallback(respond).with_state(server.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (HttpSource::new(base_url), server)
    }

    fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn respond(
    State(server): State<MockServer>,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    server
        .requests
        .lock()
        .unwrap()
        .push((uri.path().to_string(), authorization));

    match server.responses.get(uri.path()) {
        Some(body) => (StatusCode::OK, body.to_string()),
        None => (StatusCode::NOT_FOUND, format!("nothing at {}", uri.path())),
    }
}

#[tokio::test]
async fn http_source_loads_into_store_with_auth_header() {
    let (source, server) =
        MockServer::start(&[("/ws/dictionaries/0.6c", V1), ("/ws/codeLists", CODE_LISTS)]).await;
    let source = source.with_auth_token("X-DCC-Auth secret");

    let mut store = DictionaryStore::new();
    let dict = store.load(&source, "0.6c").await.unwrap();
    assert_eq!(dict.file_type_names(), vec!["donor", "specimen"]);

    store.load_code_lists(&source).await.unwrap();
    assert_eq!(store.get_code_list("donor.donor_sex").unwrap().value_for("2"), Some("female"));

    assert_eq!(
        server.requests(),
        vec![
            ("/ws/dictionaries/0.6c".to_string(), Some("X-DCC-Auth secret".to_string())),
            ("/ws/codeLists".to_string(), Some("X-DCC-Auth secret".to_string())),
        ]
    );
}

#[tokio::test]
async fn http_source_maps_404_to_not_found() {
    let (source, server) = MockServer::start(&[]).await;

    let err = source.fetch_dictionary("0.8").await.unwrap_err();
    assert!(matches!(err, SourceError::NotFound(ref v) if v == "0.8"));

    // A version with a slash is one encoded segment, not a sub-path
    let err = source.fetch_dictionary("0.8/latest").await.unwrap_err();
    assert!(matches!(err, SourceError::NotFound(_)));
    assert_eq!(server.requests()[1].0, "/ws/dictionaries/0.8%2Flatest");
    assert_eq!(server.requests()[1].1, None);
}

#[tokio::test]
async fn http_source_lists_versions_sorted() {
    let (source, _server) = MockServer::start(&[(
        "/ws/dictionaries",
        r#"[{"version": "0.7a", "files": []}, {"version": "0.6c", "state": "OPENED"}]"#,
    )])
    .await;

    assert_eq!(source.list_versions().await.unwrap(), vec!["0.6c", "0.7a"]);
}

#[tokio::test]
async fn http_source_decodes_code_lists() {
    let (source, _server) = MockServer::start(&[("/ws/codeLists", CODE_LISTS)]).await;

    let lists = source.fetch_code_lists().await.unwrap();
    let mut expected = CodeList::new("donor.donor_sex", [("1", "male"), ("2", "female")]);
    expected.label = "Sex".to_string();
    assert_eq!(lists, vec![expected]);
}

#[tokio::test]
async fn http_source_rejects_malformed_payloads() {
    let (source, _server) = MockServer::start(&[
        ("/ws/dictionaries", r#"{"version": "0.6c"}"#),
        ("/ws/dictionaries/0.9", V1),
    ])
    .await;

    assert!(matches!(source.list_versions().await, Err(SourceError::InvalidDocument(_))));
    assert!(matches!(source.fetch_dictionary("0.9").await, Err(SourceError::InvalidDocument(_))));
}
