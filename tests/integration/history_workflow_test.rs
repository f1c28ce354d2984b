//! History workflow tests
//!
//! Cover filtering of recorded sends, the capacity bound, persistence through
//! the file backend and reloading records into the editor.

use super::{init_test_env, memory_session, test_engine};
use rest_composer::auth::AuthSpec;
use rest_composer::config::ConcurrentSendPolicy;
use rest_composer::history::{
    HistoryFilter, HistoryStore, NewOutcomeRecord, OutcomeMetadata, RecordedRequest,
    RecordedResponse, HISTORY_CAPACITY,
};
use rest_composer::models::{Collection, HeaderList, HttpMethod, RequestDraft, SavedRequest};
use rest_composer::storage::{FileStore, MemoryStore};
use rest_composer::SessionController;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn new_record(method: HttpMethod, url: &str) -> NewOutcomeRecord {
    NewOutcomeRecord {
        request: RecordedRequest {
            url: url.to_string(),
            method,
            headers: HeaderList::new(),
            body: None,
            query: None,
        },
        response: RecordedResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: HeaderList::new(),
            body: Some("{}".to_string()),
            size: Some(2),
            time_ms: 12,
        },
        metadata: OutcomeMetadata::default(),
        error: None,
    }
}

async fn ok_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_filter_by_method_and_search() {
    let server = ok_server().await;
    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;

    for (http_method, route) in [
        (HttpMethod::POST, "/users"),
        (HttpMethod::GET, "/users"),
        (HttpMethod::POST, "/orders"),
    ] {
        let draft = RequestDraft::new(http_method, format!("{}{}", server.uri(), route));
        session.send(draft).await.unwrap();
    }

    let filter = HistoryFilter::new().method(HttpMethod::POST).search("USERS");
    let matches = session.history().filter(&filter).await;

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].request.method, HttpMethod::POST);
    assert!(matches[0].request.url.ends_with("/users"));

    let everything = session.history().filter(&HistoryFilter::new()).await;
    assert_eq!(everything.len(), 3);
    assert!(everything[0].request.url.ends_with("/orders"));
}

#[tokio::test]
async fn test_outcomes_carry_environment_and_tags() {
    let server = ok_server().await;
    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;

    session.set_environment("staging").await.unwrap();
    session.set_tags(vec!["smoke".to_string()]);
    session
        .send(RequestDraft::new(HttpMethod::GET, server.uri()))
        .await
        .unwrap();

    session.set_environment("production").await.unwrap();
    session.set_tags(Vec::new());
    session
        .send(RequestDraft::new(HttpMethod::GET, server.uri()))
        .await
        .unwrap();

    let staging = session
        .history()
        .filter(&HistoryFilter::new().environment("staging"))
        .await;
    assert_eq!(staging.len(), 1);
    assert!(staging[0].metadata.has_tag("smoke"));

    let tagged = session
        .history()
        .filter(&HistoryFilter::new().tag("smoke").tag("regression"))
        .await;
    assert_eq!(tagged.len(), 1);

    assert_eq!(session.storage().settings().await.environment, "production");
}

#[tokio::test]
async fn test_capacity_keeps_newest_entries() {
    let store = HistoryStore::new(Arc::new(MemoryStore::new()));

    for i in 0..=HISTORY_CAPACITY {
        let url = format!("https://api.example.com/items/{}", i);
        store.append(new_record(HttpMethod::GET, &url)).await.unwrap();
    }

    let entries = store.list().await;
    assert_eq!(entries.len(), HISTORY_CAPACITY);
    assert_eq!(
        entries[0].request.url,
        format!("https://api.example.com/items/{}", HISTORY_CAPACITY)
    );
    assert_eq!(
        entries[HISTORY_CAPACITY - 1].request.url,
        "https://api.example.com/items/1"
    );

    let mut ids: Vec<_> = entries.iter().map(|e| e.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), HISTORY_CAPACITY);
}

#[tokio::test]
async fn test_file_backed_history_survives_restart() {
    init_test_env();
    let server = ok_server().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("app-storage.json");

    let recorded = {
        let backend = Arc::new(FileStore::new(&path));
        let session =
            SessionController::open(test_engine(), backend, ConcurrentSendPolicy::default()).await;
        session.set_environment("staging").await.unwrap();
        let draft = RequestDraft::new(HttpMethod::POST, format!("{}/users", server.uri()))
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"name":"Ada"}"#);
        session.send(draft).await.unwrap().record
    };
    assert!(path.exists());

    let reopened = SessionController::open(
        test_engine(),
        Arc::new(FileStore::new(&path)),
        ConcurrentSendPolicy::default(),
    )
    .await;
    assert_eq!(reopened.environment(), "staging");
    assert_eq!(reopened.history().list().await, vec![recorded.clone()]);
    assert_eq!(reopened.history().get(&recorded.id).await, Some(recorded));

    reopened.history().clear().await.unwrap();
    let after_clear = HistoryStore::new(Arc::new(FileStore::new(&path)));
    assert!(after_clear.is_empty().await);
}

#[tokio::test]
async fn test_history_entry_reloads_into_draft() {
    let server = ok_server().await;
    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;

    let original = RequestDraft::new(HttpMethod::PUT, format!("{}/users/1", server.uri()))
        .with_header("X-Trace", "abc")
        .with_authorization(AuthSpec::bearer("tok"))
        .with_body("payload");
    let outcome = session.send(original.clone()).await.unwrap();

    session.new_request();
    let draft = session.load_history_entry(&outcome.record);

    assert_eq!(draft, original);
    assert_eq!(session.draft(), original);
    assert_eq!(session.origin(), None);
}

#[tokio::test]
async fn test_saved_request_links_outcome_to_collection() {
    let server = ok_server().await;
    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;

    let mut collection = Collection::new("c1", "Users API");
    collection.requests.push(SavedRequest::new(
        "r1",
        "List users",
        HttpMethod::GET,
        format!("{}/users", server.uri()),
    ));
    session
        .storage()
        .save_collections(&[collection])
        .await
        .unwrap();

    session.select_saved_request("c1", "r1").await.unwrap();
    let outcome = session.send_current().await.unwrap();

    assert_eq!(outcome.record.metadata.collection_id.as_deref(), Some("c1"));
    assert_eq!(outcome.record.metadata.request_id.as_deref(), Some("r1"));
    assert_eq!(outcome.record.display_name(), "List users");

    let found = session
        .history()
        .filter(&HistoryFilter::new().search("list"))
        .await;
    assert_eq!(found.len(), 1);

    let missing = session.select_saved_request("c1", "nope").await;
    assert!(missing.is_err());
}
