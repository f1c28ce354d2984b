//! Send workflow tests
//!
//! Drive the session controller against a local mock server and check what
//! is displayed, what goes over the wire and what lands in history.

use super::memory_session;
use rest_composer::auth::AuthSpec;
use rest_composer::config::ConcurrentSendPolicy;
use rest_composer::executor::ExecutionKind;
use rest_composer::models::{HttpMethod, RequestDraft, ResponseBody};
use rest_composer::SessionError;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_json_is_parsed_displayed_and_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;
    let draft = RequestDraft::new(HttpMethod::GET, format!("{}/users", server.uri()));
    let outcome = session.send(draft).await.unwrap();

    assert_eq!(outcome.kind, ExecutionKind::Completed);
    assert_eq!(outcome.response.status, 200);
    assert_eq!(outcome.response.status_text, "OK");
    assert_eq!(outcome.response.data, ResponseBody::Json(json!([{"id": 1}])));
    assert!(outcome.displayed);
    assert_eq!(session.current_response(), Some(outcome.response.clone()));

    let history = session.history().list().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].request.method, HttpMethod::GET);
    assert_eq!(history[0].response.status, 200);
    assert_eq!(history[0].error, None);
    server.verify().await;
}

#[tokio::test]
async fn test_plain_text_body_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("nothing here", "text/plain"))
        .mount(&server)
        .await;

    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;
    let outcome = session
        .send(RequestDraft::new(HttpMethod::GET, server.uri()))
        .await
        .unwrap();

    // Any HTTP status counts as a completed exchange.
    assert_eq!(outcome.kind, ExecutionKind::Completed);
    assert_eq!(outcome.response.status, 404);
    assert_eq!(
        outcome.response.data,
        ResponseBody::Text("nothing here".to_string())
    );
    assert_eq!(outcome.record.error, None);
}

#[tokio::test]
async fn test_empty_url_is_refused() {
    let (session, backend) = memory_session(ConcurrentSendPolicy::default()).await;

    let result = session.send(RequestDraft::new(HttpMethod::POST, "")).await;

    assert!(matches!(result, Err(SessionError::EmptyUrl)));
    assert_eq!(result.unwrap_err().to_string(), "Please enter a URL");
    assert!(session.history().is_empty().await);
    assert_eq!(session.current_response(), None);
    assert_eq!(backend.write_count(), 0);
}

#[tokio::test]
async fn test_unreachable_host_settles_as_failure() {
    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;

    let outcome = session
        .send(RequestDraft::new(HttpMethod::GET, "http://127.0.0.1:1/"))
        .await
        .unwrap();

    assert_eq!(outcome.kind, ExecutionKind::Failed);
    assert_eq!(outcome.response.status, 0);
    let error = outcome.record.error.clone().expect("failure should carry an error");
    assert!(error.code.is_some());
    assert!(!error.message.is_empty());
    assert!(!error.message.starts_with("Connection failed"));
    assert_eq!(outcome.response.data, ResponseBody::Text(error.message));
    assert_eq!(session.history().len().await, 1);
}

#[tokio::test]
async fn test_malformed_json_settles_as_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
        .mount(&server)
        .await;

    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;
    let outcome = session
        .send(RequestDraft::new(HttpMethod::GET, server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome.kind, ExecutionKind::Failed);
    assert_eq!(outcome.response.status, 0);
    assert_eq!(
        outcome.record.error.and_then(|e| e.code).as_deref(),
        Some("decode")
    );
}

#[tokio::test]
async fn test_get_and_delete_never_send_a_body() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;
    for http_method in [HttpMethod::GET, HttpMethod::DELETE] {
        let draft = RequestDraft::new(http_method, server.uri()).with_body(r#"{"x":1}"#);
        let outcome = session.send(draft).await.unwrap();
        assert_eq!(outcome.record.request.body, None);
    }

    let received = server
        .received_requests()
        .await
        .expect("mock server should record received requests");
    assert_eq!(received.len(), 2);
    assert!(received.iter().all(|request| request.body.is_empty()));
}

#[tokio::test]
async fn test_post_sends_body_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;
    let body = r#"{"name": "Ada"}"#;
    let draft = RequestDraft::new(HttpMethod::POST, format!("{}/users", server.uri()))
        .with_header("Content-Type", "application/json")
        .with_body(body);
    let outcome = session.send(draft).await.unwrap();

    assert_eq!(outcome.response.status, 201);
    assert_eq!(outcome.record.request.body.as_deref(), Some(body));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, body.as_bytes());
    server.verify().await;
}

#[tokio::test]
async fn test_bearer_replaces_user_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;
    let draft = RequestDraft::new(HttpMethod::GET, server.uri())
        .with_header("authorization", "Basic stale")
        .with_authorization(AuthSpec::bearer("abc"));
    let outcome = session.send(draft).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let values: Vec<_> = received[0]
        .headers
        .get_all("authorization")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(values, vec!["Bearer abc".to_string()]);

    let recorded = &outcome.record.request.headers;
    assert_eq!(recorded.count_ignore_case("authorization"), 1);
    assert_eq!(recorded.get_ignore_case("authorization"), Some("Bearer abc"));
}

#[tokio::test]
async fn test_basic_auth_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;
    let draft = RequestDraft::new(HttpMethod::GET, server.uri()).with_authorization(
        AuthSpec::Basic {
            username: "ada".to_string(),
            password: "secret".to_string(),
        },
    );
    session.send(draft).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_failed_history_write_still_publishes_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let (session, backend) = memory_session(ConcurrentSendPolicy::default()).await;
    backend.fail_writes(true);

    let result = session
        .send(RequestDraft::new(HttpMethod::GET, server.uri()))
        .await;

    match result {
        Err(SessionError::HistoryWrite { kind, response, .. }) => {
            assert_eq!(kind, ExecutionKind::Completed);
            assert_eq!(response.status, 200);
            assert_eq!(session.current_response(), Some(*response));
        }
        other => panic!("expected a history write failure, got {:?}", other),
    }
    assert!(session.history().is_empty().await);
}
