//! Cancellation and concurrent-send tests
//!
//! A delayed mock keeps sends in flight long enough to cancel, supersede or
//! tear them down.

use super::memory_session;
use rest_composer::config::ConcurrentSendPolicy;
use rest_composer::executor::{CancellationToken, ExecutionKind};
use rest_composer::models::{HttpMethod, RequestDraft, ResponseBody, CANCELLED_MESSAGE};
use rest_composer::SessionError;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SLOW: Duration = Duration::from_secs(2);

async fn server_with_slow_and_fast_routes() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(SLOW))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fast"))
        .mount(&server)
        .await;
    server
}

fn get(server: &MockServer, route: &str) -> RequestDraft {
    RequestDraft::new(HttpMethod::GET, format!("{}{}", server.uri(), route))
}

#[tokio::test]
async fn test_cancel_in_flight_send() {
    let server = server_with_slow_and_fast_routes().await;
    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;

    let handle = session.start_send(get(&server, "/slow")).unwrap();
    assert!(session.is_sending());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.cancel(), 1);

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome.kind, ExecutionKind::Cancelled);
    assert_eq!(outcome.response.status, 0);
    assert_eq!(
        outcome.response.data,
        ResponseBody::Text(CANCELLED_MESSAGE.to_string())
    );
    assert!(outcome.response.time_ms < SLOW.as_millis() as u64);
    assert_eq!(outcome.record.error, None);
    assert!(outcome.displayed);
    assert!(!session.is_sending());

    let history = session.history().list().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].response.body.as_deref(), Some(CANCELLED_MESSAGE));
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let token = CancellationToken::new();
    assert!(token.cancel());
    assert!(!token.cancel());
    assert!(token.is_cancelled());

    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;
    assert_eq!(session.cancel(), 0);
}

#[tokio::test]
async fn test_cancel_previous_supersedes_earlier_send() {
    let server = server_with_slow_and_fast_routes().await;
    let (session, _backend) = memory_session(ConcurrentSendPolicy::CancelPrevious).await;

    let first = session.start_send(get(&server, "/slow")).unwrap();
    let second = session.start_send(get(&server, "/fast")).unwrap();

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_eq!(first.kind, ExecutionKind::Cancelled);
    assert!(!first.displayed);
    assert_eq!(second.kind, ExecutionKind::Completed);
    assert!(second.displayed);
    assert_eq!(session.current_response(), Some(second.response));
    assert_eq!(session.history().len().await, 2);
}

#[tokio::test]
async fn test_latest_wins_keeps_earlier_send_running() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fast"))
        .mount(&server)
        .await;

    let (session, _backend) = memory_session(ConcurrentSendPolicy::LatestWins).await;

    let first = session.start_send(get(&server, "/slow")).unwrap();
    let second = session.start_send(get(&server, "/fast")).unwrap();

    let second = second.await.unwrap().unwrap();
    let first = first.await.unwrap().unwrap();

    assert_eq!(first.kind, ExecutionKind::Completed);
    assert!(!first.displayed);
    assert!(second.displayed);

    // The late first response must not overwrite the second.
    let displayed = session.current_response().unwrap();
    assert_eq!(displayed.data, ResponseBody::Text("fast".to_string()));

    let history = session.history().list().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].response.body.as_deref(), Some("slow"));
}

#[tokio::test]
async fn test_reject_refuses_second_send() {
    let server = server_with_slow_and_fast_routes().await;
    let (session, _backend) = memory_session(ConcurrentSendPolicy::Reject).await;

    let first = session.start_send(get(&server, "/slow")).unwrap();
    let refused = session.start_send(get(&server, "/fast"));
    assert!(matches!(refused, Err(SessionError::Busy)));

    session.cancel();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.kind, ExecutionKind::Cancelled);
    assert_eq!(session.history().len().await, 1);

    let after = session.send(get(&server, "/fast")).await.unwrap();
    assert_eq!(after.kind, ExecutionKind::Completed);
}

#[tokio::test]
async fn test_teardown_cancels_and_stops_publishing() {
    let server = server_with_slow_and_fast_routes().await;
    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;

    let handle = session.start_send(get(&server, "/slow")).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.teardown();
    assert!(session.is_torn_down());

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome.kind, ExecutionKind::Cancelled);
    assert!(!outcome.displayed);
    assert_eq!(session.current_response(), None);
    assert_eq!(session.history().len().await, 1);

    let refused = session.start_send(get(&server, "/fast"));
    assert!(matches!(refused, Err(SessionError::TornDown)));
}

#[tokio::test]
async fn test_subscribers_see_published_response() {
    let server = server_with_slow_and_fast_routes().await;
    let (session, _backend) = memory_session(ConcurrentSendPolicy::default()).await;
    let mut updates = session.subscribe_response();

    session.send(get(&server, "/fast")).await.unwrap();

    updates.changed().await.unwrap();
    let shown = updates.borrow().clone().unwrap();
    assert_eq!(shown.status, 200);
}
