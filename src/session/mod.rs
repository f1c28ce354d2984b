//! Session controller.
//!
//! Owns the current draft, the in-flight executions and the displayed
//! response. Each send gets a fresh [`CancellationToken`], runs on the tokio
//! runtime, and when it settles the outcome is published for display and
//! appended to history. Every send that passes validation produces exactly one
//! history append, whether it completed, failed or was cancelled.
//!
//! Only the most recently started send may replace the displayed response.
//! What happens to earlier sends still in flight is governed by
//! [`ConcurrentSendPolicy`].

mod error;

pub use error::SessionError;

pub use crate::config::ConcurrentSendPolicy;

use crate::auth::{AuthSpec, AUTHORIZATION_HEADER};
use crate::executor::{CancellationToken, Engine, ExecutionKind, ExecutionTracker};
use crate::history::{HistoryStore, OutcomeMetadata, OutcomeRecord};
use crate::models::{find_saved_request, Header, HttpMethod, RequestDraft, ResponseData};
use crate::storage::app::DEFAULT_ENVIRONMENT;
use crate::storage::{AppStorage, StoreBackend};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The saved request a draft was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOrigin {
    pub collection_id: String,
    pub request_id: String,
    pub name: String,
}

/// A settled send.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub kind: ExecutionKind,
    pub response: ResponseData,
    /// The record as appended to history.
    pub record: OutcomeRecord,
    /// Whether this outcome replaced the displayed response.
    pub displayed: bool,
}

#[derive(Debug)]
struct SessionState {
    draft: RequestDraft,
    origin: Option<DraftOrigin>,
    environment: String,
    tags: Vec<String>,
    next_seq: u64,
    latest_started: u64,
    tracker: ExecutionTracker,
    torn_down: bool,
}

struct Inner<B> {
    engine: Engine,
    history: Arc<HistoryStore<B>>,
    storage: AppStorage<B>,
    policy: ConcurrentSendPolicy,
    state: Mutex<SessionState>,
    response_tx: watch::Sender<Option<ResponseData>>,
}

impl<B> Inner<B> {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        // State is plain data; a panic mid-update cannot leave it unusable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Drives one request editor and its response viewer.
///
/// Cheap to clone; clones share the same session.
pub struct SessionController<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for SessionController<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: StoreBackend + 'static> SessionController<B> {
    /// Creates a controller with an empty draft and the default environment.
    pub fn new(
        engine: Engine,
        history: Arc<HistoryStore<B>>,
        storage: AppStorage<B>,
        policy: ConcurrentSendPolicy,
    ) -> Self {
        let (response_tx, _) = watch::channel(None);
        let state = SessionState {
            draft: RequestDraft::default(),
            origin: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            tags: Vec::new(),
            next_seq: 0,
            latest_started: 0,
            tracker: ExecutionTracker::new(),
            torn_down: false,
        };

        Self {
            inner: Arc::new(Inner {
                engine,
                history,
                storage,
                policy,
                state: Mutex::new(state),
                response_tx,
            }),
        }
    }

    /// Creates a controller over one backend shared by history and settings,
    /// restoring the saved environment.
    pub async fn open(engine: Engine, backend: Arc<B>, policy: ConcurrentSendPolicy) -> Self {
        let history = Arc::new(HistoryStore::new(Arc::clone(&backend)));
        let storage = AppStorage::new(backend);
        let controller = Self::new(engine, history, storage, policy);
        controller.restore_settings().await;
        controller
    }

    /// Loads the saved environment selection.
    pub async fn restore_settings(&self) {
        let settings = self.inner.storage.settings().await;
        self.inner.state().environment = settings.environment;
    }

    pub fn history(&self) -> &Arc<HistoryStore<B>> {
        &self.inner.history
    }

    pub fn storage(&self) -> &AppStorage<B> {
        &self.inner.storage
    }

    pub fn policy(&self) -> ConcurrentSendPolicy {
        self.inner.policy
    }

    // Draft editing

    /// A snapshot of the current draft.
    pub fn draft(&self) -> RequestDraft {
        self.inner.state().draft.clone()
    }

    pub fn set_method(&self, method: HttpMethod) {
        self.inner.state().draft.method = method;
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.inner.state().draft.url = url.into();
    }

    pub fn set_headers(&self, headers: Vec<Header>) {
        self.inner.state().draft.headers = headers;
    }

    pub fn set_body(&self, body: impl Into<String>) {
        self.inner.state().draft.body = body.into();
    }

    pub fn set_authorization(&self, authorization: AuthSpec) {
        self.inner.state().draft.authorization = authorization;
    }

    /// Tags stamped on every subsequent outcome.
    pub fn set_tags(&self, tags: Vec<String>) {
        self.inner.state().tags = tags;
    }

    /// Starts a blank draft that is not linked to any saved request.
    pub fn new_request(&self) {
        let mut state = self.inner.state();
        state.draft = RequestDraft::default();
        state.origin = None;
    }

    /// The saved request the current draft came from, if any.
    pub fn origin(&self) -> Option<DraftOrigin> {
        self.inner.state().origin.clone()
    }

    // Environment

    pub fn environment(&self) -> String {
        self.inner.state().environment.clone()
    }

    /// Selects an environment and persists the choice.
    ///
    /// The selection takes effect for subsequent sends even if persisting it
    /// fails.
    pub async fn set_environment(&self, environment: impl Into<String>) -> Result<(), SessionError> {
        let environment = environment.into();
        self.inner.state().environment = environment.clone();
        self.inner.storage.set_environment(&environment).await?;
        Ok(())
    }

    // Hydration

    /// Loads a saved request into the draft.
    ///
    /// Outcomes of subsequent sends are linked to the saved request until the
    /// draft is replaced by [`new_request`](Self::new_request) or another load.
    pub async fn select_saved_request(
        &self,
        collection_id: &str,
        request_id: &str,
    ) -> Result<RequestDraft, SessionError> {
        let collections = self.inner.storage.collections().await;
        let saved = find_saved_request(&collections, collection_id, request_id).ok_or_else(|| {
            SessionError::SavedRequestNotFound {
                collection_id: collection_id.to_string(),
                request_id: request_id.to_string(),
            }
        })?;

        let draft = saved.to_draft();
        let mut state = self.inner.state();
        state.draft = draft.clone();
        state.origin = Some(DraftOrigin {
            collection_id: collection_id.to_string(),
            request_id: request_id.to_string(),
            name: saved.name.clone(),
        });
        Ok(draft)
    }

    /// Loads a history record into the draft.
    ///
    /// A `Bearer` authorization header is turned back into bearer
    /// authorization; every other header becomes a header row.
    pub fn load_history_entry(&self, record: &OutcomeRecord) -> RequestDraft {
        let mut authorization = AuthSpec::None;
        let mut headers = Vec::with_capacity(record.request.headers.len());
        for (key, value) in record.request.headers.iter() {
            if key.eq_ignore_ascii_case(AUTHORIZATION_HEADER) {
                if let Some(auth) = AuthSpec::from_header_value(value) {
                    authorization = auth;
                    continue;
                }
            }
            headers.push(Header::new(key, value));
        }

        let draft = RequestDraft {
            method: record.request.method,
            url: record.request.url.clone(),
            headers,
            authorization,
            body: record.request.body.clone().unwrap_or_default(),
        };

        let origin = match (&record.metadata.collection_id, &record.metadata.request_id) {
            (Some(collection_id), Some(request_id)) => Some(DraftOrigin {
                collection_id: collection_id.clone(),
                request_id: request_id.clone(),
                name: record.metadata.name.clone().unwrap_or_default(),
            }),
            _ => None,
        };

        let mut state = self.inner.state();
        state.draft = draft.clone();
        state.origin = origin;
        draft
    }

    // Sending

    /// Starts sending `draft` and returns a handle to the settled outcome.
    ///
    /// Validation happens before anything else: a blank URL, a torn-down
    /// session or (under [`ConcurrentSendPolicy::Reject`]) a send already in
    /// flight is refused with no network or history activity.
    pub fn start_send(
        &self,
        draft: RequestDraft,
    ) -> Result<JoinHandle<Result<SendOutcome, SessionError>>, SessionError> {
        let (seq, token, metadata) = {
            let mut state = self.inner.state();
            if state.torn_down {
                return Err(SessionError::TornDown);
            }
            if draft.has_blank_url() {
                return Err(SessionError::EmptyUrl);
            }
            match self.inner.policy {
                ConcurrentSendPolicy::Reject if !state.tracker.is_empty() => {
                    return Err(SessionError::Busy);
                }
                ConcurrentSendPolicy::CancelPrevious => {
                    let cancelled = state.tracker.cancel_all();
                    if cancelled > 0 {
                        log::debug!("cancelled {} superseded send(s)", cancelled);
                    }
                }
                _ => {}
            }

            state.next_seq += 1;
            let seq = state.next_seq;
            let token = CancellationToken::new();
            state.tracker.register(seq, token.clone());
            state.latest_started = seq;
            (seq, token, stamp(&state))
        };

        let inner = Arc::clone(&self.inner);
        Ok(tokio::spawn(async move {
            settle(inner, seq, draft, token, metadata).await
        }))
    }

    /// Sends `draft` and waits for it to settle.
    pub async fn send(&self, draft: RequestDraft) -> Result<SendOutcome, SessionError> {
        let handle = self.start_send(draft)?;
        handle
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))?
    }

    /// Sends the current draft and waits for it to settle.
    pub async fn send_current(&self) -> Result<SendOutcome, SessionError> {
        self.send(self.draft()).await
    }

    /// Cancels every send in flight.
    ///
    /// Each cancelled send still settles into a cancelled outcome that is
    /// recorded in history. Returns how many sends were newly cancelled.
    pub fn cancel(&self) -> usize {
        self.inner.state().tracker.cancel_all()
    }

    pub fn is_sending(&self) -> bool {
        !self.inner.state().tracker.is_empty()
    }

    /// The response currently displayed, if any.
    pub fn current_response(&self) -> Option<ResponseData> {
        self.inner.response_tx.borrow().clone()
    }

    /// Receives every change of the displayed response.
    pub fn subscribe_response(&self) -> watch::Receiver<Option<ResponseData>> {
        self.inner.response_tx.subscribe()
    }

    /// Shuts the session down.
    ///
    /// Cancels everything in flight, stops publishing responses and refuses
    /// further sends. Cancelled sends are still recorded in history.
    pub fn teardown(&self) {
        let mut state = self.inner.state();
        if state.torn_down {
            return;
        }
        state.torn_down = true;
        let cancelled = state.tracker.cancel_all();
        log::debug!("session torn down, cancelled {} send(s)", cancelled);
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.state().torn_down
    }
}

/// Metadata for an outcome started from the current state.
fn stamp(state: &SessionState) -> OutcomeMetadata {
    let mut metadata = OutcomeMetadata {
        environment: Some(state.environment.clone()),
        ..Default::default()
    };
    if let Some(origin) = &state.origin {
        metadata.collection_id = Some(origin.collection_id.clone());
        metadata.request_id = Some(origin.request_id.clone());
        metadata.name = Some(origin.name.clone());
    }
    for tag in &state.tags {
        metadata.add_tag(tag.clone());
    }
    metadata
}

async fn settle<B: StoreBackend>(
    inner: Arc<Inner<B>>,
    seq: u64,
    draft: RequestDraft,
    token: CancellationToken,
    metadata: OutcomeMetadata,
) -> Result<SendOutcome, SessionError> {
    let execution = inner.engine.execute(&draft, &token).await;

    let displayed = {
        let mut state = inner.state();
        state.tracker.unregister(seq);
        !state.torn_down && seq == state.latest_started
    };
    if displayed {
        inner.response_tx.send_replace(Some(execution.response.clone()));
    } else {
        log::debug!("send {} settled after being superseded", seq);
    }

    let mut record = execution.record;
    record.metadata = metadata;

    match inner.history.append(record).await {
        Ok(record) => Ok(SendOutcome {
            kind: execution.kind,
            response: execution.response,
            record,
            displayed,
        }),
        Err(source) => Err(SessionError::HistoryWrite {
            kind: execution.kind,
            response: Box::new(execution.response),
            source,
        }),
    }
}
