//! HTTP request execution.
//!
//! The [`Engine`] takes a [`RequestDraft`], resolves it into a wire request,
//! performs the exchange under a [`CancellationToken`], and folds whatever
//! happens into an [`Execution`]. It never returns an error: transport
//! failures and cancellation both produce a zero-status response carrying a
//! human-readable message, so there is always something to display and record.
//!
//! The engine has no side effects beyond the network call. Recording the
//! outcome is the caller's job.

pub mod cancellation;
pub mod config;
pub mod error;
pub mod resolve;
pub mod timing;

pub use cancellation::{CancellationToken, ExecutionTracker};
pub use config::ExecutionConfig;
pub use error::RequestError;
pub use resolve::{resolve_headers, ResolvedRequest};
pub use timing::{format_timing_compact, TimingCheckpoints};

use crate::history::{NewOutcomeRecord, OutcomeError, OutcomeMetadata, RecordedResponse};
use crate::models::response::is_json_content_type;
use crate::models::{
    HeaderList, RequestDraft, ResponseBody, ResponseData, CANCELLED_MESSAGE,
    UNKNOWN_ERROR_MESSAGE,
};

/// How an execution settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionKind {
    /// The server answered and the body was read. Any status code counts.
    Completed,
    /// The exchange failed before a full response was read.
    Failed,
    /// The token was triggered before the exchange settled.
    Cancelled,
}

/// The settled result of one execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub kind: ExecutionKind,
    /// What the response viewer shows.
    pub response: ResponseData,
    /// What goes into history, without id, timestamp or metadata.
    pub record: NewOutcomeRecord,
}

impl Execution {
    pub fn is_cancelled(&self) -> bool {
        self.kind == ExecutionKind::Cancelled
    }

    pub fn is_failure(&self) -> bool {
        self.kind == ExecutionKind::Failed
    }
}

/// Performs executions with a shared HTTP client.
#[derive(Debug, Clone)]
pub struct Engine {
    client: reqwest::Client,
    config: ExecutionConfig,
}

impl Engine {
    /// Builds an engine and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::BuildError` if the TLS backend cannot be
    /// initialised.
    pub fn new(config: ExecutionConfig) -> Result<Self, RequestError> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects as usize)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(redirect)
            .danger_accept_invalid_certs(!config.validate_ssl)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RequestError::BuildError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Builds an engine from the global configuration.
    pub fn from_global_config() -> Result<Self, RequestError> {
        Self::new(ExecutionConfig::from_global_config())
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Executes a draft.
    ///
    /// The exchange, including reading the body, is raced against `token`.
    /// If the token wins, the in-flight exchange is dropped and a cancelled
    /// outcome is produced with the time elapsed up to that point. A token
    /// that is already triggered cancels before anything is sent.
    ///
    /// The caller is expected to reject drafts with a blank URL beforehand.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rest_composer::executor::{CancellationToken, Engine, ExecutionConfig};
    /// use rest_composer::models::{HttpMethod, RequestDraft};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let engine = Engine::new(ExecutionConfig::default())?;
    /// let draft = RequestDraft::new(HttpMethod::GET, "https://api.example.com/users");
    /// let execution = engine.execute(&draft, &CancellationToken::new()).await;
    /// println!("{} in {}ms", execution.response.status, execution.response.time_ms);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute(&self, draft: &RequestDraft, token: &CancellationToken) -> Execution {
        let resolved = ResolvedRequest::from_draft(draft);
        let mut timing = TimingCheckpoints::start();

        log::debug!(
            "executing {} {} (token {})",
            resolved.method,
            resolved.url,
            token.id()
        );

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.perform(&resolved, &mut timing) => Some(result),
        };
        timing.mark_settled();

        let (kind, response, error) = match result {
            Some(Ok(response)) => (ExecutionKind::Completed, response, None),
            Some(Err(err)) => {
                log::warn!("{} {} failed: {}", resolved.method, resolved.url, err);
                let message = failure_message(&err);
                let error = OutcomeError {
                    message: message.clone(),
                    code: Some(err.code().to_string()),
                    details: None,
                };
                let response = ResponseData::synthetic(message, timing.elapsed_ms());
                (ExecutionKind::Failed, response, Some(error))
            }
            None => {
                log::debug!("{} {} cancelled", resolved.method, resolved.url);
                let response = ResponseData::synthetic(CANCELLED_MESSAGE, timing.elapsed_ms());
                (ExecutionKind::Cancelled, response, None)
            }
        };

        log::debug!("{} {}: {}", resolved.method, resolved.url, format_timing_compact(&timing));

        let record = NewOutcomeRecord {
            request: resolved.to_recorded(),
            response: RecordedResponse::from_response(&response),
            metadata: OutcomeMetadata::default(),
            error,
        };

        Execution {
            kind,
            response,
            record,
        }
    }

    async fn perform(
        &self,
        resolved: &ResolvedRequest,
        timing: &mut TimingCheckpoints,
    ) -> Result<ResponseData, RequestError> {
        let url = resolved.parsed_url()?;

        let mut builder = self.client.request(resolved.reqwest_method(), url);
        for (name, value) in resolved.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &resolved.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        timing.mark_headers_received();

        let status = response.status();
        let mut headers = HeaderList::new();
        for (name, value) in response.headers() {
            headers.insert(
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }

        let text = response.text().await?;
        let is_json = headers
            .get_ignore_case("content-type")
            .is_some_and(is_json_content_type);
        let data = if is_json {
            ResponseBody::Json(serde_json::from_str(&text)?)
        } else {
            ResponseBody::Text(text)
        };
        timing.mark_settled();

        Ok(ResponseData {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            data,
            time_ms: timing.elapsed_ms(),
        })
    }
}

/// The body shown for a failed exchange.
fn failure_message(err: &RequestError) -> String {
    let message = err.message();
    if message.is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
