//! REST request composer.
//!
//! Build an HTTP request (method, URL, headers, authorization, body), send it,
//! cancel it, inspect the response, and recall it later from a persisted
//! history log.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - **models**: Drafts, responses, the ordered header map, saved collections
//! - **auth**: Authorization settings and the derived `Authorization` header
//! - **executor**: The execution engine, cancellation tokens and timing
//! - **history**: The capacity-bounded outcome log, filtering and formatting
//! - **storage**: Keyed JSON persistence for collections, history and settings
//! - **session**: The controller tying drafts, sends, display and history together
//! - **config**: Global settings loaded from a JSON settings document
//!
//! # Request lifecycle
//!
//! 1. The session controller snapshots the current [`RequestDraft`](models::RequestDraft)
//!    and refuses it if the URL is blank
//! 2. A fresh [`CancellationToken`](executor::CancellationToken) is created and
//!    the [`Engine`](executor::Engine) executes the draft under it
//! 3. Success, transport failure and cancellation all settle into a response
//!    (failures and cancellations carry status `0` and a message body)
//! 4. The response is published for display and the outcome is appended to the
//!    [`HistoryStore`](history::HistoryStore), which keeps the newest 100
//!
//! # Example
//!
//! ```no_run
//! use rest_composer::config::ConcurrentSendPolicy;
//! use rest_composer::executor::{Engine, ExecutionConfig};
//! use rest_composer::models::{HttpMethod, RequestDraft};
//! use rest_composer::session::SessionController;
//! use rest_composer::storage::FileStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::new(ExecutionConfig::default())?;
//! let backend = Arc::new(FileStore::open_default()?);
//! let session = SessionController::open(engine, backend, ConcurrentSendPolicy::default()).await;
//!
//! let outcome = session
//!     .send(RequestDraft::new(HttpMethod::GET, "https://api.example.com/users"))
//!     .await?;
//! println!("{} in {}ms", outcome.response.status, outcome.response.time_ms);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod executor;
pub mod history;
pub mod models;
pub mod session;
pub mod storage;

pub use executor::{CancellationToken, Engine, Execution, ExecutionKind};
pub use history::{HistoryFilter, HistoryStore, OutcomeRecord};
pub use models::{RequestDraft, ResponseData};
pub use session::{SessionController, SessionError};
