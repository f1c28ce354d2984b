use crate::executor::ExecutionKind;
use crate::history::HistoryError;
use crate::models::ResponseData;
use crate::storage::StorageError;
use std::fmt;

/// Errors surfaced by the session controller.
#[derive(Debug)]
pub enum SessionError {
    /// The draft URL is empty after trimming. Nothing was sent or recorded.
    EmptyUrl,

    /// A send is already in flight and the policy refuses another.
    Busy,

    /// The session has been torn down.
    TornDown,

    /// No saved request matches the selection.
    SavedRequestNotFound {
        collection_id: String,
        request_id: String,
    },

    /// The send settled and its response was published, but recording it
    /// in history failed.
    HistoryWrite {
        kind: ExecutionKind,
        response: Box<ResponseData>,
        source: HistoryError,
    },

    /// Persisting a setting failed.
    Storage(StorageError),

    /// The send task panicked or was aborted.
    TaskFailed(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyUrl => write!(f, "Please enter a URL"),
            SessionError::Busy => write!(f, "A request is already in progress"),
            SessionError::TornDown => write!(f, "Session has been closed"),
            SessionError::SavedRequestNotFound {
                collection_id,
                request_id,
            } => write!(
                f,
                "Saved request {} not found in collection {}",
                request_id, collection_id
            ),
            SessionError::HistoryWrite { source, .. } => {
                write!(f, "Failed to record request in history: {}", source)
            }
            SessionError::Storage(err) => write!(f, "Failed to save settings: {}", err),
            SessionError::TaskFailed(msg) => write!(f, "Request task failed: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::HistoryWrite { source, .. } => Some(source),
            SessionError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        SessionError::Storage(err)
    }
}
