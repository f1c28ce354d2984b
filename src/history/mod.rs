//! Outcome history.
//!
//! Every execution attempt, whether it completed, failed or was cancelled, is
//! recorded as an [`OutcomeRecord`] in a newest-first log capped at
//! [`HISTORY_CAPACITY`] entries.

pub mod models;
pub mod search;
pub mod store;
pub mod ui;

pub use models::{
    generate_history_id, HistoryError, NewOutcomeRecord, OutcomeError, OutcomeMetadata,
    OutcomeRecord, RecordedRequest, RecordedResponse, HISTORY_CAPACITY,
};
pub use search::{filter_history, HistoryFilter};
pub use store::HistoryStore;
pub use ui::{format_history_details, format_history_entry, format_history_list};
