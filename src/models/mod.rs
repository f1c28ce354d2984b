//! Data models for drafts, responses and saved requests.
//!
//! This module contains the core data structures shared by the executor,
//! the history store and the session controller.

pub mod collection;
pub mod headers;
pub mod request;
pub mod response;

pub use collection::{find_saved_request, Collection, SavedRequest};
pub use headers::HeaderList;
pub use request::{Header, HttpMethod, RequestDraft};
pub use response::{ResponseBody, ResponseData, CANCELLED_MESSAGE, UNKNOWN_ERROR_MESSAGE};
