//! Cooperative cancellation for in-flight executions.
//!
//! A [`CancellationToken`] is handed to the engine for a single execution. The
//! engine races the network call against [`CancellationToken::cancelled`];
//! triggering the token makes the engine stop waiting and synthesize a
//! cancelled outcome. The transport may keep running in the background, but
//! nothing it produces afterwards is observed.
//!
//! [`ExecutionTracker`] records the tokens of executions that have not settled
//! yet, in start order, so a controller can cancel them on demand.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken as SignalToken;
use uuid::Uuid;

/// Trigger/observe handle for one execution.
///
/// Clones share state: cancelling any clone cancels them all.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    id: String,
    signal: SignalToken,
    triggered: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an untriggered token with a generated id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Creates an untriggered token with a specific id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            signal: SignalToken::new(),
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Triggers the token.
    ///
    /// Idempotent: returns `true` only for the call that flipped the state.
    pub fn cancel(&self) -> bool {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.signal.cancel();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }

    /// Completes once the token has been triggered.
    ///
    /// Resolves immediately if it already was.
    pub async fn cancelled(&self) {
        self.signal.cancelled().await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokens of executions that have started but not yet settled.
///
/// Entries are keyed by a caller-assigned sequence number and kept in start
/// order.
#[derive(Debug, Default)]
pub struct ExecutionTracker {
    active: Vec<(u64, CancellationToken)>,
}

impl ExecutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking an execution.
    pub fn register(&mut self, seq: u64, token: CancellationToken) {
        self.active.push((seq, token));
    }

    /// Stops tracking an execution once it settles.
    ///
    /// Returns `false` if it was not tracked.
    pub fn unregister(&mut self, seq: u64) -> bool {
        match self.active.iter().position(|(s, _)| *s == seq) {
            Some(pos) => {
                self.active.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Triggers every tracked token, returning how many flipped state.
    ///
    /// Tokens stay tracked until their execution settles and unregisters.
    pub fn cancel_all(&self) -> usize {
        self.active
            .iter()
            .filter(|(_, token)| token.cancel())
            .count()
    }

    /// Triggers every tracked token started before `seq`.
    pub fn cancel_before(&self, seq: u64) -> usize {
        self.active
            .iter()
            .filter(|(s, token)| *s < seq && token.cancel())
            .count()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, seq: u64) -> bool {
        self.active.iter().any(|(s, _)| *s == seq)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Sequence number of the most recently started execution still in flight.
    pub fn latest(&self) -> Option<u64> {
        self.active.last().map(|(s, _)| *s)
    }
}
