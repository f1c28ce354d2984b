//! Integration tests module for REST Composer
//!
//! Shared setup for workflow tests: a logger, an engine with a short timeout
//! and sessions over in-memory or file-backed storage.

pub mod cancellation_test;
pub mod history_workflow_test;
pub mod resolution_properties_test;
pub mod send_workflow_test;

use rest_composer::config::ConcurrentSendPolicy;
use rest_composer::executor::{Engine, ExecutionConfig};
use rest_composer::storage::MemoryStore;
use rest_composer::SessionController;
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Engine with a timeout well above any mock delay used in the tests.
pub fn test_engine() -> Engine {
    Engine::new(ExecutionConfig::new(Duration::from_secs(10))).expect("Failed to build engine")
}

/// Session over a fresh in-memory store.
pub async fn memory_session(
    policy: ConcurrentSendPolicy,
) -> (SessionController<MemoryStore>, Arc<MemoryStore>) {
    init_test_env();
    let backend = Arc::new(MemoryStore::new());
    let session = SessionController::open(test_engine(), Arc::clone(&backend), policy).await;
    (session, backend)
}
