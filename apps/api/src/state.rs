use std::sync::Arc;

use crate::llm_client::GeminiClient;
use crate::storage::Repository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Typed facade over the key/value store; the only persistence path.
    pub repo: Repository,
    pub llm: Arc<GeminiClient>,
}
