use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::llm_client::ChatBackend;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable chat backend. Production: GroqClient; tests swap in scripted stubs.
    pub backend: Arc<dyn ChatBackend>,
    /// Bounded response caches for extraction, completions and keyword reports.
    pub responses: Arc<ResponseCache>,
    /// In-memory session store with idle expiry.
    pub sessions: Arc<SessionStore>,
}
