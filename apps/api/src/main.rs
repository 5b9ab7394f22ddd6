mod analysis;
mod cache;
mod config;
mod errors;
mod extract;
mod llm_client;
mod routes;
mod session;
mod state;
#[cfg(test)]
mod testutil;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::llm_client::GroqClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS scanner API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the chat backend
    let backend = Arc::new(GroqClient::new(config.groq_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize response caches and the session store
    let responses = Arc::new(ResponseCache::new(
        config.cache_capacity,
        config.cache_ttl_secs.map(Duration::from_secs),
    ));
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        config.session_idle_secs,
    )));
    info!(
        "Caches ready (capacity: {}, ttl: {:?}s, session idle: {}s)",
        config.cache_capacity, config.cache_ttl_secs, config.session_idle_secs
    );

    // Build app state
    let state = AppState {
        backend,
        responses,
        sessions,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
