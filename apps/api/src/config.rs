use anyhow::{Context, Result};
use std::str::FromStr;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Max entries per response cache (extraction, completion, keywords).
    pub cache_capacity: u64,
    /// Optional TTL for response-cache entries. Unset: entries live for
    /// the process lifetime, bounded only by capacity.
    pub cache_ttl_secs: Option<u64>,
    /// Sessions expire after this many seconds without being touched.
    pub session_idle_secs: u64,
    /// Upper bound on the multipart upload body.
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cache_capacity: parse_env("CACHE_CAPACITY", 1024)?,
            cache_ttl_secs: parse_env_opt("CACHE_TTL_SECS")?,
            session_idle_secs: parse_env("SESSION_IDLE_SECS", 1800)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(default),
    }
}

fn parse_env_opt<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(None),
    }
}
