use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::keywords::KeywordReport;
use crate::extract::{ExtractError, Extraction};
use crate::llm_client::LlmError;

/// Response caches for the expensive stages of the pipeline.
///
/// Three independent caches with disjoint key namespaces: PDF text
/// extraction, free-text completions, and parsed keyword reports. Each is
/// bounded by `capacity` and optionally expires entries after `ttl`.
/// Lookups go through `try_get_with`, so concurrent requests for the same
/// key run the initializer once and failures are never stored.
pub struct ResponseCache {
    extractions: Cache<String, Arc<Extraction>>,
    completions: Cache<String, Arc<String>>,
    keywords: Cache<String, Arc<KeywordReport>>,
}

impl ResponseCache {
    pub fn new(capacity: u64, ttl: Option<Duration>) -> Self {
        Self {
            extractions: build_cache(capacity, ttl),
            completions: build_cache(capacity, ttl),
            keywords: build_cache(capacity, ttl),
        }
    }

    /// Key namespace: `pdf:` + the upload fingerprint.
    pub fn extraction_key(fingerprint: &str) -> String {
        format!("pdf:{fingerprint}")
    }

    /// Key namespace: `chat:` + hash of the template, resume and JD.
    pub fn completion_key(parts: &[&str]) -> String {
        hashed_key("chat", parts)
    }

    /// Key namespace: `kw:` + hash of the template, resume and JD.
    pub fn keywords_key(parts: &[&str]) -> String {
        hashed_key("kw", parts)
    }

    pub async fn extraction<F>(
        &self,
        key: String,
        init: F,
    ) -> Result<Arc<Extraction>, Arc<ExtractError>>
    where
        F: Future<Output = Result<Arc<Extraction>, ExtractError>>,
    {
        self.extractions.try_get_with(key, init).await
    }

    pub async fn completion<F>(&self, key: String, init: F) -> Result<Arc<String>, Arc<LlmError>>
    where
        F: Future<Output = Result<Arc<String>, LlmError>>,
    {
        self.completions.try_get_with(key, init).await
    }

    pub async fn keyword_report<F>(
        &self,
        key: String,
        init: F,
    ) -> Result<Arc<KeywordReport>, Arc<LlmError>>
    where
        F: Future<Output = Result<Arc<KeywordReport>, LlmError>>,
    {
        self.keywords.try_get_with(key, init).await
    }
}

/// SHA-256 of raw upload bytes, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn build_cache<V>(capacity: u64, ttl: Option<Duration>) -> Cache<String, V>
where
    V: Clone + Send + Sync + 'static,
{
    let mut builder = Cache::builder().max_capacity(capacity);
    if let Some(ttl) = ttl {
        builder = builder.time_to_live(ttl);
    }
    builder.build()
}

/// Parts are length-prefixed before hashing so adjacent parts can never
/// collide ("ab" + "c" hashes differently from "a" + "bc").
fn hashed_key(namespace: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    format!("{namespace}:{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_keys_are_stable_and_hex_encoded() {
        let a = ResponseCache::completion_key(&["review", "resume text", "jd text"]);
        let b = ResponseCache::completion_key(&["review", "resume text", "jd text"]);
        assert_eq!(a, b);
        let digest = a.strip_prefix("chat:").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_namespaces_keep_key_spaces_disjoint() {
        let chat = ResponseCache::completion_key(&["resume", "jd"]);
        let kw = ResponseCache::keywords_key(&["resume", "jd"]);
        assert_ne!(chat, kw);
    }

    #[test]
    fn test_part_boundaries_change_the_key() {
        let left = ResponseCache::completion_key(&["ab", "c"]);
        let right = ResponseCache::completion_key(&["a", "bc"]);
        assert_ne!(left, right);
    }

    #[tokio::test]
    async fn test_completion_initializer_runs_once_per_key() {
        let cache = ResponseCache::new(16, None);
        let calls = AtomicUsize::new(0);
        let key = ResponseCache::completion_key(&["review", "r", "jd"]);

        for _ in 0..3 {
            let value = cache
                .completion(key.clone(), async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new("verdict".to_string()))
                })
                .await
                .unwrap();
            assert_eq!(*value, "verdict");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_initializer_is_not_cached() {
        let cache = ResponseCache::new(16, None);
        let calls = AtomicUsize::new(0);
        let key = ResponseCache::completion_key(&["review", "r", "jd"]);

        let err = cache
            .completion(key.clone(), async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::EmptyContent)
            })
            .await
            .unwrap_err();
        assert!(matches!(*err, LlmError::EmptyContent));

        let value = cache
            .completion(key.clone(), async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new("recovered".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(*value, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
