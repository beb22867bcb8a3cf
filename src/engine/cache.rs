//! Bounded memoization of `reason` results.

use std::future::Future;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::debug;

use super::types::{ReasoningRequest, ReasoningResult};
use crate::config::CacheConfig;
use crate::strategies::StrategyKind;

#[derive(Debug, Clone)]
struct CacheEntry {
    inserted_at: Instant,
    result: ReasoningResult,
}

/// LRU cache of reasoning results keyed by a content hash of the request.
///
/// The lock is released while a result is computed, so two concurrent
/// misses on the same key both compute and the last write wins.
pub struct ReasoningCache {
    entries: Option<Mutex<LruCache<String, CacheEntry>>>,
    ttl: Option<Duration>,
}

impl ReasoningCache {
    /// Create a cache holding at most `capacity` results.
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Some(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            entries: None,
            ttl: None,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::new(config.capacity, config.ttl_secs.map(Duration::from_secs))
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// SHA-256 over the canonical JSON of every input that affects the result.
    pub fn key_for(request: &ReasoningRequest, strategy: StrategyKind) -> String {
        // serde_json maps are sorted, so the serialization is canonical
        let material = json!({
            "context": request.context,
            "question": request.question,
            "evidence": request.evidence,
            "reasoning_type": request.reasoning_type,
            "max_depth": request.max_depth,
            "strategy": strategy,
        });

        Sha256::digest(material.to_string().as_bytes())
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }

    /// Cached result for `key`, dropping it if it has expired.
    pub async fn get(&self, key: &str) -> Option<ReasoningResult> {
        let mut entries = self.entries.as_ref()?.lock().await;
        let expired = match entries.get(key) {
            Some(entry) => self
                .ttl
                .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl),
            None => return None,
        };

        if expired {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|entry| entry.result.clone())
    }

    pub async fn insert(&self, key: String, result: ReasoningResult) {
        if let Some(entries) = &self.entries {
            entries.lock().await.put(
                key,
                CacheEntry {
                    inserted_at: Instant::now(),
                    result,
                },
            );
        }
    }

    /// Return the cached result for `key`, or run `compute` and store its output.
    pub async fn get_or_compute<F>(&self, key: &str, compute: F) -> (ReasoningResult, bool)
    where
        F: Future<Output = ReasoningResult>,
    {
        if let Some(hit) = self.get(key).await {
            debug!(key, "Reasoning cache hit");
            return (hit, true);
        }

        let result = compute.await;
        self.insert(key.to_string(), result.clone()).await;
        (result, false)
    }

    pub async fn clear(&self) {
        if let Some(entries) = &self.entries {
            entries.lock().await.clear();
        }
    }

    pub async fn len(&self) -> usize {
        match &self.entries {
            Some(entries) => entries.lock().await.len(),
            None => 0,
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ReasoningCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl std::fmt::Debug for ReasoningCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasoningCache")
            .field("enabled", &self.is_enabled())
            .field("ttl", &self.ttl)
            .finish()
    }
}
