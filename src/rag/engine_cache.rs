//! Bounded cache of per-session QA engines.
//!
//! Entries are evicted least-recently-used once `capacity` sessions are held.
//! The lock is never held while an engine is being built, so two first
//! requests for one session may both build; the later insert wins.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;

use super::QaEngine;

#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
}

pub struct EngineCache {
    inner: Mutex<Inner>,
}

struct Inner {
    engines: LruCache<String, Arc<QaEngine>>,
    metrics: CacheMetrics,
}

impl EngineCache {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                engines: LruCache::new(capacity),
                metrics: CacheMetrics::default(),
            }),
        }
    }

    pub async fn get(&self, token: &str) -> Option<Arc<QaEngine>> {
        let mut inner = self.inner.lock().await;
        match inner.engines.get(token).cloned() {
            Some(engine) => {
                inner.metrics.hits += 1;
                Some(engine)
            }
            None => {
                inner.metrics.misses += 1;
                None
            }
        }
    }

    pub async fn insert(&self, token: &str, engine: Arc<QaEngine>) {
        let mut inner = self.inner.lock().await;
        if let Some((evicted, _)) = inner.engines.push(token.to_string(), engine) {
            if evicted != token {
                inner.metrics.evictions += 1;
                tracing::debug!("Evicted cached QA engine for {}", evicted);
            }
        }
    }

    pub async fn contains(&self, token: &str) -> bool {
        self.inner.lock().await.engines.contains(token)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.engines.len()
    }

    pub async fn metrics(&self) -> CacheMetrics {
        self.inner.lock().await.metrics.clone()
    }
}
