//! Result caching with LRU eviction and single-flight computation

use crate::error::RootsError;
use lru::LruCache;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Mutex as AsyncMutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub computations: u64,
}

/// Bounded cache in which concurrent requests for the same missing key wait
/// on a per-key gate, so each key is computed at most once at a time.
pub struct SingleFlightCache<V> {
    entries: Mutex<LruCache<String, Arc<V>>>,
    in_flight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<V> SingleFlightCache<V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            computations: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        lock(&self.entries).get(key).map(Arc::clone)
    }

    /// Return the cached value for `key`, or run `compute` to produce it.
    ///
    /// Callers arriving while a computation for the same key is running wait
    /// for it and reuse its value. A failed computation stores nothing; the
    /// next waiter then computes on its own.
    pub async fn get_or_try_compute<F, Fut>(&self, key: &str, compute: F) -> Result<Arc<V>, RootsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, RootsError>>,
    {
        if let Some(value) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key, "cache hit");
            return Ok(value);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let gate = {
            let mut in_flight = lock(&self.in_flight);
            Arc::clone(
                in_flight
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };

        let result = {
            let _turn = gate.lock().await;
            if let Some(value) = self.get(key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, "joined in-flight computation");
                Ok(value)
            } else {
                self.computations.fetch_add(1, Ordering::Relaxed);
                match compute().await {
                    Ok(value) => {
                        let value = Arc::new(value);
                        lock(&self.entries).put(key.to_string(), Arc::clone(&value));
                        Ok(value)
                    }
                    Err(err) => Err(err),
                }
            }
        };

        self.release(key, &gate);
        result
    }

    /// Drop the gate once no other caller holds it.
    fn release(&self, key: &str, gate: &Arc<AsyncMutex<()>>) {
        let mut in_flight = lock(&self.in_flight);
        let idle = in_flight
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, gate) && Arc::strong_count(gate) <= 2);
        if idle {
            in_flight.remove(key);
        }
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = lock(&self.entries);
        CacheStats {
            entries: entries.len(),
            capacity: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        lock(&self.in_flight).len()
    }
}
