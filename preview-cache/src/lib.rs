//! Keyed TTL cache with per-key single-flight.
//!
//! Concurrent callers of [`TtlCache::get_or_try_compute`] with the same key
//! share one in-flight computation: one caller becomes the leader and runs
//! the future, the rest wait and read the published entry. Entries are
//! published atomically per key; a partially-computed value is never
//! visible. If the leader's future is dropped (request cancellation), its
//! slot is released and the next waiter takes over.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

/// SHA-256 fingerprint over the given parts, hex-encoded.
///
/// Parts are length-prefixed before hashing so that moving a boundary
/// between adjacent parts always changes the digest.
pub fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

struct Ready<V> {
    value: V,
    expires: Instant,
}

/// Async TTL cache keyed by string, with single-flight computation.
pub struct TtlCache<V> {
    ttl: Duration,
    ready: Mutex<HashMap<String, Ready<V>>>,
    flights: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            ready: Mutex::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a fresh entry.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut ready = self.ready.lock().unwrap();
        match ready.get(key) {
            Some(entry) if entry.expires > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                ready.remove(key);
                None
            }
            None => None,
        }
    }

    /// Publish a value under `key`, replacing any previous entry.
    pub fn insert(&self, key: &str, value: V) {
        let mut ready = self.ready.lock().unwrap();
        ready.insert(
            key.to_string(),
            Ready {
                value,
                expires: Instant::now() + self.ttl,
            },
        );
    }

    /// Return the cached value for `key`, or run `make()` to compute it.
    ///
    /// At most one computation per key is in flight at a time; concurrent
    /// callers wait for the leader and then read the published entry. A
    /// leader that fails publishes nothing, and the next waiter retries
    /// with its own computation.
    pub async fn get_or_try_compute<F, Fut, E>(&self, key: &str, make: F) -> Result<V, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let flight = {
            let mut flights = self.flights.lock().unwrap();
            flights
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        // Whoever wins this lock is the leader; a waiter whose leader
        // failed (or was cancelled) takes over with its own computation.
        let _leader = flight.lock().await;

        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let outcome = make().await;

        if let Ok(value) = &outcome {
            self.insert(key, value.clone());
        }
        {
            let mut flights = self.flights.lock().unwrap();
            flights.remove(key);
        }
        outcome
    }

    /// Drop every entry, fresh or stale.
    pub fn clear(&self) {
        self.ready.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn fingerprint_is_boundary_sensitive() {
        assert_ne!(fingerprint(&["ab", "c"]), fingerprint(&["a", "bc"]));
        assert_eq!(fingerprint(&["a", "b"]), fingerprint(&["a", "b"]));
    }

    #[tokio::test]
    async fn hit_within_ttl_miss_after() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_millis(40));
        cache.insert("k", 7);
        assert_eq!(cache.get("k"), Some(7));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test]
    async fn single_flight_shares_one_computation() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let computed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let computed = computed.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_try_compute("k", || {
                        let computed = computed.clone();
                        async move {
                            computed.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, Infallible>(42)
                        }
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(computed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_leader_publishes_nothing() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        let out: Result<u32, &str> = cache.get_or_try_compute("k", || async { Err("boom") }).await;
        assert!(out.is_err());
        assert_eq!(cache.get("k"), None);

        // The slot is free again for the next caller.
        let out: Result<u32, &str> = cache.get_or_try_compute("k", || async { Ok(5) }).await;
        assert_eq!(out.unwrap(), 5);
        assert_eq!(cache.get("k"), Some(5));
    }
}
