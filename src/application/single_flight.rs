//! Keyed async locks for single-flight execution.
//!
//! The regeneration pipeline uses one lock per `sop_id` so at most one
//! derivation runs per document; the cache reuses the same structure to
//! coalesce concurrent misses into one store fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A map of per-key async mutexes.
///
/// Late arrivals wait on the key's lock rather than being rejected; callers
/// are expected to re-check their preconditions after acquiring, so a
/// completed flight is observed instead of repeated.
#[derive(Debug, Default)]
pub struct SingleFlight {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting if a flight is in progress.
    ///
    /// The returned guard releases the key on drop. The map entry is kept so
    /// repeated flights for the same key reuse one mutex; the map is bounded
    /// by the number of distinct keys (documents), not by call volume.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            Arc::clone(
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_key_serializes_execution() {
        let flights = Arc::new(SingleFlight::new());
        let concurrent = Arc::new(AtomicU32::new(0));
        let peak = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let flights = Arc::clone(&flights);
            let concurrent = Arc::clone(&concurrent);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                let _guard = flights.acquire("SOP-1").await;
                let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                concurrent.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_keys_run_concurrently() {
        let flights = Arc::new(SingleFlight::new());

        let guard_a = flights.acquire("SOP-A").await;
        // Must not deadlock while SOP-A is held.
        let guard_b = flights.acquire("SOP-B").await;

        drop(guard_a);
        drop(guard_b);
    }

    #[tokio::test]
    async fn released_key_can_be_reacquired() {
        let flights = SingleFlight::new();
        drop(flights.acquire("SOP-1").await);
        drop(flights.acquire("SOP-1").await);
    }
}
