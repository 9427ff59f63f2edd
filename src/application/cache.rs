//! Read-through SOP cache in front of the derived artifact store.
//!
//! The cache never fronts the source document store: staleness decisions
//! always compare against the authoritative source, so a stale derivation is
//! never masked as fresh.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::foundation::{PortalError, Timestamp};
use crate::domain::sop::DerivedArtifact;
use crate::ports::{DerivedArtifactStore, SourceDocumentStore};

use super::single_flight::SingleFlight;

/// One cached artifact snapshot.
#[derive(Debug, Clone)]
struct CacheEntry {
    artifact: DerivedArtifact,
    inserted_at: Instant,
}

/// Point-in-time snapshot of cache accounting.
///
/// `cache_hits`/`cache_misses` are cumulative and only ever increase;
/// `total_sops` is the count of entries currently held.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_sops: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<Timestamp>,
    pub memory_usage_mb: f64,
}

impl CacheStats {
    /// Hit rate as a whole percent; 0 before any access.
    pub fn hit_rate_percent(&self) -> u32 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            return 0;
        }
        ((self.cache_hits as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Read-through cache of derived artifacts with TTL expiry.
pub struct SopCache {
    artifacts: Arc<dyn DerivedArtifactStore>,
    sources: Arc<dyn SourceDocumentStore>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    last_refresh: RwLock<Option<Timestamp>>,
    ready: AtomicBool,
    flights: SingleFlight,
}

impl SopCache {
    pub fn new(
        artifacts: Arc<dyn DerivedArtifactStore>,
        sources: Arc<dyn SourceDocumentStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            artifacts,
            sources,
            ttl,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            last_refresh: RwLock::new(None),
            ready: AtomicBool::new(false),
            flights: SingleFlight::new(),
        }
    }

    /// Get the artifact for `sop_id`, reading through to the store on miss.
    ///
    /// A present, unexpired entry counts a hit. Anything else counts a miss,
    /// fetches from the backing store, populates the entry, and returns the
    /// (possibly absent) result. Concurrent misses for the same key coalesce
    /// into one store fetch.
    pub async fn get(&self, sop_id: &str) -> Result<Option<DerivedArtifact>, PortalError> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(sop_id) {
                if entry.inserted_at.elapsed() < self.ttl {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(Some(entry.artifact.clone()));
                }
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let _flight = self.flights.acquire(sop_id).await;

        // A coalesced miss may find the entry freshly populated.
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(sop_id) {
                if entry.inserted_at.elapsed() < self.ttl {
                    return Ok(Some(entry.artifact.clone()));
                }
            }
        }

        debug!(sop_id, "cache miss, fetching from artifact store");
        let fetched = self.artifacts.find_by_sop_id(sop_id).await?;
        if let Some(artifact) = &fetched {
            self.entries.write().await.insert(
                sop_id.to_string(),
                CacheEntry {
                    artifact: artifact.clone(),
                    inserted_at: Instant::now(),
                },
            );
        }
        Ok(fetched)
    }

    /// Replace the entry for an artifact that was just written.
    pub async fn insert(&self, artifact: DerivedArtifact) {
        self.entries.write().await.insert(
            artifact.sop_id.clone(),
            CacheEntry {
                artifact,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop the entry for `sop_id`; the next `get` is a forced miss.
    pub async fn invalidate(&self, sop_id: &str) {
        self.entries.write().await.remove(sop_id);
    }

    /// Fully repopulate from the artifact store for all active documents.
    ///
    /// Marks the cache ready and stamps `last_refresh`.
    pub async fn refresh_all(&self) -> Result<(), PortalError> {
        let active = self.sources.list_active().await?;
        let mut fresh = HashMap::with_capacity(active.len());
        for doc in &active {
            if let Some(artifact) = self.artifacts.find_by_sop_id(doc.sop_id()).await? {
                fresh.insert(
                    artifact.sop_id.clone(),
                    CacheEntry {
                        artifact,
                        inserted_at: Instant::now(),
                    },
                );
            }
        }

        let loaded = fresh.len();
        *self.entries.write().await = fresh;
        *self.last_refresh.write().await = Some(Timestamp::now());
        self.ready.store(true, Ordering::Release);
        info!(active = active.len(), loaded, "cache refreshed");
        Ok(())
    }

    /// Read-only snapshot of cache accounting.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let bytes: usize = entries
            .values()
            .map(|e| e.artifact.approx_size_bytes())
            .sum();
        CacheStats {
            total_sops: entries.len(),
            cache_hits: self.hits.load(Ordering::Relaxed),
            cache_misses: self.misses.load(Ordering::Relaxed),
            last_refresh: *self.last_refresh.read().await,
            memory_usage_mb: bytes as f64 / (1024.0 * 1024.0),
        }
    }

    /// True once at least one full population has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

/// Run `refresh_all` on a fixed interval until the handle is aborted.
pub fn spawn_refresh_scheduler(cache: Arc<SopCache>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // An interval's first tick fires immediately; that gives the cache
        // its initial population.
        loop {
            ticker.tick().await;
            if let Err(error) = cache.refresh_all().await {
                warn!(%error, "scheduled cache refresh failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::adapters::memory::{InMemoryDerivedArtifactStore, InMemorySourceDocumentStore};
    use crate::domain::sop::SourceDocument;
    use crate::ports::DerivedArtifactStore as _;

    fn artifact(sop_id: &str) -> DerivedArtifact {
        DerivedArtifact {
            sop_id: sop_id.to_string(),
            source_version: 1,
            title: "T".to_string(),
            summary: "S".to_string(),
            keywords: BTreeSet::new(),
            body: "B".to_string(),
            last_synced_at: Timestamp::now(),
        }
    }

    async fn cache_with(
        artifacts: &[DerivedArtifact],
        documents: &[SourceDocument],
        ttl: Duration,
    ) -> SopCache {
        let artifact_store = InMemoryDerivedArtifactStore::new();
        for a in artifacts {
            artifact_store.upsert(a.clone()).await.unwrap();
        }
        let source_store = InMemorySourceDocumentStore::new();
        source_store.seed(documents.iter().cloned()).await;
        SopCache::new(Arc::new(artifact_store), Arc::new(source_store), ttl)
    }

    #[tokio::test]
    async fn miss_populates_then_hits() {
        let cache = cache_with(&[artifact("SOP-1")], &[], Duration::from_secs(60)).await;

        assert!(cache.get("SOP-1").await.unwrap().is_some());
        assert!(cache.get("SOP-1").await.unwrap().is_some());

        let stats = cache.stats().await;
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.total_sops, 1);
    }

    #[tokio::test]
    async fn absent_artifact_counts_a_miss_and_returns_none() {
        let cache = cache_with(&[], &[], Duration::from_secs(60)).await;

        assert!(cache.get("SOP-X").await.unwrap().is_none());
        assert!(cache.get("SOP-X").await.unwrap().is_none());

        let stats = cache.stats().await;
        assert_eq!(stats.cache_misses, 2);
        assert_eq!(stats.cache_hits, 0);
    }

    #[tokio::test]
    async fn three_hits_one_miss_is_seventy_five_percent() {
        let cache = cache_with(&[artifact("SOP-1")], &[], Duration::from_secs(60)).await;

        cache.get("SOP-1").await.unwrap(); // miss
        cache.get("SOP-1").await.unwrap(); // hit
        cache.get("SOP-1").await.unwrap(); // hit
        cache.get("SOP-1").await.unwrap(); // hit

        assert_eq!(cache.stats().await.hit_rate_percent(), 75);
    }

    #[tokio::test]
    async fn hit_rate_is_zero_before_any_access() {
        let cache = cache_with(&[], &[], Duration::from_secs(60)).await;
        assert_eq!(cache.stats().await.hit_rate_percent(), 0);
    }

    #[tokio::test]
    async fn invalidate_forces_a_miss_even_when_store_is_unchanged() {
        let cache = cache_with(&[artifact("SOP-1")], &[], Duration::from_secs(60)).await;

        cache.get("SOP-1").await.unwrap(); // miss
        cache.get("SOP-1").await.unwrap(); // hit
        cache.invalidate("SOP-1").await;
        cache.get("SOP-1").await.unwrap(); // miss again

        let stats = cache.stats().await;
        assert_eq!(stats.cache_misses, 2);
        assert_eq!(stats.cache_hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_counts_as_miss() {
        let cache = cache_with(&[artifact("SOP-1")], &[], Duration::from_secs(10)).await;

        cache.get("SOP-1").await.unwrap(); // miss, populates
        tokio::time::advance(Duration::from_secs(11)).await;
        cache.get("SOP-1").await.unwrap(); // expired -> miss

        let stats = cache.stats().await;
        assert_eq!(stats.cache_misses, 2);
        assert_eq!(stats.cache_hits, 0);
    }

    #[tokio::test]
    async fn refresh_all_populates_active_documents_and_marks_ready() {
        let doc = SourceDocument::new("SOP-1", 1, "Title", "Body").unwrap();
        let cache = cache_with(
            &[artifact("SOP-1"), artifact("SOP-ORPHAN")],
            std::slice::from_ref(&doc),
            Duration::from_secs(60),
        )
        .await;

        assert!(!cache.is_ready());
        cache.refresh_all().await.unwrap();

        assert!(cache.is_ready());
        let stats = cache.stats().await;
        assert_eq!(stats.total_sops, 1);
        assert!(stats.last_refresh.is_some());
    }

    #[tokio::test]
    async fn refresh_all_does_not_count_hits_or_misses() {
        let doc = SourceDocument::new("SOP-1", 1, "Title", "Body").unwrap();
        let cache = cache_with(
            &[artifact("SOP-1")],
            std::slice::from_ref(&doc),
            Duration::from_secs(60),
        )
        .await;

        cache.refresh_all().await.unwrap();

        let stats = cache.stats().await;
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.cache_misses, 0);
    }

    #[tokio::test]
    async fn insert_makes_next_get_a_hit() {
        let cache = cache_with(&[], &[], Duration::from_secs(60)).await;
        cache.insert(artifact("SOP-1")).await;

        assert!(cache.get("SOP-1").await.unwrap().is_some());
        assert_eq!(cache.stats().await.cache_hits, 1);
    }

    #[tokio::test]
    async fn memory_usage_reflects_entry_sizes() {
        let cache = cache_with(&[], &[], Duration::from_secs(60)).await;
        cache.insert(artifact("SOP-1")).await;

        let stats = cache.stats().await;
        assert!(stats.memory_usage_mb > 0.0);
        assert!(stats.memory_usage_mb < 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_refreshes_on_interval() {
        let doc = SourceDocument::new("SOP-1", 1, "Title", "Body").unwrap();
        let cache = Arc::new(
            cache_with(
                &[artifact("SOP-1")],
                std::slice::from_ref(&doc),
                Duration::from_secs(60),
            )
            .await,
        );

        let handle = spawn_refresh_scheduler(Arc::clone(&cache), Duration::from_secs(30));
        // Let the scheduler task run its immediate first tick.
        tokio::task::yield_now().await;
        assert!(cache.is_ready());

        let first_refresh = cache.stats().await.last_refresh.unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;
        // Let the scheduler task run its tick.
        tokio::task::yield_now().await;
        let second_refresh = cache.stats().await.last_refresh.unwrap();
        assert!(!second_refresh.is_before(&first_refresh));

        handle.abort();
    }
}
