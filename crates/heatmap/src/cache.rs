use crate::aggregate::build_heatmap;
use crate::model::HeatmapSnapshot;
use chrono_tz::Tz;
use parkpulse_store::{ObservationStore, StoreError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Process-wide cache of the last computed heatmap.
///
/// Two states: empty, or populated with a snapshot and its computation
/// time. A `get` within the freshness window returns the shared snapshot
/// without touching the store; otherwise the store is rescanned and the
/// entry is replaced wholesale. Snapshots are handed out behind an `Arc`,
/// so readers never see a half-built aggregate, and a failed rescan
/// leaves the previous entry untouched.
///
/// Concurrent misses may each rescan; the recomputation is idempotent
/// and read-only on the store, so the redundant work is tolerated rather
/// than coordinated.
pub struct HeatmapCache {
    store: Arc<dyn ObservationStore>,
    zone: Tz,
    freshness: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

struct CacheEntry {
    snapshot: Arc<HeatmapSnapshot>,
    computed_at: Instant,
}

impl HeatmapCache {
    #[must_use]
    pub fn new(store: Arc<dyn ObservationStore>, zone: Tz, freshness: Duration) -> Self {
        Self {
            store,
            zone,
            freshness,
            entry: RwLock::new(None),
        }
    }

    /// Returns the current heatmap, rescanning the store only when the
    /// cached snapshot is missing or older than the freshness window.
    ///
    /// # Errors
    /// Returns `StoreError` if the rescan fails; nothing is cached then.
    pub async fn get(&self) -> Result<Arc<HeatmapSnapshot>, StoreError> {
        if let Some(entry) = self.entry.read().await.as_ref() {
            if entry.computed_at.elapsed() < self.freshness {
                tracing::debug!("heatmap cache hit");
                return Ok(Arc::clone(&entry.snapshot));
            }
        }

        tracing::debug!("heatmap cache miss, rescanning store");
        let observations = self.store.scan_all().await?;
        let snapshot = Arc::new(build_heatmap(&observations, self.zone));
        if snapshot.skipped > 0 {
            tracing::warn!(
                "heatmap rebuild skipped {} malformed observation(s)",
                snapshot.skipped
            );
        }
        tracing::info!(
            "heatmap rebuilt from {} observation(s) across {} lot(s)",
            observations.len(),
            snapshot.lots.len()
        );

        *self.entry.write().await = Some(CacheEntry {
            snapshot: Arc::clone(&snapshot),
            computed_at: Instant::now(),
        });

        Ok(snapshot)
    }

    /// Drops the cached snapshot so the next `get` rescans. Test hook.
    pub async fn clear(&self) {
        *self.entry.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parkpulse_store::{
        MemoryObservationStore, NewObservation, Observation, ObservationPage,
    };
    use chrono_tz::Asia::Jerusalem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Delegates to an in-memory store while counting scan starts.
    struct CountingStore {
        inner: MemoryObservationStore,
        scans: AtomicUsize,
        fail_first_scans: AtomicUsize,
    }

    impl CountingStore {
        fn seeded(rows: Vec<Observation>) -> Self {
            Self {
                inner: MemoryObservationStore::seeded(rows, 2),
                scans: AtomicUsize::new(0),
                fail_first_scans: AtomicUsize::new(0),
            }
        }

        fn scans(&self) -> usize {
            self.scans.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObservationStore for CountingStore {
        async fn append(&self, new: NewObservation) -> Result<Observation, StoreError> {
            self.inner.append(new).await
        }

        async fn fetch_page(&self, cursor: Option<String>) -> Result<ObservationPage, StoreError> {
            if cursor.is_none() {
                self.scans.fetch_add(1, Ordering::SeqCst);
                if self.fail_first_scans.load(Ordering::SeqCst) > 0 {
                    self.fail_first_scans.fetch_sub(1, Ordering::SeqCst);
                    return Err(StoreError::Scan("store unavailable".to_string()));
                }
            }
            self.inner.fetch_page(cursor).await
        }
    }

    fn observation(uuid: &str) -> Observation {
        Observation {
            uuid: uuid.to_string(),
            timestamp: "2025-01-05T08:10:00+00:00".to_string(),
            url: "https://example.com/lot?ID=1".to_string(),
            lot_name: "Central".to_string(),
            is_full: true,
            image_src: None,
        }
    }

    #[tokio::test]
    async fn second_get_within_window_reuses_the_snapshot() {
        let store = Arc::new(CountingStore::seeded(vec![
            observation("a"),
            observation("b"),
            observation("c"),
        ]));
        let cache = HeatmapCache::new(store.clone(), Jerusalem, Duration::from_secs(300));

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.scans(), 1);
    }

    #[tokio::test]
    async fn stale_entry_triggers_exactly_one_rescan() {
        let store = Arc::new(CountingStore::seeded(vec![observation("a")]));
        let cache = HeatmapCache::new(store.clone(), Jerusalem, Duration::from_millis(10));

        cache.get().await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.get().await.unwrap();

        assert_eq!(store.scans(), 2);
    }

    #[tokio::test]
    async fn failed_scan_caches_nothing_and_next_get_retries() {
        let store = Arc::new(CountingStore::seeded(vec![observation("a")]));
        store.fail_first_scans.store(1, Ordering::SeqCst);
        let cache = HeatmapCache::new(store.clone(), Jerusalem, Duration::from_secs(300));

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, StoreError::Scan(_)));

        let snapshot = cache.get().await.unwrap();
        assert_eq!(snapshot.lots.len(), 1);
        assert_eq!(store.scans(), 2);
    }

    #[tokio::test]
    async fn clear_forces_a_rescan() {
        let store = Arc::new(CountingStore::seeded(vec![observation("a")]));
        let cache = HeatmapCache::new(store.clone(), Jerusalem, Duration::from_secs(300));

        cache.get().await.unwrap();
        cache.clear().await;
        cache.get().await.unwrap();

        assert_eq!(store.scans(), 2);
    }

    #[tokio::test]
    async fn empty_store_yields_an_empty_snapshot_not_an_error() {
        let store = Arc::new(CountingStore::seeded(Vec::new()));
        let cache = HeatmapCache::new(store, Jerusalem, Duration::from_secs(300));

        let snapshot = cache.get().await.unwrap();
        assert!(snapshot.lots.is_empty());
    }
}
