use crate::error::StoreError;
use crate::models::{NewObservation, Observation, ObservationPage};
use async_trait::async_trait;

/// Append-and-scan access to the flat observations collection.
///
/// The scan is the only read path the aggregation engine needs: it walks
/// the store's pagination cursor until exhaustion and hands back the whole
/// collection as one sequence, in whatever order the store returns rows.
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Writes one observation, assigning uuid/timestamp if the producer
    /// did not supply them, and returns the record as stored.
    async fn append(&self, new: NewObservation) -> Result<Observation, StoreError>;

    /// Fetches one page of the scan. `None` starts from the beginning; the
    /// returned cursor continues where this page left off, or is `None`
    /// when the store has no more rows.
    async fn fetch_page(&self, cursor: Option<String>) -> Result<ObservationPage, StoreError>;

    /// Materializes the entire collection by following the pagination
    /// cursor until the store reports completion.
    ///
    /// # Errors
    ///
    /// Fails if any page fetch fails; no partial result is returned.
    async fn scan_all(&self) -> Result<Vec<Observation>, StoreError> {
        let mut all = Vec::new();
        let mut cursor = None;

        loop {
            let page = self.fetch_page(cursor).await?;
            all.extend(page.items);

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!("store scan returned {} observation(s)", all.len());
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves three pages but fails the fetch of the second one.
    struct FlakyStore {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl ObservationStore for FlakyStore {
        async fn append(&self, new: NewObservation) -> Result<Observation, StoreError> {
            Ok(new.into_record())
        }

        async fn fetch_page(&self, cursor: Option<String>) -> Result<ObservationPage, StoreError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match cursor.as_deref() {
                None => Ok(ObservationPage {
                    items: vec![Observation {
                        uuid: "obs-0".to_string(),
                        timestamp: "2025-03-02T10:15:00+00:00".to_string(),
                        url: "https://example.com/lot?ID=1".to_string(),
                        lot_name: "Central".to_string(),
                        is_full: false,
                        image_src: None,
                    }],
                    next_cursor: Some("page-2".to_string()),
                }),
                Some("page-2") => Err(StoreError::Scan("store unavailable".to_string())),
                Some(other) => panic!("unexpected cursor {other}"),
            }
        }
    }

    #[tokio::test]
    async fn scan_all_fails_whole_when_a_later_page_fails() {
        let store = FlakyStore {
            fetches: AtomicUsize::new(0),
        };

        let err = store.scan_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Scan(_)));
        // First page succeeded, second failed, and the scan stopped there.
        assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
    }
}
