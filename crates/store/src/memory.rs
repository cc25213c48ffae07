use crate::error::StoreError;
use crate::models::{NewObservation, Observation, ObservationPage};
use crate::traits::ObservationStore;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// In-memory observation store with the same paging contract as the
/// `PostgreSQL` adapter. Used in tests and for running the server without
/// a database.
pub struct MemoryObservationStore {
    rows: Mutex<Vec<Observation>>,
    page_size: usize,
}

impl MemoryObservationStore {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            page_size,
        }
    }

    /// Creates a store pre-populated with the given observations.
    #[must_use]
    pub fn seeded(rows: Vec<Observation>, page_size: usize) -> Self {
        Self {
            rows: Mutex::new(rows),
            page_size,
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl ObservationStore for MemoryObservationStore {
    async fn append(&self, new: NewObservation) -> Result<Observation, StoreError> {
        let record = new.into_record();
        self.rows.lock().await.push(record.clone());
        Ok(record)
    }

    async fn fetch_page(&self, cursor: Option<String>) -> Result<ObservationPage, StoreError> {
        let offset = match cursor {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| StoreError::Scan(format!("bad scan cursor: {raw:?}")))?,
            None => 0,
        };

        let rows = self.rows.lock().await;
        let end = (offset + self.page_size).min(rows.len());
        let items = rows
            .get(offset..end)
            .unwrap_or_default()
            .to_vec();

        let next_cursor = if end < rows.len() {
            Some(end.to_string())
        } else {
            None
        };

        Ok(ObservationPage { items, next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(uuid: &str, url: &str) -> Observation {
        Observation {
            uuid: uuid.to_string(),
            timestamp: "2025-03-02T10:15:00+00:00".to_string(),
            url: url.to_string(),
            lot_name: "Central".to_string(),
            is_full: uuid.ends_with('f'),
            image_src: None,
        }
    }

    #[tokio::test]
    async fn scan_all_walks_every_page() {
        let rows: Vec<Observation> = (0..5)
            .map(|i| observation(&format!("obs-{i}"), "https://example.com/lot?ID=1"))
            .collect();
        let store = MemoryObservationStore::seeded(rows, 2);

        // 5 rows with page size 2: pages of 2, 2, 1.
        let first = store.fetch_page(None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_cursor.as_deref(), Some("2"));

        let all = store.scan_all().await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[4].uuid, "obs-4");
    }

    #[tokio::test]
    async fn scan_all_on_empty_store_returns_empty() {
        let store = MemoryObservationStore::new(10);
        let all = store.scan_all().await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn append_assigns_ids_and_is_visible_to_scans() {
        let store = MemoryObservationStore::new(10);
        let stored = store
            .append(NewObservation {
                uuid: None,
                timestamp: None,
                url: "https://example.com/lot?ID=2".to_string(),
                lot_name: "North".to_string(),
                is_full: true,
                image_src: Some("/pics/male.png".to_string()),
            })
            .await
            .unwrap();

        assert!(!stored.uuid.is_empty());
        let all = store.scan_all().await.unwrap();
        assert_eq!(all, vec![stored]);
    }

    #[tokio::test]
    async fn bad_cursor_is_a_scan_error() {
        let store = MemoryObservationStore::new(10);
        let err = store
            .fetch_page(Some("not-a-number".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Scan(_)));
    }
}
