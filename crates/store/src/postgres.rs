use crate::error::StoreError;
use crate::models::{NewObservation, Observation, ObservationPage};
use crate::traits::ObservationStore;
use async_trait::async_trait;
use parkpulse_core::StoreConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// `PostgreSQL` adapter over one flat observations table.
///
/// The scan pages by keyset on `uuid` so a full walk never holds a
/// server-side cursor open between requests.
pub struct PgObservationStore {
    pool: PgPool,
    table: String,
    page_size: i64,
}

impl PgObservationStore {
    /// Connects to the configured database and makes sure the
    /// observations table exists.
    ///
    /// # Errors
    /// Returns `StoreError::Connect` if the pool or table setup fails.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        let store = Self {
            pool,
            table: config.table.clone(),
            page_size: config.scan_page_size,
        };
        store.ensure_table().await?;

        Ok(store)
    }

    async fn ensure_table(&self) -> Result<(), StoreError> {
        // Table names can't be parameterized; the name comes from config.
        let ddl = format!(
            r"
            CREATE TABLE IF NOT EXISTS {} (
                uuid TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                url TEXT NOT NULL,
                lot_name TEXT NOT NULL,
                is_full BOOLEAN NOT NULL,
                image_src TEXT
            )
            ",
            self.table
        );

        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ObservationStore for PgObservationStore {
    async fn append(&self, new: NewObservation) -> Result<Observation, StoreError> {
        let record = new.into_record();

        let insert = format!(
            r"
            INSERT INTO {} (uuid, timestamp, url, lot_name, is_full, image_src)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
            self.table
        );

        sqlx::query(&insert)
            .bind(&record.uuid)
            .bind(&record.timestamp)
            .bind(&record.url)
            .bind(&record.lot_name)
            .bind(record.is_full)
            .bind(&record.image_src)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(record)
    }

    async fn fetch_page(&self, cursor: Option<String>) -> Result<ObservationPage, StoreError> {
        let items: Vec<Observation> = if let Some(after) = cursor {
            let query = format!(
                r"
                SELECT uuid, timestamp, url, lot_name, is_full, image_src
                FROM {}
                WHERE uuid > $1
                ORDER BY uuid
                LIMIT $2
                ",
                self.table
            );
            sqlx::query_as(&query)
                .bind(after)
                .bind(self.page_size)
                .fetch_all(&self.pool)
                .await
        } else {
            let query = format!(
                r"
                SELECT uuid, timestamp, url, lot_name, is_full, image_src
                FROM {}
                ORDER BY uuid
                LIMIT $1
                ",
                self.table
            );
            sqlx::query_as(&query)
                .bind(self.page_size)
                .fetch_all(&self.pool)
                .await
        }
        .map_err(|e| StoreError::Scan(e.to_string()))?;

        let next_cursor = next_cursor_for(&items, self.page_size);
        Ok(ObservationPage { items, next_cursor })
    }
}

/// A full page may have more rows behind it; a short page ends the scan.
fn next_cursor_for(items: &[Observation], page_size: i64) -> Option<String> {
    if items.len() as i64 == page_size {
        items.last().map(|o| o.uuid.clone())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(uuid: &str) -> Observation {
        Observation {
            uuid: uuid.to_string(),
            timestamp: "2025-03-02T10:15:00+00:00".to_string(),
            url: "https://example.com/lot?ID=1".to_string(),
            lot_name: "Central".to_string(),
            is_full: false,
            image_src: None,
        }
    }

    #[test]
    fn full_page_continues_from_last_uuid() {
        let items = vec![observation("a"), observation("b")];
        assert_eq!(next_cursor_for(&items, 2), Some("b".to_string()));
    }

    #[test]
    fn short_page_ends_the_scan() {
        let items = vec![observation("a")];
        assert_eq!(next_cursor_for(&items, 2), None);
    }

    #[test]
    fn empty_page_ends_the_scan() {
        assert_eq!(next_cursor_for(&[], 2), None);
    }
}
