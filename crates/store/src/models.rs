use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One timestamped occupancy reading for a parking lot.
///
/// Rows are append-only and carry the timestamp exactly as the producer
/// wrote it (RFC 3339 text). The store makes no ordering promise; consumers
/// that need "the latest" reading must compare timestamps themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Observation {
    pub uuid: String,
    pub timestamp: String,
    /// Canonical URL of the lot's status page; the stable lot identifier.
    pub url: String,
    /// Display label scraped alongside the status; latest wins.
    pub lot_name: String,
    pub is_full: bool,
    /// Source of the occupancy signal (the status image), kept for provenance.
    pub image_src: Option<String>,
}

/// An observation about to be written. `uuid` and `timestamp` may be left
/// for the store to assign; producers that already stamped their reading
/// keep their values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewObservation {
    pub uuid: Option<String>,
    pub timestamp: Option<String>,
    pub url: String,
    pub lot_name: String,
    pub is_full: bool,
    pub image_src: Option<String>,
}

impl NewObservation {
    /// Finalizes the record, assigning a v4 uuid and the current UTC time
    /// wherever the producer left them out.
    #[must_use]
    pub fn into_record(self) -> Observation {
        Observation {
            uuid: self.uuid.unwrap_or_else(|| Uuid::new_v4().to_string()),
            timestamp: self.timestamp.unwrap_or_else(|| Utc::now().to_rfc3339()),
            url: self.url,
            lot_name: self.lot_name,
            is_full: self.is_full,
            image_src: self.image_src,
        }
    }
}

/// One page of a store scan plus the cursor for the next page, if any.
#[derive(Debug, Clone)]
pub struct ObservationPage {
    pub items: Vec<Observation>,
    pub next_cursor: Option<String>,
}
