use thiserror::Error;

/// Errors surfaced by the observation store.
///
/// None of these are retried here; callers decide whether a failed call
/// is fatal. A scan that fails on any page fails as a whole.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Could not reach or prepare the backing store.
    #[error("store connection failed: {0}")]
    Connect(String),

    /// A page fetch of the full-table scan failed.
    #[error("scan page fetch failed: {0}")]
    Scan(String),

    /// An observation write failed.
    #[error("observation write failed: {0}")]
    Write(String),
}
