//! Observation storage for the parking occupancy tracker.
//!
//! This crate provides:
//! - The `Observation` record stored for every scrape of a lot status page
//! - The `ObservationStore` trait: append plus a cursor-paginated full scan
//! - A `PostgreSQL` adapter over one flat observations table
//! - An in-memory adapter with the same paging contract for tests and local runs

pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod traits;

pub use error::StoreError;
pub use memory::MemoryObservationStore;
pub use models::{NewObservation, Observation, ObservationPage};
pub use postgres::PgObservationStore;
pub use traits::ObservationStore;
