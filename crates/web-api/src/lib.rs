//! REST API for the parking occupancy tracker.

pub mod handlers;
pub mod server;

pub use server::{ApiServer, AppState};
