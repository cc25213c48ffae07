//! Weekly occupancy aggregation for the parking occupancy tracker.
//!
//! This crate provides:
//! - The pure aggregator turning raw observations into a 7x24 occupancy
//!   grid per lot, bucketed in a fixed target timezone
//! - A process-wide result cache that absorbs repeated requests within a
//!   freshness window before rescanning the store

pub mod aggregate;
pub mod cache;
pub mod model;

pub use aggregate::build_heatmap;
pub use cache::HeatmapCache;
pub use model::{HeatmapSlot, HeatmapSnapshot, LotHeatmap, SLOTS_PER_WEEK};
