use parkpulse_store::Observation;
use serde::Serialize;
use std::collections::HashMap;

/// Number of day-of-week x hour-of-day buckets in a weekly grid.
pub const SLOTS_PER_WEEK: usize = 7 * 24;

/// One weekly bucket of a lot's occupancy grid.
///
/// `day` is 0-6 with Sunday = 0; `hour` is 0-23 in the target timezone.
/// `value` is `count / total` when the slot has observations and `0.0`
/// otherwise; `total: 0` is what distinguishes "no data" from "never full".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapSlot {
    pub day: u32,
    pub hour: u32,
    pub value: f64,
    /// Observations in this slot that reported the lot full.
    pub count: u32,
    /// All observations that fell in this slot.
    pub total: u32,
}

/// The full weekly summary for one lot: all 168 slots, in
/// `day * 24 + hour` order, plus the most recent observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotHeatmap {
    pub heatmap: Vec<HeatmapSlot>,
    pub last_entry: Observation,
}

/// Aggregation result over the whole store: one `LotHeatmap` per lot URL,
/// plus the number of records dropped for unparsable timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatmapSnapshot {
    pub lots: HashMap<String, LotHeatmap>,
    pub skipped: usize,
}
