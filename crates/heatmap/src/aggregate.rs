use crate::model::{HeatmapSlot, HeatmapSnapshot, LotHeatmap, SLOTS_PER_WEEK};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use parkpulse_store::Observation;
use std::collections::HashMap;

/// Builds the weekly occupancy grid for every lot present in `observations`.
///
/// Pure and order-independent: the store makes no ordering promise, so the
/// grid and the last-entry pick must not depend on row order (on a
/// timestamp tie the first record seen wins, which is deterministic for a
/// given input sequence).
///
/// Bucketing happens in `zone`'s wall clock, never in raw UTC components:
/// a reading taken at 22:30 UTC on Saturday belongs to Sunday for a
/// UTC+2 lot.
///
/// Records with unparsable timestamps are skipped and counted; they never
/// disturb other buckets. An empty input produces an empty lot map.
#[must_use]
pub fn build_heatmap(observations: &[Observation], zone: Tz) -> HeatmapSnapshot {
    let mut skipped = 0usize;
    let mut lots: HashMap<&str, LotAccumulator<'_>> = HashMap::new();

    for obs in observations {
        let Some(instant) = parse_timestamp(&obs.timestamp) else {
            skipped += 1;
            tracing::warn!(
                "skipping observation {} with unparsable timestamp {:?}",
                obs.uuid,
                obs.timestamp
            );
            continue;
        };

        let local = instant.with_timezone(&zone);
        let day = local.weekday().num_days_from_sunday();
        let hour = local.hour();
        let slot = (day * 24 + hour) as usize;

        let acc = lots
            .entry(obs.url.as_str())
            .or_insert_with(|| LotAccumulator::new(obs, instant));
        acc.totals[slot] += 1;
        if obs.is_full {
            acc.fulls[slot] += 1;
        }
        // Strict comparison keeps the first-seen record on a tie.
        if instant > acc.last_instant {
            acc.last = obs;
            acc.last_instant = instant;
        }
    }

    let lots = lots
        .into_iter()
        .map(|(url, acc)| (url.to_string(), acc.finish()))
        .collect();

    HeatmapSnapshot { lots, skipped }
}

/// Accepts RFC 3339 timestamps, and bare ISO 8601 without an offset
/// (what a `utcnow().isoformat()` producer writes) treated as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

struct LotAccumulator<'a> {
    totals: [u32; SLOTS_PER_WEEK],
    fulls: [u32; SLOTS_PER_WEEK],
    last: &'a Observation,
    last_instant: DateTime<Utc>,
}

impl<'a> LotAccumulator<'a> {
    fn new(first: &'a Observation, instant: DateTime<Utc>) -> Self {
        Self {
            totals: [0; SLOTS_PER_WEEK],
            fulls: [0; SLOTS_PER_WEEK],
            last: first,
            last_instant: instant,
        }
    }

    fn finish(self) -> LotHeatmap {
        let heatmap = (0..SLOTS_PER_WEEK)
            .map(|slot| {
                let total = self.totals[slot];
                let count = self.fulls[slot];
                let value = if total > 0 {
                    f64::from(count) / f64::from(total)
                } else {
                    0.0
                };
                HeatmapSlot {
                    day: (slot / 24) as u32,
                    hour: (slot % 24) as u32,
                    value,
                    count,
                    total,
                }
            })
            .collect();

        LotHeatmap {
            heatmap,
            last_entry: self.last.clone(),
        }
    }
}
