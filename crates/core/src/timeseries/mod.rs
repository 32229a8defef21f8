//! Daily time-series reconstruction.
//!
//! Sparse point data from the store is expanded onto a gap-free daily
//! timeline. Everything here is pure and operates on epoch seconds; the
//! typed i64 boundary removes the NaN/undefined input class — string
//! parsing happens at the provider edge, not here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Seconds in one UTC day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// A single value on the daily timeline. `date` is UTC midnight in epoch
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint<V> {
    pub date: i64,
    pub value: V,
}

/// Floors a timestamp to the start of the UTC day containing it. Euclidean
/// division keeps pre-1970 instants on their own day boundary.
pub fn truncate_to_midnight_utc(ts: i64) -> i64 {
    ts.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY
}

/// Inclusive daily timeline from the day containing `first` to the day
/// containing `last`, stepping by exactly one day. Empty when
/// `first > last`.
pub fn create_daily_timeline(first: i64, last: i64) -> Vec<i64> {
    if first > last {
        return Vec::new();
    }
    let start = truncate_to_midnight_utc(first);
    let end = truncate_to_midnight_utc(last);
    (0..=(end - start) / SECONDS_PER_DAY)
        .map(|day| start + day * SECONDS_PER_DAY)
        .collect()
}

/// Expands sparse per-day values onto `timeline`, carrying the last known
/// value forward across gaps. Days before the first known value take
/// `initial_value` when given and are omitted entirely otherwise —
/// omission, not fabrication, when no baseline exists.
pub fn forward_fill<V: Clone>(
    timeline: &[i64],
    sparse: &HashMap<i64, V>,
    initial_value: Option<V>,
) -> Vec<DailyPoint<V>> {
    let mut filled = Vec::with_capacity(timeline.len());
    let mut last_known = initial_value;
    for &date in timeline {
        if let Some(value) = sparse.get(&date) {
            last_known = Some(value.clone());
        }
        if let Some(value) = &last_known {
            filled.push(DailyPoint {
                date,
                value: value.clone(),
            });
        }
    }
    filled
}

/// Returns the items at or after `cutoff`. When none qualify, falls back to
/// the single most recent older item so a stale series never reads as
/// empty while history exists. `data` must ascend by date. Empty input
/// yields empty output.
pub fn filter_with_fallback<V: Clone>(data: &[DailyPoint<V>], cutoff: i64) -> Vec<DailyPoint<V>> {
    let from = data.partition_point(|point| point.date < cutoff);
    if from < data.len() {
        return data[from..].to_vec();
    }
    data.last().cloned().map(|point| vec![point]).unwrap_or_default()
}

/// Most recent item strictly before `before_date` (never `<=`). `data`
/// must ascend by date.
pub fn last_value_before<V>(data: &[DailyPoint<V>], before_date: i64) -> Option<&DailyPoint<V>> {
    let idx = data.partition_point(|point| point.date < before_date);
    if idx == 0 {
        None
    } else {
        Some(&data[idx - 1])
    }
}

/// Timestamp `days` whole days before `now`; zero days returns `now`.
pub fn cutoff_timestamp(now: i64, days: i64) -> i64 {
    now - days * SECONDS_PER_DAY
}
