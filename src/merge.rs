// Coalesces contiguous booking intervals into the fewest loan requests.
//
// Callers must pass intervals in chronological order of their start: the
// merge only ever looks at the interval immediately following the current
// one and never sorts.

use chrono::Duration;

use crate::error::{GatewayError, GatewayResult};
use crate::model::{BookingInterval, MergedInterval};

/// Two intervals are contiguous when the next one starts exactly one minute
/// after the current one ends (e.g. `10:59` then `11:00`).
pub const CONTIGUITY_GAP_MINUTES: i64 = 1;

pub fn merge(intervals: &[BookingInterval]) -> GatewayResult<Vec<MergedInterval>> {
    let parsed = intervals
        .iter()
        .map(MergedInterval::try_from)
        .collect::<GatewayResult<Vec<_>>>()?;
    merge_parsed(&parsed)
}

pub fn merge_parsed(intervals: &[MergedInterval]) -> GatewayResult<Vec<MergedInterval>> {
    let (first, rest) = intervals
        .split_first()
        .ok_or_else(|| GatewayError::validation("at least one booking interval is required"))?;

    let gap = Duration::minutes(CONTIGUITY_GAP_MINUTES);
    let mut merged = Vec::new();
    let mut current = *first;
    for next in rest {
        // An end at the last representable minute has no successor
        if current.end.checked_add_signed(gap) == Some(next.start) {
            current.end = next.end;
        } else {
            merged.push(current);
            current = *next;
        }
    }
    merged.push(current);
    Ok(merged)
}
