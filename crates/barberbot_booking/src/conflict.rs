// --- File: crates/barberbot_booking/src/conflict.rs ---
//! Overlap tests between candidate slots and busy intervals.
//!
//! Intervals are half-open: `[a0, a1)` and `[b0, b1)` overlap iff `a0 < b1 && a1 > b0`.
//! The buffer widens each busy interval on both sides. Zero-length or inverted busy
//! intervals never conflict.

use barberbot_common::services::BusyInterval;
use chrono::{DateTime, Duration, Utc};

pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Whether `[start, end)` conflicts with `busy` once `buffer` is applied around it.
pub fn overlaps(start: DateTime<Utc>, end: DateTime<Utc>, busy: &BusyInterval, buffer: Duration) -> bool {
    if busy.is_degenerate() {
        return false;
    }
    intervals_overlap(start, end, busy.start - buffer, busy.end + buffer)
}

/// One resource's busy intervals, buffered, sorted and merged for fast lookups.
#[derive(Debug, Clone, Default)]
pub struct BusySet {
    spans: Vec<(DateTime<Utc>, DateTime<Utc>)>,
}

impl BusySet {
    pub fn new(busy: &[BusyInterval], buffer: Duration) -> Self {
        let mut spans: Vec<_> = busy
            .iter()
            .filter(|b| !b.is_degenerate())
            .map(|b| (b.start - buffer, b.end + buffer))
            .collect();
        spans.sort_by_key(|(start, _)| *start);

        let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        Self { spans: merged }
    }

    pub fn is_free(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        // Spans are disjoint and sorted, so their ends are sorted too.
        let idx = self.spans.partition_point(|(_, span_end)| *span_end <= start);
        match self.spans.get(idx) {
            Some((span_start, span_end)) => !intervals_overlap(start, end, *span_start, *span_end),
            None => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
