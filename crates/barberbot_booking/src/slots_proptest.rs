// --- File: crates/barberbot_booking/src/slots_proptest.rs ---
#[cfg(test)]
mod tests {
    use crate::catalog::{Break, OpeningHours};
    use crate::conflict::{overlaps, BusySet};
    use crate::slots::{generate_slots, BookingWindow};
    use crate::test_support::{monday, utc};
    use barberbot_common::services::BusyInterval;
    use chrono::{DateTime, Duration, NaiveTime, Utc};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    fn minutes_to_time(minutes: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap()
    }

    fn at_minute(minutes: i64) -> DateTime<Utc> {
        utc(2025, 5, 5, 0, 0) + Duration::minutes(minutes)
    }

    // Helper function to build opening hours with an optional break in the middle
    fn build_hours(open_min: u32, close_min: u32, with_break: bool) -> OpeningHours {
        let breaks = if with_break && close_min - open_min >= 120 {
            let start = open_min + (close_min - open_min) / 2;
            vec![Break {
                start: minutes_to_time(start),
                end: minutes_to_time(start + 45),
            }]
        } else {
            vec![]
        };
        OpeningHours::new(minutes_to_time(open_min), minutes_to_time(close_min), breaks).unwrap()
    }

    fn busy_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
        prop::collection::vec((0..1440i64, -30..180i64), 0..12)
    }

    proptest! {
        // Every slot lies inside opening hours and misses every break
        #[test]
        fn test_slots_respect_hours_and_breaks(
            open_min in 360u32..720,
            span in 60u32..720,
            with_break in any::<bool>(),
            duration in 5i64..120,
            cadence in 5i64..60,
        ) {
            let close_min = (open_min + span).min(23 * 60 + 59);
            let hours = build_hours(open_min, close_min, with_break);
            let window = BookingWindow {
                earliest_start: utc(2000, 1, 1, 0, 0),
                today: monday(),
                last_date: monday() + Duration::days(30),
            };
            let slots: Vec<_> = generate_slots(
                monday(),
                &hours,
                Duration::minutes(duration),
                Duration::minutes(cadence),
                Tz::UTC,
                &window,
            )
            .collect();

            let open = monday().and_time(hours.open).and_utc();
            let close = monday().and_time(hours.close).and_utc();
            for slot in &slots {
                prop_assert!(slot.start >= open);
                prop_assert!(slot.end <= close);
                prop_assert_eq!(slot.end - slot.start, Duration::minutes(duration));
                prop_assert_eq!((slot.start - open).num_minutes() % cadence, 0);
                for b in &hours.breaks {
                    let b_start = monday().and_time(b.start).and_utc();
                    let b_end = monday().and_time(b.end).and_utc();
                    prop_assert!(!(slot.start < b_end && slot.end > b_start));
                }
            }
            for pair in slots.windows(2) {
                prop_assert!(pair[0].start < pair[1].start);
            }
        }

        // The merged busy set agrees with the direct overlap test
        #[test]
        fn test_busy_set_matches_direct_overlap(
            busy in busy_strategy(),
            buffer in 0i64..30,
            slot_start in 0i64..1440,
            slot_len in 5i64..120,
        ) {
            let intervals: Vec<BusyInterval> = busy
                .iter()
                .map(|(start, len)| BusyInterval::new("r", at_minute(*start), at_minute(start + len)))
                .collect();
            let buffer = Duration::minutes(buffer);
            let set = BusySet::new(&intervals, buffer);
            let start = at_minute(slot_start);
            let end = at_minute(slot_start + slot_len);

            let direct = intervals.iter().any(|b| overlaps(start, end, b, buffer));
            prop_assert_eq!(set.is_free(start, end), !direct);
        }

        // Overlap is symmetric in the sense of half-open intervals
        #[test]
        fn test_overlap_without_buffer_is_symmetric(
            a_start in 0i64..600,
            a_len in 1i64..120,
            b_start in 0i64..600,
            b_len in 1i64..120,
        ) {
            let a = BusyInterval::new("r", at_minute(a_start), at_minute(a_start + a_len));
            let b = BusyInterval::new("r", at_minute(b_start), at_minute(b_start + b_len));
            prop_assert_eq!(
                overlaps(a.start, a.end, &b, Duration::zero()),
                overlaps(b.start, b.end, &a, Duration::zero())
            );
        }
    }
}
