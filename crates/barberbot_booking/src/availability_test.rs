// --- File: crates/barberbot_booking/src/availability_test.rs ---
#[cfg(test)]
mod tests {
    use crate::availability::ResourceSelector;
    use crate::error::{Backend, BookingError};
    use crate::test_support::{harness, monday, utc};
    use chrono::{Duration, Timelike};

    #[test]
    fn test_selector_from_optional() {
        assert_eq!(ResourceSelector::from_optional(None), ResourceSelector::Any);
        assert_eq!(ResourceSelector::from_optional(Some(" ")), ResourceSelector::Any);
        assert_eq!(ResourceSelector::from_optional(Some("ANY")), ResourceSelector::Any);
        assert_eq!(
            ResourceSelector::from_optional(Some("ana")),
            ResourceSelector::Specific("ana".to_string())
        );
    }

    #[tokio::test]
    async fn test_one_calendar_read_per_resource() {
        let h = harness();
        let slots = h
            .engine
            .available_slots(monday(), "corte", &ResourceSelector::Any)
            .await
            .unwrap();

        assert!(!slots.is_empty());
        assert_eq!(h.calendar.list_busy_calls(), 2);
        assert!(slots
            .iter()
            .all(|s| s.free_resources == vec!["ana".to_string(), "luis".to_string()]));
    }

    #[tokio::test]
    async fn test_closed_day_makes_no_calendar_calls() {
        let h = harness();
        let sunday = monday() + Duration::days(6);
        let slots = h
            .engine
            .available_slots(sunday, "corte", &ResourceSelector::Any)
            .await
            .unwrap();
        assert!(slots.is_empty());
        assert_eq!(h.calendar.list_busy_calls(), 0);
    }

    #[tokio::test]
    async fn test_specific_barber_only_reads_own_calendar() {
        let h = harness();
        h.calendar
            .add_busy("luis@calendar", utc(2025, 5, 5, 9, 0), utc(2025, 5, 5, 18, 0));
        let slots = h
            .engine
            .available_slots(monday(), "corte", &ResourceSelector::Specific("ana".into()))
            .await
            .unwrap();
        // 35 starts from 09:00 to 17:30, five of them touch the lunch break.
        assert_eq!(slots.len(), 30);
        assert_eq!(h.calendar.list_busy_calls(), 1);
        assert!(slots.iter().all(|s| s.free_resources == vec!["ana".to_string()]));
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected_before_calendar_calls() {
        let h = harness();
        let engine = &h.engine;

        let unknown_service = engine
            .available_slots(monday(), "permanente", &ResourceSelector::Any)
            .await;
        let unknown_barber = engine
            .available_slots(monday(), "corte", &ResourceSelector::Specific("pedro".into()))
            .await;
        let wrong_service = engine
            .available_slots(monday(), "barba", &ResourceSelector::Specific("luis".into()))
            .await;
        let past = engine
            .available_slots(monday() - Duration::days(7), "corte", &ResourceSelector::Any)
            .await;
        let beyond = engine
            .available_slots(monday() + Duration::days(60), "corte", &ResourceSelector::Any)
            .await;

        for result in [unknown_service, unknown_barber, wrong_service, past, beyond] {
            assert!(matches!(result, Err(BookingError::InvalidRequest(_))));
        }
        assert_eq!(h.calendar.list_busy_calls(), 0);
    }

    #[tokio::test]
    async fn test_calendar_failure_is_not_treated_as_free() {
        let h = harness();
        h.calendar.set_unavailable(true);
        let result = h
            .engine
            .available_slots(monday(), "corte", &ResourceSelector::Any)
            .await;
        assert!(matches!(
            result,
            Err(BookingError::BackendUnavailable {
                backend: Backend::Calendar,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_calendar_times_out() {
        let h = harness();
        h.calendar.set_latency(Some(std::time::Duration::from_secs(30)));
        let result = h
            .engine
            .available_slots(monday(), "corte", &ResourceSelector::Any)
            .await;
        assert!(matches!(
            result,
            Err(BookingError::BackendUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_multi_day_flags_closed_days_and_batches_reads() {
        let h = harness();
        h.calendar
            .add_busy("ana@calendar", utc(2025, 5, 6, 9, 0), utc(2025, 5, 6, 18, 0));
        h.calendar
            .add_busy("luis@calendar", utc(2025, 5, 6, 9, 0), utc(2025, 5, 6, 18, 0));

        // Sunday 2025-05-04 through Saturday 2025-05-10.
        let days = h
            .engine
            .available_days(monday() - Duration::days(1), Some(7), "corte", &ResourceSelector::Any)
            .await
            .unwrap();

        assert_eq!(days.len(), 7);
        assert!(days[0].closed);
        assert!(!days[1].closed && !days[1].slots.is_empty());
        assert!(!days[2].closed && days[2].slots.is_empty());
        let saturday = &days[6];
        assert!(!saturday.closed);
        assert_eq!(saturday.slots.first().map(|s| s.start.hour()), Some(10));
        assert_eq!(h.calendar.list_busy_calls(), 2);
    }

    #[tokio::test]
    async fn test_multi_day_clips_to_booking_window() {
        let h = harness();
        let days = h
            .engine
            .available_days(monday() - Duration::days(3), Some(5), "corte", &ResourceSelector::Any)
            .await
            .unwrap();
        // 2025-05-02..05-06 clipped to today (05-04) and later.
        let dates: Vec<_> = days.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![monday() - Duration::days(1), monday(), monday() + Duration::days(1)]
        );

        let defaulted = h
            .engine
            .available_days(monday(), None, "corte", &ResourceSelector::Any)
            .await
            .unwrap();
        assert_eq!(defaulted.len(), 7);
    }

    #[tokio::test]
    async fn test_multi_day_all_closed_makes_no_calls() {
        let h = harness();
        let days = h
            .engine
            .available_days(monday() - Duration::days(1), Some(1), "corte", &ResourceSelector::Any)
            .await
            .unwrap();
        assert_eq!(days.len(), 1);
        assert!(days[0].closed);
        assert_eq!(h.calendar.list_busy_calls(), 0);
    }

    #[tokio::test]
    async fn test_multi_day_range_starting_long_ago_begins_today() {
        let h = harness();
        let today = monday() - Duration::days(1);
        let days = h
            .engine
            .available_days(today - Duration::days(3650), Some(3653), "corte", &ResourceSelector::Any)
            .await
            .unwrap();
        let dates: Vec<_> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![today, monday(), monday() + Duration::days(1)]);
        assert_eq!(h.calendar.list_busy_calls(), 2);

        let unbounded = h
            .engine
            .available_days(today - Duration::days(3650), Some(u32::MAX), "corte", &ResourceSelector::Any)
            .await
            .unwrap();
        assert_eq!(unbounded.first().map(|d| d.date), Some(today));
        assert_eq!(unbounded.last().map(|d| d.date), Some(today + Duration::days(30)));
        assert_eq!(unbounded.len(), 31);
    }
}
