use barberbot_booking::conflict::BusySet;
use barberbot_booking::slots::{generate_slots, BookingWindow};
use barberbot_booking::{BookingEngine, OpeningHours, ResourceSelector};
use barberbot_common::services::memory::InMemoryCalendar;
use barberbot_common::services::BusyInterval;
use barberbot_config::{BarberConfig, BookingSettings, BusinessConfig, DayHoursConfig, ServiceConfig};
use barberbot_store::MemoryStore;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::BTreeMap;
use std::sync::Arc;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 4, 6, 0, 0).unwrap()
}

// Helper function to create evenly spread busy periods for one calendar
fn create_busy_periods(calendar: &str, count: usize) -> Vec<BusyInterval> {
    let base = Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let start = base + Duration::minutes(95 * i as i64);
            BusyInterval::new(calendar, start, start + Duration::minutes(40))
        })
        .collect()
}

fn create_engine(barbers: usize, busy_per_barber: usize) -> BookingEngine {
    let calendar = Arc::new(InMemoryCalendar::new());
    let roster: Vec<BarberConfig> = (0..barbers)
        .map(|i| BarberConfig {
            id: format!("barber-{i}"),
            name: format!("Barber {i}"),
            calendar_id: Some(format!("barber-{i}@calendar")),
            services: Vec::new(),
        })
        .collect();
    for barber in &roster {
        let calendar_ref = barber.calendar_id.clone().unwrap_or_default();
        for busy in create_busy_periods(&calendar_ref, busy_per_barber) {
            calendar.add_busy(&calendar_ref, busy.start, busy.end);
        }
    }
    let open = DayHoursConfig {
        open: Some("09:00".to_string()),
        close: Some("20:00".to_string()),
        closed: false,
        breaks: Vec::new(),
    };
    let business = BusinessConfig {
        name: "Bench Barbers".to_string(),
        timezone: "Europe/Madrid".to_string(),
        calendar_id: "shop@calendar".to_string(),
        default_language: Some("es".to_string()),
        currency: Some("EUR".to_string()),
        business_hours: ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday"]
            .iter()
            .map(|d| (d.to_string(), open.clone()))
            .collect(),
        services: vec![ServiceConfig {
            id: "corte".to_string(),
            name: BTreeMap::from([("es".to_string(), "Corte".to_string())]),
            description: BTreeMap::new(),
            duration_minutes: 30,
            price_cents: 1500,
            currency: None,
            category: None,
        }],
        barbers: roster,
    };
    BookingEngine::from_config(
        &business,
        &BookingSettings::default(),
        calendar,
        Arc::new(MemoryStore::new()),
    )
    .unwrap()
    .with_clock(Arc::new(now))
}

fn benchmark_slot_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_generation");
    let hours = OpeningHours::new(
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        Vec::new(),
    )
    .unwrap();
    let window = BookingWindow {
        earliest_start: now(),
        today: start_date(),
        last_date: start_date() + Duration::days(30),
    };

    group.bench_function("one_day_15_minute_cadence", |b| {
        b.iter(|| {
            generate_slots(
                black_box(start_date()),
                &hours,
                black_box(Duration::minutes(30)),
                black_box(Duration::minutes(15)),
                Tz::Europe__Madrid,
                &window,
            )
            .count()
        })
    });

    let busy = create_busy_periods("barber-0", 50);
    group.bench_function("busy_set_lookup_50_intervals", |b| {
        let set = BusySet::new(&busy, Duration::minutes(10));
        let slots: Vec<_> = generate_slots(
            start_date(),
            &hours,
            Duration::minutes(30),
            Duration::minutes(15),
            Tz::UTC,
            &window,
        )
        .collect();
        b.iter(|| {
            slots
                .iter()
                .filter(|s| set.is_free(black_box(s.start), black_box(s.end)))
                .count()
        })
    });

    group.finish();
}

fn benchmark_availability(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("availability");

    for (barbers, busy) in [(1, 0), (3, 5), (8, 20)] {
        let engine = create_engine(barbers, busy);
        group.bench_function(format!("week_any_{barbers}_barbers_{busy}_busy"), |b| {
            b.to_async(&runtime).iter(|| async {
                engine
                    .available_days(
                        black_box(start_date()),
                        Some(7),
                        "corte",
                        &ResourceSelector::Any,
                    )
                    .await
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_slot_generation, benchmark_availability);
criterion_main!(benches);
