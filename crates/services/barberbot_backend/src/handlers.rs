// File: crates/services/barberbot_backend/src/handlers.rs
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use barberbot_booking::{BookingRequest, Customer, ResourceSelector};
use barberbot_common::{validation_error, BarberbotError};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::app_state::AppState;
use crate::models::{
    AvailabilityQuery, AvailabilityResponse, BarberEntry, BookSlotRequest, BookingEntry,
    CancelBookingRequest, CancellationResponse, CatalogQuery, CatalogResponse, DayEntry,
    HistoryQuery, HistoryResponse, ServiceEntry,
};

/// Services (localized) and barbers.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/catalog",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Services and barbers", body = CatalogResponse)
    ),
    tag = "Booking"
))]
pub async fn get_catalog_handler(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>, BarberbotError> {
    let catalog = state.engine.catalog();
    let lang = query.lang.as_deref();

    let services = catalog
        .services_catalog()
        .iter()
        .map(|service| ServiceEntry {
            id: service.id.clone(),
            name: catalog.service_name(service, lang).to_string(),
            description: service
                .localized_description(lang, catalog.default_language())
                .map(str::to_string),
            duration_minutes: service.duration_minutes(),
            price_cents: service.price_cents,
            currency: service.currency.clone(),
            category: service.category.clone(),
            barbers: catalog
                .resources_for(Some(&service.id))
                .into_iter()
                .map(|barber| barber.id.clone())
                .collect(),
        })
        .collect();

    let barbers = catalog
        .resources_for(None)
        .into_iter()
        .map(|barber| BarberEntry {
            id: barber.id.clone(),
            name: barber.name.clone(),
        })
        .collect();

    Ok(Json(CatalogResponse {
        business: catalog.name().to_string(),
        timezone: catalog.timezone().name().to_string(),
        services,
        barbers,
    }))
}

/// Free slots for a service, one entry per day.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Available slots per day", body = AvailabilityResponse),
        (status = 400, description = "Invalid date, unknown service or barber"),
        (status = 503, description = "Calendar unavailable")
    ),
    tag = "Booking"
))]
pub async fn get_availability_handler(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, BarberbotError> {
    let tz = state.engine.catalog().timezone();
    let start = match query.date.as_deref() {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| validation_error("Invalid date format (YYYY-MM-DD)"))?,
        None => state.engine.now().with_timezone(&tz).date_naive(),
    };
    let selector = ResourceSelector::from_optional(query.barber_id.as_deref());
    info!(
        "Availability request: service={}, start={}, days={:?}, barber={:?}",
        query.service_id, start, query.days, selector
    );

    let days = state
        .engine
        .available_days(start, query.days, &query.service_id, &selector)
        .await?;

    Ok(Json(AvailabilityResponse {
        service_id: query.service_id,
        timezone: tz.name().to_string(),
        days: days.iter().map(|day| DayEntry::from_day(day, tz)).collect(),
    }))
}

/// Book a slot. Answers 409 when someone else got it first.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings",
    request_body(content = BookSlotRequest, example = json!({
        "phone": "+34 600 123 456",
        "customer_name": "Ana García",
        "service_id": "corte-clasico",
        "barber_id": "carlos",
        "start_time": "2025-05-05T10:00:00+02:00",
        "language": "es"
    })),
    responses(
        (status = 201, description = "Booking confirmed", body = BookingEntry),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Slot no longer available"),
        (status = 503, description = "Calendar or store unavailable")
    ),
    tag = "Booking"
))]
pub async fn book_slot_handler(
    State(state): State<AppState>,
    Json(payload): Json<BookSlotRequest>,
) -> Result<(StatusCode, Json<BookingEntry>), BarberbotError> {
    let start = DateTime::parse_from_rfc3339(&payload.start_time)
        .map_err(|_| validation_error("Invalid start_time format (RFC3339)"))?
        .with_timezone(&Utc);

    let request = BookingRequest {
        service_id: payload.service_id,
        selector: ResourceSelector::from_optional(payload.barber_id.as_deref()),
        start,
        customer: Customer {
            phone: payload.phone,
            name: payload.customer_name,
            email: payload.customer_email,
            language: payload.language,
        },
    };

    let record = state.engine.book(request).await?.into_result()?;
    let tz = state.engine.catalog().timezone();
    Ok((StatusCode::CREATED, Json(BookingEntry::from_record(&record, tz))))
}

/// The customer's bookings, oldest first.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookings",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Booking history", body = HistoryResponse),
        (status = 400, description = "Invalid phone number")
    ),
    tag = "Booking"
))]
pub async fn get_history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, BarberbotError> {
    let tz = state.engine.catalog().timezone();
    let bookings = state
        .engine
        .history(&query.phone)
        .await?
        .iter()
        .map(|record| BookingEntry::from_record(record, tz))
        .collect();
    Ok(Json(HistoryResponse { bookings }))
}

/// Cancel one of the customer's own bookings.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings/cancel",
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Booking cancelled", body = CancellationResponse),
        (status = 404, description = "No such booking for this customer"),
        (status = 503, description = "Calendar or store unavailable")
    ),
    tag = "Booking"
))]
pub async fn cancel_booking_handler(
    State(state): State<AppState>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<Json<CancellationResponse>, BarberbotError> {
    let record = state
        .engine
        .cancel(&payload.phone, &payload.event_id)
        .await?;
    let tz = state.engine.catalog().timezone();
    Ok(Json(CancellationResponse {
        success: true,
        booking: BookingEntry::from_record(&record, tz),
    }))
}
