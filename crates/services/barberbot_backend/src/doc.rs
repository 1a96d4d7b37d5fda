// File: crates/services/barberbot_backend/src/doc.rs
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers;
use crate::models::{
    AvailabilityQuery, AvailabilityResponse, BarberEntry, BookSlotRequest, BookingEntry,
    CancelBookingRequest, CancellationResponse, CatalogQuery, CatalogResponse, DayEntry,
    HistoryQuery, HistoryResponse, ServiceEntry, SlotEntry,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Barberbot API",
        version = "0.1.0",
        description = "Barbershop availability and booking API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_catalog_handler,
        handlers::get_availability_handler,
        handlers::book_slot_handler,
        handlers::get_history_handler,
        handlers::cancel_booking_handler
    ),
    components(
        schemas(
            CatalogQuery,
            CatalogResponse,
            ServiceEntry,
            BarberEntry,
            AvailabilityQuery,
            AvailabilityResponse,
            DayEntry,
            SlotEntry,
            BookSlotRequest,
            BookingEntry,
            HistoryQuery,
            HistoryResponse,
            CancelBookingRequest,
            CancellationResponse
        )
    ),
    tags(
        (name = "Booking", description = "Availability and booking endpoints")
    ),
    servers(
        (url = "/api", description = "Main API Prefix")
    )
)]
pub struct BarberbotApiDoc;
