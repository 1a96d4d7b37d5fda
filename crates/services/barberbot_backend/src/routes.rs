// --- File: crates/services/barberbot_backend/src/routes.rs ---
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::handlers::{
    book_slot_handler, cancel_booking_handler, get_availability_handler, get_catalog_handler,
    get_history_handler,
};

/// Booking routes, relative to `/api`.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Welcome to Barberbot API!" }))
        .route("/catalog", get(get_catalog_handler))
        .route("/availability", get(get_availability_handler))
        .route("/bookings", post(book_slot_handler).get(get_history_handler))
        .route("/bookings/cancel", post(cancel_booking_handler))
        .with_state(state)
}

/// The full application: routes nested under `/api` with request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes(state))
        .layer(TraceLayer::new_for_http())
}
