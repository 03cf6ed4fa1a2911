use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::book_slot).get(handlers::list_reservations))
        .route("/{reservation_id}", get(handlers::get_reservation))
        .route(
            "/availability/{doctor_id}/{date}",
            get(handlers::get_availability),
        )
        .with_state(state)
}
