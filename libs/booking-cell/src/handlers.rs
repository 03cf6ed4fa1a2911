use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::AppError;

use crate::models::{BookSlotRequest, BookingError, BookingResult, ReservationListQuery, SlotAvailabilityResponse};
use crate::services::{AvailabilityIndex, BookingCoordinator, ReservationLedger, SlotCatalog};

#[axum::debug_handler]
pub async fn book_slot(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<BookSlotRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let coordinator = BookingCoordinator::new(&config);

    let result = coordinator.book(request).await.map_err(map_booking_error)?;

    match result {
        BookingResult::Committed { reservation } => Ok((
            StatusCode::CREATED,
            Json(json!({
                "status": "committed",
                "reservation": reservation
            })),
        )),
        BookingResult::Conflict => Err(AppError::Conflict(
            "this time slot is already booked".to_string(),
        )),
        BookingResult::Failed { reason } => Err(AppError::Unavailable(reason)),
    }
}

#[axum::debug_handler]
pub async fn get_availability(
    State(config): State<Arc<AppConfig>>,
    Path((doctor_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<Value>, AppError> {
    let index = AvailabilityIndex::new(Arc::new(SupabaseClient::new(&config)));

    let reserved = index
        .reserved_slots(doctor_id, date)
        .await
        .map_err(map_booking_error)?;

    // Catalog order for both lists so the grid renders deterministically.
    let mut reserved_ordered = Vec::new();
    let mut free = Vec::new();
    for slot in SlotCatalog::slots_for_day(date) {
        if reserved.contains(*slot) {
            reserved_ordered.push(slot.to_string());
        } else {
            free.push(slot.to_string());
        }
    }

    let response = SlotAvailabilityResponse {
        doctor_id,
        date,
        reserved: reserved_ordered,
        free,
    };

    Ok(Json(json!(response)))
}

#[axum::debug_handler]
pub async fn get_reservation(
    State(config): State<Arc<AppConfig>>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let ledger = ReservationLedger::new(Arc::new(SupabaseClient::new(&config)));

    let reservation = ledger
        .get_reservation(reservation_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(reservation)))
}

#[axum::debug_handler]
pub async fn list_reservations(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<ReservationListQuery>,
) -> Result<Json<Value>, AppError> {
    let ledger = ReservationLedger::new(Arc::new(SupabaseClient::new(&config)));

    let reservations = ledger
        .list_reservations(&query)
        .await
        .map_err(map_booking_error)?;
    let total = reservations.len();

    Ok(Json(json!({
        "reservations": reservations,
        "total": total
    })))
}

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::SlotTaken => AppError::Conflict("this time slot is already booked".to_string()),
        BookingError::NotFound => AppError::NotFound("Reservation not found".to_string()),
        BookingError::ValidationError(msg) => AppError::ValidationError(msg),
        BookingError::StorageUnavailable(msg) => AppError::Unavailable(msg),
        BookingError::DatabaseError(msg) => AppError::Database(msg),
    }
}
