use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::supabase::{DbError, SupabaseClient};

use crate::models::{BookingError, Reservation, ReservationListQuery};

/// Storage abstraction for reservation rows. All writers go through
/// `reserve_if_free`; the (doctor_id, date, time) unique constraint in the
/// store is what makes the check-then-insert indivisible.
pub struct ReservationLedger {
    supabase: Arc<SupabaseClient>,
}

impl ReservationLedger {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Attempt to claim a slot with a single conditional insert. Under
    /// concurrent calls for the same triple at most one insert lands; the
    /// store rejects the rest with a duplicate-key error, surfaced here as
    /// `SlotTaken`. No row is written on any failure path.
    pub async fn reserve_if_free(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: &str,
        patient_id: Uuid,
        reason: Option<&str>,
    ) -> Result<Reservation, BookingError> {
        debug!("Reserving slot {} on {} for doctor {}", time, date, doctor_id);

        let reservation_data = json!({
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "date": date.format("%Y-%m-%d").to_string(),
            "time": time,
            "reason": reason,
            "created_at": Utc::now().to_rfc3339(),
        });

        let rows: Vec<Value> = self
            .supabase
            .insert("/rest/v1/reservations", reservation_data)
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => BookingError::SlotTaken,
                DbError::Unavailable(msg) => BookingError::StorageUnavailable(msg),
                other => BookingError::DatabaseError(other.to_string()),
            })?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::DatabaseError("insert returned no rows".into()))?;

        let reservation: Reservation = serde_json::from_value(row)
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        info!(
            "Reservation {} committed: doctor {} on {} at {}",
            reservation.id, doctor_id, date, time
        );

        Ok(reservation)
    }

    /// All reservations for one doctor on one calendar date.
    pub async fn reservations_for(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, BookingError> {
        let path = format!(
            "/rest/v1/reservations?doctor_id=eq.{}&date=eq.{}",
            doctor_id,
            date.format("%Y-%m-%d")
        );

        self.fetch_reservations(&path).await
    }

    /// Reservation by surrogate id, used for external lookup.
    pub async fn get_reservation(&self, reservation_id: Uuid) -> Result<Reservation, BookingError> {
        let path = format!("/rest/v1/reservations?id=eq.{}", reservation_id);

        let mut rows = self.fetch_reservations(&path).await?;
        if rows.is_empty() {
            return Err(BookingError::NotFound);
        }
        Ok(rows.remove(0))
    }

    pub async fn list_reservations(
        &self,
        query: &ReservationListQuery,
    ) -> Result<Vec<Reservation>, BookingError> {
        let mut query_parts = vec![];

        if let Some(doctor_id) = query.doctor_id {
            query_parts.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(date) = query.date {
            query_parts.push(format!("date=eq.{}", date.format("%Y-%m-%d")));
        }

        let limit = query.limit.unwrap_or(50);
        let offset = query.offset.unwrap_or(0);
        query_parts.push(format!("limit={}", limit));
        query_parts.push(format!("offset={}", offset));
        query_parts.push("order=created_at.desc".to_string());

        let path = format!("/rest/v1/reservations?{}", query_parts.join("&"));
        self.fetch_reservations(&path).await
    }

    async fn fetch_reservations(&self, path: &str) -> Result<Vec<Reservation>, BookingError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| match e {
                DbError::Unavailable(msg) => BookingError::StorageUnavailable(msg),
                other => BookingError::DatabaseError(other.to_string()),
            })?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Reservation>, _>>()
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse reservations: {}", e)))
    }
}
