use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::BookingError;
use crate::services::catalog::SlotCatalog;
use crate::services::ledger::ReservationLedger;

/// Read-side view of taken slots, used to render a slot grid. Advisory
/// only: it is not linearized with concurrent writes, so the authoritative
/// check stays inside `ReservationLedger::reserve_if_free`.
pub struct AvailabilityIndex {
    ledger: ReservationLedger,
}

impl AvailabilityIndex {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            ledger: ReservationLedger::new(supabase),
        }
    }

    /// Time labels already reserved for (doctor, date). Empty set when the
    /// doctor has no reservations that day.
    pub async fn reserved_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<HashSet<String>, BookingError> {
        let reservations = self.ledger.reservations_for(doctor_id, date).await?;

        debug!(
            "Doctor {} has {} reservations on {}",
            doctor_id,
            reservations.len(),
            date
        );

        Ok(reservations.into_iter().map(|r| r.time).collect())
    }

    /// Catalog minus reserved, preserving catalog order.
    pub async fn free_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<&'static str>, BookingError> {
        let reserved = self.reserved_slots(doctor_id, date).await?;

        Ok(SlotCatalog::slots_for_day(date)
            .iter()
            .copied()
            .filter(|slot| !reserved.contains(*slot))
            .collect())
    }
}
