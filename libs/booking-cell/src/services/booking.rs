use std::sync::Arc;
use tracing::{debug, info, warn};

use patient_cell::services::PatientDirectory;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{BookSlotRequest, BookingError, BookingResult};
use crate::services::catalog::SlotCatalog;
use crate::services::ledger::ReservationLedger;

/// Orchestrates patient resolution plus the atomic slot reservation.
///
/// Patient creation is not compensated when the reservation step fails:
/// identities are re-resolvable by email, so a created-but-unused patient
/// record is acceptable collateral and the next attempt reuses it. The
/// (doctor, date, time) triple is the sole uniqueness boundary.
pub struct BookingCoordinator {
    directory: PatientDirectory,
    ledger: ReservationLedger,
}

impl BookingCoordinator {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self::with_client(supabase)
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            directory: PatientDirectory::new(Arc::clone(&supabase)),
            ledger: ReservationLedger::new(supabase),
        }
    }

    /// Book one slot as an all-or-nothing operation.
    ///
    /// Validation problems reject the request before any storage access.
    /// Everything that reaches storage collapses into the three-way
    /// `BookingResult`: a duplicate-slot rejection is `Conflict`, any other
    /// storage failure is `Failed` (including timeouts - the caller cannot
    /// assume the slot state and must re-query availability before retrying).
    pub async fn book(&self, request: BookSlotRequest) -> Result<BookingResult, BookingError> {
        self.validate(&request)?;

        debug!(
            "Booking doctor {} on {} at {} for {}",
            request.doctor_id, request.date, request.time, request.email
        );

        let patient = match self
            .directory
            .resolve_or_create(&request.email, &request.name, &request.phone)
            .await
        {
            Ok(patient) => patient,
            Err(e) => {
                warn!("Patient resolution failed, no reservation attempted: {}", e);
                return Ok(BookingResult::Failed {
                    reason: e.to_string(),
                });
            }
        };

        match self
            .ledger
            .reserve_if_free(
                request.doctor_id,
                request.date,
                &request.time,
                patient.id,
                request.reason.as_deref(),
            )
            .await
        {
            Ok(reservation) => {
                info!(
                    "Booking committed for patient {} (reservation {})",
                    patient.id, reservation.id
                );
                Ok(BookingResult::Committed { reservation })
            }
            Err(BookingError::SlotTaken) => {
                debug!(
                    "Slot {} on {} already taken for doctor {}",
                    request.time, request.date, request.doctor_id
                );
                Ok(BookingResult::Conflict)
            }
            Err(e) => {
                warn!("Reservation attempt failed: {}", e);
                Ok(BookingResult::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn validate(&self, request: &BookSlotRequest) -> Result<(), BookingError> {
        if request.name.trim().is_empty() {
            return Err(BookingError::ValidationError("name is required".into()));
        }
        if request.email.trim().is_empty() || !request.email.contains('@') {
            return Err(BookingError::ValidationError("a valid email is required".into()));
        }
        if request.phone.trim().is_empty() {
            return Err(BookingError::ValidationError("phone is required".into()));
        }
        if !SlotCatalog::contains(request.date, &request.time) {
            return Err(BookingError::ValidationError(format!(
                "'{}' is not a bookable time slot",
                request.time
            )));
        }
        Ok(())
    }
}
