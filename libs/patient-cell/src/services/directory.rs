use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use shared_database::supabase::{DbError, SupabaseClient};

use crate::models::{Patient, PatientError};

/// Maps a contact email to a stable patient identity. Emails are compared
/// case-insensitively and stored lowercased, so "A@x.com" and "a@x.com"
/// resolve to the same patient.
pub struct PatientDirectory {
    supabase: Arc<SupabaseClient>,
}

impl PatientDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Look up a patient by email, creating one if none exists. Repeat
    /// lookups return the stored record as-is; name and phone are never
    /// overwritten on subsequent bookings.
    pub async fn resolve_or_create(
        &self,
        email: &str,
        name: &str,
        phone: &str,
    ) -> Result<Patient, PatientError> {
        let email = email.trim().to_lowercase();
        debug!("Resolving patient identity for: {}", email);

        if let Some(existing) = self.find_by_email(&email).await? {
            debug!("Patient already known with ID: {}", existing.id);
            return Ok(existing);
        }

        let patient_data = json!({
            "name": name,
            "email": email,
            "phone": phone,
            "created_at": chrono::Utc::now().to_rfc3339(),
        });

        let result: Result<Vec<Value>, DbError> =
            self.supabase.insert("/rest/v1/patients", patient_data).await;

        match result {
            Ok(rows) => {
                let row = rows
                    .into_iter()
                    .next()
                    .ok_or_else(|| PatientError::DatabaseError("insert returned no rows".into()))?;
                let patient: Patient = serde_json::from_value(row)
                    .map_err(|e| PatientError::DatabaseError(e.to_string()))?;
                debug!("Patient created with ID: {}", patient.id);
                Ok(patient)
            }
            // Another booker won the insert race on the unique email
            // constraint; the record exists now, so re-read it.
            Err(DbError::Conflict(_)) => {
                debug!("Concurrent insert for {}, re-reading", email);
                self.find_by_email(&email)
                    .await?
                    .ok_or_else(|| PatientError::DatabaseError("patient vanished after conflict".into()))
            }
            Err(e) => Err(map_db_error(e)),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, PatientError> {
        let path = format!("/rest/v1/patients?email=eq.{}", urlencoding::encode(email));

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        match result.into_iter().next() {
            Some(row) => {
                let patient: Patient = serde_json::from_value(row)
                    .map_err(|e| PatientError::DatabaseError(e.to_string()))?;
                Ok(Some(patient))
            }
            None => Ok(None),
        }
    }
}

fn map_db_error(e: DbError) -> PatientError {
    match e {
        DbError::Unavailable(msg) => PatientError::StorageUnavailable(msg),
        other => PatientError::DatabaseError(other.to_string()),
    }
}
