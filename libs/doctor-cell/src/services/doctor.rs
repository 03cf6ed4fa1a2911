use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use shared_database::supabase::{DbError, SupabaseClient};

use crate::models::{Doctor, DoctorError};

pub struct DoctorService {
    supabase: Arc<SupabaseClient>,
}

impl DoctorService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn get_doctor(&self, doctor_id: &str) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        let row = result.into_iter().next().ok_or(DoctorError::NotFound)?;
        serde_json::from_value(row).map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Fetching doctor directory");

        let path = "/rest/v1/doctors?order=full_name.asc";
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(map_db_error)?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }
}

fn map_db_error(e: DbError) -> DoctorError {
    match e {
        DbError::Unavailable(msg) => DoctorError::StorageUnavailable(msg),
        other => DoctorError::DatabaseError(other.to_string()),
    }
}
