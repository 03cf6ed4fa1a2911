use std::sync::Arc;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::AppError;

use crate::models::DoctorError;
use crate::services::DoctorService;

#[axum::debug_handler]
pub async fn list_doctors(State(config): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(Arc::new(SupabaseClient::new(&config)));

    let doctors = service.list_doctors().await.map_err(map_doctor_error)?;
    let total = doctors.len();

    Ok(Json(json!({
        "doctors": doctors,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(Arc::new(SupabaseClient::new(&config)));

    let doctor = service.get_doctor(&doctor_id).await.map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

fn map_doctor_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::StorageUnavailable(msg) => AppError::Unavailable(msg),
        DoctorError::DatabaseError(msg) => AppError::Database(msg),
    }
}
