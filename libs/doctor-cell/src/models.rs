use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Doctor profiles are provisioned by an external process; this cell only
/// reads them for display alongside the booking flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub title: String,
    pub experience: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub working_hours: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
