use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::models::PatientError;
use patient_cell::services::PatientDirectory;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

fn directory_for(mock_server: &MockServer) -> PatientDirectory {
    let config = AppConfig {
        supabase_url: mock_server.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        port: 3000,
    };
    PatientDirectory::new(Arc::new(SupabaseClient::new(&config)))
}

fn patient_json(id: Uuid, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Ann Walsh",
        "email": email,
        "phone": "0851234567",
        "created_at": Utc::now().to_rfc3339()
    })
}

#[tokio::test]
async fn resolves_existing_patient_without_writing() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "eq.ann@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            patient_json(patient_id, "ann@example.com")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let directory = directory_for(&mock_server);
    let patient = directory
        .resolve_or_create("ann@example.com", "Ann Walsh (Renamed)", "0860000000")
        .await
        .unwrap();

    // Existing identity returned as stored; name/phone are not refreshed.
    assert_eq!(patient.id, patient_id);
    assert_eq!(patient.name, "Ann Walsh");
    assert_eq!(patient.phone, "0851234567");
}

#[tokio::test]
async fn creates_patient_on_first_booking() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            patient_json(patient_id, "ann@example.com")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let directory = directory_for(&mock_server);
    let patient = directory
        .resolve_or_create("ann@example.com", "Ann Walsh", "0851234567")
        .await
        .unwrap();

    assert_eq!(patient.id, patient_id);
}

#[tokio::test]
async fn emails_are_compared_case_insensitively() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    // Only the folded form is mocked; matching proves the lookup lowercases.
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "eq.ann@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            patient_json(patient_id, "ann@example.com")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let directory = directory_for(&mock_server);
    let patient = directory
        .resolve_or_create("Ann@Example.COM", "Ann Walsh", "0851234567")
        .await
        .unwrap();

    assert_eq!(patient.id, patient_id);
}

/// Two first-time bookings race on the same email: the insert loser hits the
/// unique-email constraint and must re-read instead of surfacing an error.
#[tokio::test]
async fn duplicate_insert_race_falls_back_to_reread() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"patients_email_key\""
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            patient_json(patient_id, "ann@example.com")
        ])))
        .mount(&mock_server)
        .await;

    let directory = directory_for(&mock_server);
    let patient = directory
        .resolve_or_create("ann@example.com", "Ann Walsh", "0851234567")
        .await
        .unwrap();

    assert_eq!(patient.id, patient_id);
}

/// Concurrent resolution from the same email converges on one identity.
#[tokio::test]
async fn concurrent_resolution_returns_same_identity() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            patient_json(patient_id, "ann@example.com")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            patient_json(patient_id, "ann@example.com")
        ])))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"patients_email_key\""
        })))
        .mount(&mock_server)
        .await;

    let directory = directory_for(&mock_server);

    let (a, b) = tokio::join!(
        directory.resolve_or_create("ann@example.com", "Ann Walsh", "0851234567"),
        directory.resolve_or_create("ann@example.com", "Ann Walsh", "0851234567"),
    );

    assert_eq!(a.unwrap().id, patient_id);
    assert_eq!(b.unwrap().id, patient_id);
}

#[tokio::test]
async fn storage_outage_is_typed_as_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(503).set_body_string("storage outage"))
        .mount(&mock_server)
        .await;

    let directory = directory_for(&mock_server);
    let result = directory
        .resolve_or_create("ann@example.com", "Ann Walsh", "0851234567")
        .await;

    assert_matches!(result, Err(PatientError::StorageUnavailable(_)));
}
