use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medical_record_cell::router::medical_record_routes;
use shared_backend::AppState;
use shared_utils::test_utils::{JwtTestUtils, MockBackendResponses, TestConfig, TestUser};

fn create_test_app(server: &MockServer) -> Router {
    medical_record_routes(AppState::shared(TestConfig::with_backend(&server.uri()).to_app_config()))
}

async fn call(app: Router, method: &str, uri: &str, user: &TestUser, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", JwtTestUtils::bearer(user))
        .header("Content-Type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

#[tokio::test]
async fn test_patient_reads_own_records_filtered_by_type() {
    let server = MockServer::start().await;
    let patient = TestUser::patient("p@hkare.test").with_role_id("PAT-1");

    Mock::given(method("GET"))
        .and(path("/api/medical-records/patient/PAT-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::medical_record(1, "PAT-1", "DOC-1", "GENERAL_CHECKUP", "2024-02-01"),
            MockBackendResponses::medical_record(2, "PAT-1", "DOC-1", "LAB_TEST", "2024-02-10"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(create_test_app(&server), "GET", "/?record_type=lab%20test", &patient, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["matched"], 1);
    assert_eq!(body["items"][0]["recordId"], 2);
}

#[tokio::test]
async fn test_patient_cannot_write_records() {
    let server = MockServer::start().await;

    let (status, _) = call(
        create_test_app(&server),
        "POST",
        "/",
        &TestUser::patient("p@hkare.test"),
        Some(json!({ "diagnosis": "Self-diagnosed" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_doctor_creates_record_under_own_id() {
    let server = MockServer::start().await;
    let doctor = TestUser::doctor("d@hkare.test").with_role_id("DOC-1");

    Mock::given(method("POST"))
        .and(path("/api/medical-records"))
        .and(body_partial_json(json!({
            "doctorId": "DOC-1",
            "patientId": "PAT-1",
            "recordType": "GENERAL_CHECKUP",
            "recordDate": "2024-03-01T00:00:00",
            "nextAppointment": null
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            MockBackendResponses::medical_record(3, "PAT-1", "DOC-1", "GENERAL_CHECKUP", "2024-03-01"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let form = json!({
        "patientId": "PAT-1",
        "doctorId": "DOC-9",
        "recordType": "GENERAL_CHECKUP",
        "diagnosis": "Hypertension",
        "recordDate": "2024-03-01"
    });

    let (status, body) = call(create_test_app(&server), "POST", "/", &doctor, Some(form)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["recordId"], 3);
}

#[tokio::test]
async fn test_doctor_cannot_edit_colleagues_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/medical-records/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::medical_record(4, "PAT-1", "DOC-2", "SURGERY", "2024-03-01"),
        ))
        .mount(&server)
        .await;

    let doctor = TestUser::doctor("d@hkare.test").with_role_id("DOC-1");
    let form = json!({
        "patientId": "PAT-1",
        "recordType": "SURGERY",
        "diagnosis": "Appendicitis"
    });

    let (status, body) = call(create_test_app(&server), "PUT", "/4", &doctor, Some(form)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You can only access your own medical records");
}

#[tokio::test]
async fn test_edit_form_copies_record_dates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/medical-records/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::medical_record(4, "PAT-1", "DOC-2", "SURGERY", "2024-03-01"),
        ))
        .mount(&server)
        .await;

    let (status, body) = call(create_test_app(&server), "GET", "/4/form", &TestUser::staff("s@hkare.test"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Edit Medical Record");
    assert_eq!(body["form"]["recordDate"], "2024-03-01");
    assert_eq!(body["form"]["recordType"], "SURGERY");
    assert_eq!(body["form"]["nextAppointment"], "");
}
