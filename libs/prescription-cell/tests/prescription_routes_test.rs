use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prescription_cell::router::prescription_routes;
use shared_backend::AppState;
use shared_utils::test_utils::{JwtTestUtils, MockBackendResponses, TestConfig, TestUser};

fn create_test_app(server: &MockServer) -> Router {
    prescription_routes(AppState::shared(TestConfig::with_backend(&server.uri()).to_app_config()))
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

async fn mount_prescription(server: &MockServer, prescription: Value) {
    let id = prescription["prescriptionId"].as_i64().unwrap_or_default();
    Mock::given(method("GET"))
        .and(path(format!("/api/prescriptions/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(prescription))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_staff_filters_by_status_and_day() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/prescriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::prescription(1, "PAT-1", "DOC-1", "ACTIVE", "2024-03-01"),
            MockBackendResponses::prescription(2, "PAT-1", "DOC-1", "EXPIRED", "2024-03-01"),
            MockBackendResponses::prescription(3, "PAT-2", "DOC-1", "ACTIVE", "2024-03-02"),
        ])))
        .mount(&server)
        .await;

    let (status, body) = call(
        create_test_app(&server),
        "GET",
        "/?status=active&date=2024-03-01",
        &TestUser::staff("s@hkare.test"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["matched"], 1);
    assert_eq!(body["items"][0]["prescriptionId"], 1);
}

#[tokio::test]
async fn test_search_matches_prescription_id() {
    let server = MockServer::start().await;
    let doctor = TestUser::doctor("d@hkare.test").with_role_id("DOC-1");

    Mock::given(method("GET"))
        .and(path("/api/prescriptions/doctor/DOC-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::prescription(12, "PAT-1", "DOC-1", "ACTIVE", "2024-03-01"),
            MockBackendResponses::prescription(40, "PAT-2", "DOC-1", "ACTIVE", "2024-03-01"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(create_test_app(&server), "GET", "/table?search=12", &doctor, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["rows"][0][3], "Amoxicillin");
}

#[tokio::test]
async fn test_create_drops_blank_lines_and_sets_expiry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/prescriptions"))
        .and(body_partial_json(json!({
            "patientId": "PAT-1",
            "doctorId": "DOC-1",
            "prescriptionDate": "2024-03-01",
            "expiryDate": "2024-03-31",
            "status": "ACTIVE",
            "medications": [{ "medicationName": "Amoxicillin", "quantity": 21 }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            MockBackendResponses::prescription(5, "PAT-1", "DOC-1", "ACTIVE", "2024-03-01"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let form = json!({
        "patientId": "PAT-1",
        "doctorId": "DOC-1",
        "prescriptionDate": "2024-03-01",
        "status": "ACTIVE",
        "medications": [
            { "medicationName": "Amoxicillin", "quantity": "21" },
            { "medicationName": "", "quantity": "1" }
        ]
    });

    let (status, body) = call(create_test_app(&server), "POST", "/", &TestUser::admin("a@hkare.test"), Some(form)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["prescriptionId"], 5);
}

#[tokio::test]
async fn test_create_without_medications_is_rejected() {
    let server = MockServer::start().await;

    let form = json!({
        "patientId": "PAT-1",
        "doctorId": "DOC-1",
        "medications": [{ "medicationName": "  " }]
    });

    let (status, body) = call(create_test_app(&server), "POST", "/", &TestUser::staff("s@hkare.test"), Some(form)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "medications");
}

#[tokio::test]
async fn test_status_change_uses_path_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/prescriptions/7/status/CANCELLED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::prescription(7, "PAT-1", "DOC-1", "CANCELLED", "2024-03-01"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(
        create_test_app(&server),
        "PUT",
        "/7/status/cancelled",
        &TestUser::staff("s@hkare.test"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
}

#[tokio::test]
async fn test_doctor_processes_refill() {
    let server = MockServer::start().await;
    let doctor = TestUser::doctor("d@hkare.test").with_role_id("DOC-1");

    mount_prescription(&server, MockBackendResponses::prescription(8, "PAT-1", "DOC-1", "ACTIVE", "2024-03-01")).await;

    let mut refilled = MockBackendResponses::prescription(8, "PAT-1", "DOC-1", "ACTIVE", "2024-03-01");
    refilled["refillsRemaining"] = json!(1);
    Mock::given(method("POST"))
        .and(path("/api/prescriptions/8/refill"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refilled))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(create_test_app(&server), "POST", "/8/refill", &doctor, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refillsRemaining"], 1);
}

#[tokio::test]
async fn test_refill_of_exhausted_prescription_conflicts() {
    let server = MockServer::start().await;

    let mut exhausted = MockBackendResponses::prescription(9, "PAT-1", "DOC-1", "ACTIVE", "2024-03-01");
    exhausted["refillsRemaining"] = json!(0);
    mount_prescription(&server, exhausted).await;

    let (status, _) = call(create_test_app(&server), "POST", "/9/refill", &TestUser::admin("a@hkare.test"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_patient_refill_request_notifies_doctor() {
    let server = MockServer::start().await;
    let patient = TestUser::patient("p@hkare.test").with_role_id("PAT-1");

    mount_prescription(&server, MockBackendResponses::prescription(10, "PAT-1", "DOC-1", "ACTIVE", "2024-03-01")).await;

    Mock::given(method("POST"))
        .and(path("/api/notifications"))
        .and(body_partial_json(json!({
            "title": "Prescription refill request",
            "recipientType": "DOCTOR",
            "recipientId": "DOC-1",
            "senderUsername": "p@hkare.test",
            "isRead": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::notification(30, "DOCTOR", "DOC-1", false),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(
        create_test_app(&server),
        "POST",
        "/10/refill-request",
        &patient,
        Some(json!({ "reason": "Running low" })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["id"], 30);
}

#[tokio::test]
async fn test_refill_request_needs_a_reason() {
    let server = MockServer::start().await;
    let patient = TestUser::patient("p@hkare.test").with_role_id("PAT-1");

    let (status, body) = call(
        create_test_app(&server),
        "POST",
        "/10/refill-request",
        &patient,
        Some(json!({ "reason": " " })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "reason");
}

#[tokio::test]
async fn test_patient_cannot_see_other_patients_prescription() {
    let server = MockServer::start().await;
    let patient = TestUser::patient("p@hkare.test").with_role_id("PAT-1");

    mount_prescription(&server, MockBackendResponses::prescription(11, "PAT-2", "DOC-1", "ACTIVE", "2024-03-01")).await;

    let (status, body) = call(create_test_app(&server), "GET", "/11", &patient, None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You can only access your own prescriptions");
}
