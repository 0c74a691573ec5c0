use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use profile_cell::router::profile_routes;
use shared_backend::AppState;
use shared_utils::test_utils::{JwtTestUtils, MockBackendResponses, TestConfig, TestUser};

fn create_test_app(server: &MockServer) -> Router {
    profile_routes(AppState::shared(TestConfig::with_backend(&server.uri()).to_app_config()))
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
async fn test_doctor_profile_comes_from_doctors() {
    let server = MockServer::start().await;
    let doctor = TestUser::doctor("house@hkare.test").with_role_id("DOC-1");

    Mock::given(method("GET"))
        .and(path("/api/doctors/DOC-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::doctor("DOC-1", "Gregory", "House", "Diagnostics"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(create_test_app(&server), "GET", "/", &doctor, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "doctor");
    assert_eq!(body["record"]["specialization"], "Diagnostics");
}

#[tokio::test]
async fn test_admin_profile_comes_from_staff() {
    let server = MockServer::start().await;
    let admin = TestUser::admin("pam@hkare.test").with_role_id("STF-1");

    Mock::given(method("GET"))
        .and(path("/api/staff/STF-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::staff("STF-1", "Pam", "Beesly")))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(create_test_app(&server), "GET", "/", &admin, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "staff");
    assert_eq!(body["record"]["staffId"], "STF-1");
}

#[tokio::test]
async fn test_patient_form_is_prefilled() {
    let server = MockServer::start().await;
    let patient = TestUser::patient("jane@hkare.test").with_role_id("PAT-1");

    Mock::given(method("GET"))
        .and(path("/api/patients/PAT-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::patient("PAT-1", "Jane", "Doe")))
        .mount(&server)
        .await;

    let (status, body) = call(create_test_app(&server), "GET", "/form", &patient, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "edit");
    assert_eq!(body["recordId"], "PAT-1");
    assert_eq!(body["form"]["firstName"], "Jane");
    assert_eq!(body["form"]["password"], "");
}

#[tokio::test]
async fn test_staff_cannot_grant_themselves_admin() {
    let server = MockServer::start().await;
    let staff = TestUser::staff("pam@hkare.test").with_role_id("STF-1");

    Mock::given(method("GET"))
        .and(path("/api/staff/STF-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::staff("STF-1", "Pam", "Beesly")))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/staff/STF-1"))
        .and(body_partial_json(json!({ "firstName": "Pamela", "admin": false, "isAdmin": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::staff("STF-1", "Pamela", "Beesly")))
        .expect(1)
        .mount(&server)
        .await;

    let form = json!({
        "email": "pam@hkare.test",
        "firstName": "Pamela",
        "lastName": "Beesly",
        "isAdmin": true
    });

    let (status, body) = call(create_test_app(&server), "PUT", "/", &staff, Some(form)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Pamela");
}

#[tokio::test]
async fn test_profile_update_reports_field_errors() {
    let server = MockServer::start().await;
    let patient = TestUser::patient("jane@hkare.test").with_role_id("PAT-1");

    let (status, body) = call(
        create_test_app(&server),
        "PUT",
        "/",
        &patient,
        Some(json!({ "email": "", "firstName": "Jane", "lastName": "Doe" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "email");
}
