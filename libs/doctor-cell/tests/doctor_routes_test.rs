use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::doctor_routes;
use shared_backend::AppState;
use shared_utils::test_utils::{JwtTestUtils, MockBackendResponses, TestConfig, TestUser};

fn create_test_app(server: &MockServer) -> Router {
    doctor_routes(AppState::shared(TestConfig::with_backend(&server.uri()).to_app_config()))
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

async fn mount_doctors(server: &MockServer) {
    let mut neurologist = MockBackendResponses::doctor("DOC-2", "Meredith", "Grey", "Neurology");
    neurologist["departmentId"] = json!(2);

    Mock::given(method("GET"))
        .and(path("/api/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::doctor("DOC-1", "Gregory", "House", "Cardiology"),
            neurologist,
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_patients_can_browse_doctors() {
    let server = MockServer::start().await;
    mount_doctors(&server).await;

    let (status, body) = call(create_test_app(&server), "GET", "/", &TestUser::patient("p@hkare.test"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], 2);
}

#[tokio::test]
async fn test_filters_by_department_and_specialization() {
    let server = MockServer::start().await;
    mount_doctors(&server).await;
    let staff = TestUser::staff("s@hkare.test");

    let (_, by_department) = call(create_test_app(&server), "GET", "/?department_id=2", &staff, None).await;
    assert_eq!(by_department["matched"], 1);
    assert_eq!(by_department["items"][0]["doctorId"], "DOC-2");

    let (_, by_specialty) = call(create_test_app(&server), "GET", "/?specialization=cardiology", &staff, None).await;
    assert_eq!(by_specialty["items"][0]["lastName"], "House");

    let (_, by_search) = call(create_test_app(&server), "GET", "/?search=grey", &staff, None).await;
    assert_eq!(by_search["matched"], 1);
}

#[tokio::test]
async fn test_doctor_cannot_register_doctors() {
    let server = MockServer::start().await;

    let (status, body) = call(
        create_test_app(&server),
        "POST",
        "/",
        &TestUser::doctor("d@hkare.test"),
        Some(json!({ "email": "x@hkare.test" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "doctor users cannot register doctors");
}

#[tokio::test]
async fn test_admin_updates_doctor_with_parsed_fee() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/doctors/DOC-1"))
        .and(body_partial_json(json!({ "consultationFee": 180.5, "experienceYears": 12 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::doctor("DOC-1", "Gregory", "House", "Cardiology"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let form = json!({
        "email": "house@hkare.test",
        "firstName": "Gregory",
        "lastName": "House",
        "specialization": "Cardiology",
        "experienceYears": "12",
        "consultationFee": "180.5"
    });

    let (status, body) = call(create_test_app(&server), "PUT", "/DOC-1", &TestUser::admin("a@hkare.test"), Some(form)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctorId"], "DOC-1");
}

#[tokio::test]
async fn test_missing_doctor_is_not_found() {
    let server = MockServer::start().await;

    let (status, _) = call(create_test_app(&server), "GET", "/DOC-404", &TestUser::staff("s@hkare.test"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_form_is_blank() {
    let server = MockServer::start().await;

    let (status, body) = call(create_test_app(&server), "GET", "/form", &TestUser::staff("s@hkare.test"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "add");
    assert_eq!(body["title"], "Add Doctor");
    assert_eq!(body["form"]["consultationFee"], "");
}
