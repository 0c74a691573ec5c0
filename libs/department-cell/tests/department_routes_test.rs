use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use department_cell::router::department_routes;
use shared_backend::AppState;
use shared_utils::test_utils::{JwtTestUtils, MockBackendResponses, TestConfig, TestUser};

fn create_test_app(server: &MockServer) -> Router {
    department_routes(AppState::shared(TestConfig::with_backend(&server.uri()).to_app_config()))
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
async fn test_every_role_can_search_departments() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::department(1, "Cardiology"),
            MockBackendResponses::department(2, "Neurology"),
        ])))
        .mount(&server)
        .await;

    let (status, body) = call(create_test_app(&server), "GET", "/?search=neuro", &TestUser::patient("p@hkare.test"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], 1);
    assert_eq!(body["items"][0]["name"], "Neurology");
}

#[tokio::test]
async fn test_staff_cannot_edit_departments() {
    let server = MockServer::start().await;

    let (status, body) = call(
        create_test_app(&server),
        "POST",
        "/",
        &TestUser::staff("s@hkare.test"),
        Some(json!({ "name": "Radiology" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "staff users cannot manage departments");
}

#[tokio::test]
async fn test_plain_text_conflict_is_passed_through() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/departments/1"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_string("Cannot delete department: it is still referenced by doctors or staff"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(create_test_app(&server), "DELETE", "/1", &TestUser::admin("a@hkare.test"), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cannot delete department: it is still referenced by doctors or staff");
}

#[tokio::test]
async fn test_empty_table_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (status, body) = call(create_test_app(&server), "GET", "/table", &TestUser::admin("a@hkare.test"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["emptyMessage"], "No departments found");
}
