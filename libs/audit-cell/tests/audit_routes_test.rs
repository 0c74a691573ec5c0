use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use audit_cell::router::{audit_log_routes, login_history_routes};
use shared_backend::AppState;
use shared_utils::test_utils::{JwtTestUtils, MockBackendResponses, TestConfig, TestUser};

fn state(server: &MockServer) -> std::sync::Arc<AppState> {
    AppState::shared(TestConfig::with_backend(&server.uri()).to_app_config())
}

async fn call(app: Router, method: &str, uri: &str, user: &TestUser) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", JwtTestUtils::bearer(user))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

#[tokio::test]
async fn test_audit_entity_mode_queries_backend() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/audit-logs/entity"))
        .and(query_param("entityType", "Patient"))
        .and(query_param("entityId", "PAT-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::audit_log(1, "admin", "UPDATE", "Patient"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(
        audit_log_routes(state(&server)),
        "GET",
        "/?mode=entity&entity_type=Patient&entity_id=PAT-1",
        &TestUser::admin("a@hkare.test"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["entityType"], "Patient");
}

#[tokio::test]
async fn test_audit_action_mode_without_action_lists_all() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/audit-logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::audit_log(1, "admin", "CREATE", "Doctor"),
            MockBackendResponses::audit_log(2, "staff", "DELETE", "Payment"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(
        audit_log_routes(state(&server)),
        "GET",
        "/table?mode=action&search=payment",
        &TestUser::admin("a@hkare.test"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["rows"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["rows"][0][1], "staff");
}

#[tokio::test]
async fn test_staff_cannot_view_audit_logs() {
    let server = MockServer::start().await;

    let (status, body) = call(audit_log_routes(state(&server)), "GET", "/", &TestUser::staff("s@hkare.test")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "staff users cannot view audit logs");
}

#[tokio::test]
async fn test_audit_reversed_range_is_bad_request() {
    let server = MockServer::start().await;

    let (status, _) = call(
        audit_log_routes(state(&server)),
        "GET",
        "/?mode=date-range&start=2024-03-05&end=2024-03-01",
        &TestUser::admin("a@hkare.test"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_date_range_lists_all_audit_logs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/audit-logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::audit_log(1, "admin", "CREATE", "Doctor"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(
        audit_log_routes(state(&server)),
        "GET",
        "/?mode=date-range&start=&end=",
        &TestUser::admin("a@hkare.test"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_blank_mode_lists_all_login_history() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/login-history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::login_history(1, "admin", true),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(
        login_history_routes(state(&server)),
        "GET",
        "/?mode=&username=&start=&end=",
        &TestUser::admin("a@hkare.test"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_failed_logins_table() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/login-history/failed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::login_history(4, "mallory", false),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(
        login_history_routes(state(&server)),
        "GET",
        "/table?mode=failed",
        &TestUser::admin("a@hkare.test"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Login History");
    assert_eq!(body["rows"][0][2], "Failed");
    assert_eq!(body["rows"][0][3], "Bad credentials");
}

#[tokio::test]
async fn test_login_history_date_range() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/login-history/date-range"))
        .and(query_param("start", "2024-03-01T00:00:00"))
        .and(query_param("end", "2024-03-01T23:59:59"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::login_history(5, "admin", true),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(
        login_history_routes(state(&server)),
        "GET",
        "/?mode=date-range&start=2024-03-01&end=2024-03-01",
        &TestUser::admin("a@hkare.test"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["loginSuccess"], true);
}

#[tokio::test]
async fn test_delete_login_history_entry() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/login-history/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _) = call(login_history_routes(state(&server)), "DELETE", "/5", &TestUser::admin("a@hkare.test")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
