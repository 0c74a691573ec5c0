use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medication_cell::router::medication_routes;
use shared_backend::AppState;
use shared_utils::test_utils::{JwtTestUtils, MockBackendResponses, TestConfig, TestUser};

fn create_test_app(server: &MockServer) -> Router {
    medication_routes(AppState::shared(TestConfig::with_backend(&server.uri()).to_app_config()))
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

async fn mount_catalogue(server: &MockServer) {
    let mut otc = MockBackendResponses::medication(3, "Paracetamol", 200, 20);
    otc["requiresPrescription"] = json!(false);
    otc["type"] = json!("ANALGESIC");

    Mock::given(method("GET"))
        .and(path("/api/medications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::medication(1, "Amoxicillin", 5, 10),
            MockBackendResponses::medication(2, "Azithromycin", 80, 10),
            otc,
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_doctor_lists_low_stock_medications() {
    let server = MockServer::start().await;
    mount_catalogue(&server).await;

    let (status, body) = call(
        create_test_app(&server),
        "GET",
        "/?low_stock=true",
        &TestUser::doctor("d@hkare.test"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["matched"], 1);
    assert_eq!(body["items"][0]["name"], "Amoxicillin");
}

#[tokio::test]
async fn test_type_and_prescription_filters_combine() {
    let server = MockServer::start().await;
    mount_catalogue(&server).await;

    let (status, body) = call(
        create_test_app(&server),
        "GET",
        "/?type=antibiotic&requires_prescription=true&search=azi",
        &TestUser::staff("s@hkare.test"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], 1);
    assert_eq!(body["items"][0]["medicationId"], 2);
}

#[tokio::test]
async fn test_patients_cannot_browse_medications() {
    let server = MockServer::start().await;

    let (status, body) = call(create_test_app(&server), "GET", "/", &TestUser::patient("p@hkare.test"), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "patient users cannot view medications");
}

#[tokio::test]
async fn test_doctor_cannot_edit_catalogue() {
    let server = MockServer::start().await;

    let (status, _) = call(
        create_test_app(&server),
        "POST",
        "/",
        &TestUser::doctor("d@hkare.test"),
        Some(json!({ "name": "Aspirin", "type": "ANALGESIC" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_parses_text_inputs() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/medications"))
        .and(body_partial_json(json!({
            "name": "Aspirin",
            "type": "ANALGESIC",
            "price": 3.25,
            "stockQuantity": 40,
            "reorderLevel": 10
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(MockBackendResponses::medication(9, "Aspirin", 40, 10)))
        .expect(1)
        .mount(&server)
        .await;

    let form = json!({
        "name": "Aspirin",
        "type": "analgesic",
        "dosageUnit": "MG",
        "price": "3.25",
        "stockQuantity": "40",
        "reorderLevel": "10"
    });

    let (status, body) = call(create_test_app(&server), "POST", "/", &TestUser::admin("a@hkare.test"), Some(form)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["medicationId"], 9);
}

#[tokio::test]
async fn test_stock_subtraction_sends_negative_delta() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/medications/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::medication(1, "Amoxicillin", 30, 10)))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/medications/1/stock"))
        .and(query_param("quantity", "-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::medication(1, "Amoxicillin", 25, 10)))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = call(
        create_test_app(&server),
        "POST",
        "/1/stock",
        &TestUser::staff("s@hkare.test"),
        Some(json!({ "quantity": 5, "action": "SUBTRACT" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stockQuantity"], 25);
}

#[tokio::test]
async fn test_stock_cannot_go_below_zero() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/medications/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::medication(1, "Amoxicillin", 3, 10)))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/medications/1/stock"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = call(
        create_test_app(&server),
        "POST",
        "/1/stock",
        &TestUser::staff("s@hkare.test"),
        Some(json!({ "quantity": 5, "action": "SUBTRACT" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["message"], "Only 3 units in stock");
}

#[tokio::test]
async fn test_stock_addition_skips_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/medications/4/stock"))
        .and(query_param("quantity", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::medication(4, "Ibuprofen", 62, 10)))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _) = call(
        create_test_app(&server),
        "POST",
        "/4/stock",
        &TestUser::admin("a@hkare.test"),
        Some(json!({ "quantity": 12, "action": "ADD" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_blank_flag_filters_list_whole_catalogue() {
    let server = MockServer::start().await;
    mount_catalogue(&server).await;

    let (status, body) = call(
        create_test_app(&server),
        "GET",
        "/?search=&type=&low_stock=&requires_prescription=",
        &TestUser::doctor("d@hkare.test"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], 3);
}
