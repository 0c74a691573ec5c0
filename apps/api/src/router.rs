use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use audit_cell::router::{audit_log_routes, login_history_routes};
use dashboard_cell::router::dashboard_routes;
use department_cell::router::department_routes;
use doctor_cell::router::doctor_routes;
use medical_record_cell::router::medical_record_routes;
use medication_cell::router::medication_routes;
use notification_cell::router::notification_routes;
use patient_cell::router::patient_routes;
use payment_cell::router::payment_routes;
use prescription_cell::router::prescription_routes;
use profile_cell::router::profile_routes;
use shared_backend::AppState;
use staff_cell::router::staff_routes;

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let backend = state.backend.probe_health().await;

    Json(json!({
        "status": "UP",
        "service": "hkare-dashboard",
        "backend": backend
    }))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "HKare dashboard gateway is running!" }))
        .route("/health", get(health))
        .with_state(state.clone())
        .nest("/staff", staff_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/payments", payment_routes(state.clone()))
        .nest("/departments", department_routes(state.clone()))
        .nest("/medical-records", medical_record_routes(state.clone()))
        .nest("/prescriptions", prescription_routes(state.clone()))
        .nest("/medications", medication_routes(state.clone()))
        .nest("/audit-logs", audit_log_routes(state.clone()))
        .nest("/login-history", login_history_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()))
        .nest("/profile", profile_routes(state.clone()))
        .nest("/dashboard", dashboard_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use shared_config::AppConfig;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_for(server: &MockServer) -> Router {
        create_router(AppState::shared(AppConfig {
            backend_url: server.uri(),
            session_secret: "test-secret".to_string(),
            ..AppConfig::default()
        }))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_backend_through_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "UP" })))
            .mount(&server)
            .await;

        let (status, body) = get_json(app_for(&server), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
        assert_eq!(body["backend"]["reachable"], true);
        assert_eq!(body["backend"]["url"], format!("{}/health", server.uri()));
    }

    #[tokio::test]
    async fn screens_require_a_session() {
        let server = MockServer::start().await;

        let response = app_for(&server)
            .oneshot(Request::builder().uri("/patients").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
