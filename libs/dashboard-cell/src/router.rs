use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn dashboard_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(get_dashboard))
        .route("/admin", get(admin_dashboard))
        .route("/doctor", get(doctor_dashboard))
        .route("/patient", get(patient_dashboard))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
