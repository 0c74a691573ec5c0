use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn audit_log_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_audit_logs))
        .route("/table", get(audit_log_table))
        .route("/{id}", delete(delete_audit_log))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}

pub fn login_history_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_login_history))
        .route("/table", get(login_history_table))
        .route("/{id}", delete(delete_login_history))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
