use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn payment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_payments))
        .route("/", post(create_payment))
        .route("/table", get(payment_table))
        .route("/summary", get(payment_summary))
        .route("/form", get(new_payment_form))
        .route("/appointment-options", get(appointment_options))
        .route("/{payment_id}", get(get_payment))
        .route("/{payment_id}", put(update_payment))
        .route("/{payment_id}", delete(delete_payment))
        .route("/{payment_id}/form", get(edit_payment_form))
        .route("/{payment_id}/status", patch(change_payment_status))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
