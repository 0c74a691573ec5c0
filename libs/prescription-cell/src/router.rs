use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn prescription_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_prescriptions))
        .route("/", post(create_prescription))
        .route("/table", get(prescription_table))
        .route("/form", get(new_prescription_form))
        .route("/{prescription_id}", get(get_prescription))
        .route("/{prescription_id}", put(update_prescription))
        .route("/{prescription_id}", delete(delete_prescription))
        .route("/{prescription_id}/form", get(edit_prescription_form))
        .route("/{prescription_id}/status/{status}", put(change_prescription_status))
        .route("/{prescription_id}/refill", post(process_refill))
        .route("/{prescription_id}/refill-request", post(request_refill))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
