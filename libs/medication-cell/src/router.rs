use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn medication_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_medications))
        .route("/", post(create_medication))
        .route("/table", get(medication_table))
        .route("/form", get(new_medication_form))
        .route("/{medication_id}", get(get_medication))
        .route("/{medication_id}", put(update_medication))
        .route("/{medication_id}", delete(delete_medication))
        .route("/{medication_id}/form", get(edit_medication_form))
        .route("/{medication_id}/stock", post(adjust_stock))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
