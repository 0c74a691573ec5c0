use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn medical_record_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_records))
        .route("/", post(create_record))
        .route("/table", get(record_table))
        .route("/form", get(new_record_form))
        .route("/{record_id}", get(get_record))
        .route("/{record_id}", put(update_record))
        .route("/{record_id}", delete(delete_record))
        .route("/{record_id}/form", get(edit_record_form))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
