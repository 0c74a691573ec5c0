use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn staff_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_staff))
        .route("/", post(create_staff))
        .route("/table", get(staff_table))
        .route("/form", get(new_staff_form))
        .route("/{staff_id}", get(get_staff))
        .route("/{staff_id}", put(update_staff))
        .route("/{staff_id}", delete(delete_staff))
        .route("/{staff_id}/form", get(edit_staff_form))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
