use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_doctors))
        .route("/", post(create_doctor))
        .route("/table", get(doctor_table))
        .route("/form", get(new_doctor_form))
        .route("/{doctor_id}", get(get_doctor))
        .route("/{doctor_id}", put(update_doctor))
        .route("/{doctor_id}", delete(delete_doctor))
        .route("/{doctor_id}/form", get(edit_doctor_form))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
