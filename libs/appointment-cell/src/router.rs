use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_appointments))
        .route("/", post(create_appointment))
        .route("/table", get(appointment_table))
        .route("/form", get(new_appointment_form))
        .route("/{appointment_id}", get(get_appointment))
        .route("/{appointment_id}", put(update_appointment))
        .route("/{appointment_id}", delete(delete_appointment))
        .route("/{appointment_id}/form", get(edit_appointment_form))
        .route("/{appointment_id}/status", patch(change_appointment_status))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
