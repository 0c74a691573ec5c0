use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn patient_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_patients))
        .route("/", post(create_patient))
        .route("/table", get(patient_table))
        .route("/form", get(new_patient_form))
        .route("/{patient_id}", get(get_patient))
        .route("/{patient_id}", put(update_patient))
        .route("/{patient_id}", delete(delete_patient))
        .route("/{patient_id}/form", get(edit_patient_form))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
