use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn department_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_departments))
        .route("/", post(create_department))
        .route("/table", get(department_table))
        .route("/form", get(new_department_form))
        .route("/{department_id}", get(get_department))
        .route("/{department_id}", put(update_department))
        .route("/{department_id}", delete(delete_department))
        .route("/{department_id}/form", get(edit_department_form))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
