use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn notification_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/", post(send_notification))
        .route("/table", get(notification_table))
        .route("/form", get(new_notification_form))
        .route("/{notification_id}", get(get_notification))
        .route("/{notification_id}", delete(delete_notification))
        .route("/{notification_id}/read", put(mark_notification_read))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
