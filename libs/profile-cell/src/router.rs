use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_backend::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn profile_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(get_profile))
        .route("/", put(update_profile))
        .route("/form", get(profile_form))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
