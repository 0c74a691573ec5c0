use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::{extract::WithRejection, TypedHeader};
use headers::{authorization::Bearer, Authorization};
use serde_json::Value;

use shared_backend::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::form::FormEnvelope;

use crate::models::{Profile, ProfileForm};
use crate::services::ProfileService;

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Profile>, AppError> {
    let profile = ProfileService::new(&state)
        .get_profile(&user, auth.token())
        .await?;

    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn profile_form(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<ProfileForm>>, AppError> {
    let envelope = ProfileService::new(&state)
        .open_form(&user, auth.token())
        .await?;

    Ok(Json(envelope))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, AppError>,
) -> Result<Json<Value>, AppError> {
    let updated = ProfileService::new(&state)
        .update_profile(&user, body, auth.token())
        .await?;

    Ok(Json(updated))
}
