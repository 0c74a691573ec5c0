use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::{extract::WithRejection, TypedHeader};
use headers::{authorization::Bearer, Authorization};
use serde_json::Value;

use shared_backend::AppState;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_models::form::{FormEnvelope, ModalForm};
use shared_models::listing::{ListResponse, TableView};
use shared_utils::extractor::require_role;

use crate::models::{RegistrationResponse, Staff, StaffForm, StaffListQuery};
use crate::services::StaffService;

const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[axum::debug_handler]
pub async fn list_staff(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<StaffListQuery>, AppError>,
) -> Result<Json<ListResponse<Staff>>, AppError> {
    require_role(&user, ADMIN_ONLY, "manage staff")?;

    let staff = StaffService::new(&state)
        .list_staff(&query, auth.token())
        .await?;

    Ok(Json(staff))
}

#[axum::debug_handler]
pub async fn staff_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<StaffListQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    require_role(&user, ADMIN_ONLY, "manage staff")?;

    let staff = StaffService::new(&state)
        .list_staff(&query, auth.token())
        .await?;

    Ok(Json(TableView::build("Staff", &staff)))
}

#[axum::debug_handler]
pub async fn get_staff(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(staff_id), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<Staff>, AppError> {
    if !(user.is_admin() || user.owns(Some(staff_id.as_str()))) {
        require_role(&user, ADMIN_ONLY, "view other staff members")?;
    }

    let staff = StaffService::new(&state)
        .get_staff(&staff_id, auth.token())
        .await?;

    Ok(Json(staff))
}

#[axum::debug_handler]
pub async fn new_staff_form(
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<StaffForm>>, AppError> {
    require_role(&user, ADMIN_ONLY, "manage staff")?;
    Ok(Json(StaffForm::open_add()))
}

#[axum::debug_handler]
pub async fn edit_staff_form(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(staff_id), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<FormEnvelope<StaffForm>>, AppError> {
    require_role(&user, ADMIN_ONLY, "manage staff")?;

    let staff = StaffService::new(&state)
        .get_staff(&staff_id, auth.token())
        .await?;

    Ok(Json(StaffForm::open_edit(&staff_id, &staff)))
}

#[axum::debug_handler]
pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(form), _): WithRejection<Json<StaffForm>, AppError>,
) -> Result<(StatusCode, Json<RegistrationResponse>), AppError> {
    require_role(&user, ADMIN_ONLY, "manage staff")?;

    let registration = StaffService::new(&state)
        .create_staff(form, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(registration)))
}

#[axum::debug_handler]
pub async fn update_staff(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(staff_id), _): WithRejection<Path<String>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<StaffForm>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, ADMIN_ONLY, "manage staff")?;

    let updated = StaffService::new(&state)
        .update_staff(&staff_id, form, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_staff(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(staff_id), _): WithRejection<Path<String>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, ADMIN_ONLY, "manage staff")?;

    if user.owns(Some(staff_id.as_str())) {
        return Err(AppError::Conflict("You cannot delete your own account".to_string()));
    }

    StaffService::new(&state)
        .delete_staff(&staff_id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
