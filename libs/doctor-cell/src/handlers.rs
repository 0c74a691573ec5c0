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

use crate::models::{Doctor, DoctorForm, DoctorListQuery};
use crate::services::DoctorService;

// Every portal can browse doctors; only the back office changes them.
const MANAGERS: &[Role] = &[Role::Admin, Role::Staff];

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    WithRejection(Query(query), _): WithRejection<Query<DoctorListQuery>, AppError>,
) -> Result<Json<ListResponse<Doctor>>, AppError> {
    let doctors = DoctorService::new(&state)
        .list_doctors(&query, auth.token())
        .await?;

    Ok(Json(doctors))
}

#[axum::debug_handler]
pub async fn doctor_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    WithRejection(Query(query), _): WithRejection<Query<DoctorListQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    let doctors = DoctorService::new(&state)
        .list_doctors(&query, auth.token())
        .await?;

    Ok(Json(TableView::build("Doctors", &doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    WithRejection(Path(doctor_id), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<Doctor>, AppError> {
    let doctor = DoctorService::new(&state)
        .get_doctor(&doctor_id, auth.token())
        .await?;

    Ok(Json(doctor))
}

#[axum::debug_handler]
pub async fn new_doctor_form(
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<DoctorForm>>, AppError> {
    require_role(&user, MANAGERS, "register doctors")?;
    Ok(Json(DoctorForm::open_add()))
}

#[axum::debug_handler]
pub async fn edit_doctor_form(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(doctor_id), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<FormEnvelope<DoctorForm>>, AppError> {
    require_role(&user, MANAGERS, "edit doctors")?;

    let doctor = DoctorService::new(&state)
        .get_doctor(&doctor_id, auth.token())
        .await?;

    Ok(Json(DoctorForm::open_edit(&doctor_id, &doctor)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(form), _): WithRejection<Json<DoctorForm>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, MANAGERS, "register doctors")?;

    let created = DoctorService::new(&state)
        .create_doctor(form, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(doctor_id), _): WithRejection<Path<String>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<DoctorForm>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, MANAGERS, "edit doctors")?;

    let updated = DoctorService::new(&state)
        .update_doctor(&doctor_id, form, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(doctor_id), _): WithRejection<Path<String>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, &[Role::Admin], "delete doctors")?;

    DoctorService::new(&state)
        .delete_doctor(&doctor_id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
