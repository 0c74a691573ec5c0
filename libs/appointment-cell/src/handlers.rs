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

use crate::models::{Appointment, AppointmentForm, AppointmentListQuery, StatusChange};
use crate::services::AppointmentService;

const MANAGERS: &[Role] = &[Role::Admin, Role::Staff];
const BOOKERS: &[Role] = &[Role::Admin, Role::Staff, Role::Patient];
const EDITORS: &[Role] = &[Role::Admin, Role::Staff, Role::Doctor];

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<AppointmentListQuery>, AppError>,
) -> Result<Json<ListResponse<Appointment>>, AppError> {
    let appointments = AppointmentService::new(&state)
        .list_appointments(&user, &query, auth.token())
        .await?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn appointment_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<AppointmentListQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    let appointments = AppointmentService::new(&state)
        .list_appointments(&user, &query, auth.token())
        .await?;

    Ok(Json(TableView::build("Appointments", &appointments)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(appointment_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = AppointmentService::new(&state)
        .get_visible(&user, appointment_id, auth.token())
        .await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn new_appointment_form(
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<AppointmentForm>>, AppError> {
    require_role(&user, BOOKERS, "book appointments")?;

    let mut envelope = AppointmentForm::open_add();
    if user.role == Role::Patient {
        envelope.form.patient_id = user.scope_id().to_string();
    }

    Ok(Json(envelope))
}

#[axum::debug_handler]
pub async fn edit_appointment_form(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(appointment_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<FormEnvelope<AppointmentForm>>, AppError> {
    require_role(&user, EDITORS, "edit appointments")?;

    let appointment = AppointmentService::new(&state)
        .get_visible(&user, appointment_id, auth.token())
        .await?;

    Ok(Json(AppointmentForm::open_edit(&appointment_id.to_string(), &appointment)))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(form), _): WithRejection<Json<AppointmentForm>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, BOOKERS, "book appointments")?;

    let created = AppointmentService::new(&state)
        .create_appointment(&user, form, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(appointment_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<AppointmentForm>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, EDITORS, "edit appointments")?;

    let updated = AppointmentService::new(&state)
        .update_appointment(&user, appointment_id, form, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn change_appointment_status(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(appointment_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(change), _): WithRejection<Json<StatusChange>, AppError>,
) -> Result<Json<Value>, AppError> {
    let updated = AppointmentService::new(&state)
        .change_status(&user, appointment_id, &change.status, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(appointment_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, MANAGERS, "delete appointments")?;

    AppointmentService::new(&state)
        .delete_appointment(appointment_id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
