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

use crate::models::{Prescription, PrescriptionForm, PrescriptionListQuery, RefillRequest};
use crate::services::PrescriptionService;

const PRESCRIBERS: &[Role] = &[Role::Admin, Role::Staff, Role::Doctor];
const REFILLERS: &[Role] = &[Role::Admin, Role::Doctor];
const MANAGERS: &[Role] = &[Role::Admin, Role::Staff];

#[axum::debug_handler]
pub async fn list_prescriptions(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<PrescriptionListQuery>, AppError>,
) -> Result<Json<ListResponse<Prescription>>, AppError> {
    let prescriptions = PrescriptionService::new(&state)
        .list_prescriptions(&user, &query, auth.token())
        .await?;

    Ok(Json(prescriptions))
}

#[axum::debug_handler]
pub async fn prescription_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<PrescriptionListQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    let prescriptions = PrescriptionService::new(&state)
        .list_prescriptions(&user, &query, auth.token())
        .await?;

    Ok(Json(TableView::build("Prescriptions", &prescriptions)))
}

#[axum::debug_handler]
pub async fn get_prescription(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(prescription_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Prescription>, AppError> {
    let prescription = PrescriptionService::new(&state)
        .get_visible(&user, prescription_id, auth.token())
        .await?;

    Ok(Json(prescription))
}

#[axum::debug_handler]
pub async fn new_prescription_form(
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<PrescriptionForm>>, AppError> {
    require_role(&user, PRESCRIBERS, "write prescriptions")?;

    let mut envelope = PrescriptionForm::open_add();
    if user.role == Role::Doctor {
        envelope.form.doctor_id = user.scope_id().to_string();
    }

    Ok(Json(envelope))
}

#[axum::debug_handler]
pub async fn edit_prescription_form(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(prescription_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<FormEnvelope<PrescriptionForm>>, AppError> {
    require_role(&user, PRESCRIBERS, "write prescriptions")?;

    let prescription = PrescriptionService::new(&state)
        .get_visible(&user, prescription_id, auth.token())
        .await?;

    Ok(Json(PrescriptionForm::open_edit(&prescription_id.to_string(), &prescription)))
}

#[axum::debug_handler]
pub async fn create_prescription(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(form), _): WithRejection<Json<PrescriptionForm>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, PRESCRIBERS, "write prescriptions")?;

    let created = PrescriptionService::new(&state)
        .create_prescription(&user, form, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_prescription(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(prescription_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<PrescriptionForm>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, PRESCRIBERS, "write prescriptions")?;

    let updated = PrescriptionService::new(&state)
        .update_prescription(&user, prescription_id, form, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn change_prescription_status(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path((prescription_id, status)), _): WithRejection<Path<(i64, String)>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, PRESCRIBERS, "change prescription status")?;

    let updated = PrescriptionService::new(&state)
        .change_status(&user, prescription_id, &status, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn process_refill(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(prescription_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, REFILLERS, "process refills")?;

    let refilled = PrescriptionService::new(&state)
        .process_refill(&user, prescription_id, auth.token())
        .await?;

    Ok(Json(refilled))
}

#[axum::debug_handler]
pub async fn request_refill(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(prescription_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<RefillRequest>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, &[Role::Patient], "request refills")?;

    let notification = PrescriptionService::new(&state)
        .request_refill(&user, prescription_id, request, auth.token())
        .await?;

    Ok((StatusCode::ACCEPTED, Json(notification)))
}

#[axum::debug_handler]
pub async fn delete_prescription(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(prescription_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, MANAGERS, "delete prescriptions")?;

    PrescriptionService::new(&state)
        .delete_prescription(prescription_id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
