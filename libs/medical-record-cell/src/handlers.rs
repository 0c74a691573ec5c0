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

use crate::models::{MedicalRecord, MedicalRecordForm, MedicalRecordListQuery};
use crate::services::MedicalRecordService;

// Patients only ever read their records.
const WRITERS: &[Role] = &[Role::Admin, Role::Staff, Role::Doctor];
const MANAGERS: &[Role] = &[Role::Admin, Role::Staff];

#[axum::debug_handler]
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<MedicalRecordListQuery>, AppError>,
) -> Result<Json<ListResponse<MedicalRecord>>, AppError> {
    let records = MedicalRecordService::new(&state)
        .list_records(&user, &query, auth.token())
        .await?;

    Ok(Json(records))
}

#[axum::debug_handler]
pub async fn record_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<MedicalRecordListQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    let records = MedicalRecordService::new(&state)
        .list_records(&user, &query, auth.token())
        .await?;

    Ok(Json(TableView::build("Medical Records", &records)))
}

#[axum::debug_handler]
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(record_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<MedicalRecord>, AppError> {
    let record = MedicalRecordService::new(&state)
        .get_visible(&user, record_id, auth.token())
        .await?;

    Ok(Json(record))
}

#[axum::debug_handler]
pub async fn new_record_form(
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<MedicalRecordForm>>, AppError> {
    require_role(&user, WRITERS, "write medical records")?;

    let mut envelope = MedicalRecordForm::open_add();
    if user.role == Role::Doctor {
        envelope.form.doctor_id = user.scope_id().to_string();
    }

    Ok(Json(envelope))
}

#[axum::debug_handler]
pub async fn edit_record_form(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(record_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<FormEnvelope<MedicalRecordForm>>, AppError> {
    require_role(&user, WRITERS, "write medical records")?;

    let record = MedicalRecordService::new(&state)
        .get_visible(&user, record_id, auth.token())
        .await?;

    Ok(Json(MedicalRecordForm::open_edit(&record_id.to_string(), &record)))
}

#[axum::debug_handler]
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(form), _): WithRejection<Json<MedicalRecordForm>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, WRITERS, "write medical records")?;

    let created = MedicalRecordService::new(&state)
        .create_record(&user, form, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_record(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(record_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<MedicalRecordForm>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, WRITERS, "write medical records")?;

    let updated = MedicalRecordService::new(&state)
        .update_record(&user, record_id, form, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(record_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, MANAGERS, "delete medical records")?;

    MedicalRecordService::new(&state)
        .delete_record(record_id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
