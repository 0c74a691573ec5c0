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

use crate::models::{Medication, MedicationForm, MedicationListQuery, StockAdjustment};
use crate::services::MedicationService;

const READERS: &[Role] = &[Role::Admin, Role::Staff, Role::Doctor];
const MANAGERS: &[Role] = &[Role::Admin, Role::Staff];

#[axum::debug_handler]
pub async fn list_medications(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<MedicationListQuery>, AppError>,
) -> Result<Json<ListResponse<Medication>>, AppError> {
    require_role(&user, READERS, "view medications")?;

    let medications = MedicationService::new(&state)
        .list_medications(&query, auth.token())
        .await?;

    Ok(Json(medications))
}

#[axum::debug_handler]
pub async fn medication_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<MedicationListQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    require_role(&user, READERS, "view medications")?;

    let medications = MedicationService::new(&state)
        .list_medications(&query, auth.token())
        .await?;

    Ok(Json(TableView::build("Medications", &medications)))
}

#[axum::debug_handler]
pub async fn get_medication(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(medication_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Medication>, AppError> {
    require_role(&user, READERS, "view medications")?;

    let medication = MedicationService::new(&state)
        .get_medication(medication_id, auth.token())
        .await?;

    Ok(Json(medication))
}

#[axum::debug_handler]
pub async fn new_medication_form(
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<MedicationForm>>, AppError> {
    require_role(&user, MANAGERS, "manage medications")?;
    Ok(Json(MedicationForm::open_add()))
}

#[axum::debug_handler]
pub async fn edit_medication_form(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(medication_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<FormEnvelope<MedicationForm>>, AppError> {
    require_role(&user, MANAGERS, "manage medications")?;

    let medication = MedicationService::new(&state)
        .get_medication(medication_id, auth.token())
        .await?;

    Ok(Json(MedicationForm::open_edit(&medication_id.to_string(), &medication)))
}

#[axum::debug_handler]
pub async fn create_medication(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(form), _): WithRejection<Json<MedicationForm>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, MANAGERS, "manage medications")?;

    let created = MedicationService::new(&state)
        .create_medication(form, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_medication(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(medication_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<MedicationForm>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, MANAGERS, "manage medications")?;

    let updated = MedicationService::new(&state)
        .update_medication(medication_id, form, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn adjust_stock(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(medication_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(adjustment), _): WithRejection<Json<StockAdjustment>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, MANAGERS, "manage medications")?;

    let updated = MedicationService::new(&state)
        .adjust_stock(medication_id, adjustment, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_medication(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(medication_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, MANAGERS, "manage medications")?;

    MedicationService::new(&state)
        .delete_medication(medication_id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
