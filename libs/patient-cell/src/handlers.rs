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
use shared_utils::extractor::{require_owner, require_role};

use crate::models::{Patient, PatientForm, PatientListQuery};
use crate::services::PatientService;

const VIEWERS: &[Role] = &[Role::Admin, Role::Staff, Role::Doctor];
const MANAGERS: &[Role] = &[Role::Admin, Role::Staff];

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<PatientListQuery>, AppError>,
) -> Result<Json<ListResponse<Patient>>, AppError> {
    require_role(&user, VIEWERS, "browse patients")?;

    let patients = PatientService::new(&state)
        .list_patients(&query, auth.token())
        .await?;

    Ok(Json(patients))
}

#[axum::debug_handler]
pub async fn patient_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<PatientListQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    require_role(&user, VIEWERS, "browse patients")?;

    let patients = PatientService::new(&state)
        .list_patients(&query, auth.token())
        .await?;

    Ok(Json(TableView::build("Patients", &patients)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(patient_id), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<Patient>, AppError> {
    if user.role == Role::Patient {
        require_owner(&user, Some(&patient_id), "view")?;
    }

    let patient = PatientService::new(&state)
        .get_patient(&patient_id, auth.token())
        .await?;

    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn new_patient_form(
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<PatientForm>>, AppError> {
    require_role(&user, MANAGERS, "register patients")?;
    Ok(Json(PatientForm::open_add()))
}

#[axum::debug_handler]
pub async fn edit_patient_form(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(patient_id), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<FormEnvelope<PatientForm>>, AppError> {
    require_role(&user, MANAGERS, "edit patients")?;

    let patient = PatientService::new(&state)
        .get_patient(&patient_id, auth.token())
        .await?;

    Ok(Json(PatientForm::open_edit(&patient_id, &patient)))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(form), _): WithRejection<Json<PatientForm>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, MANAGERS, "register patients")?;

    let created = PatientService::new(&state)
        .create_patient(form, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(patient_id), _): WithRejection<Path<String>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<PatientForm>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, MANAGERS, "edit patients")?;

    let updated = PatientService::new(&state)
        .update_patient(&patient_id, form, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(patient_id), _): WithRejection<Path<String>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, MANAGERS, "delete patients")?;

    PatientService::new(&state)
        .delete_patient(&patient_id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
