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

use crate::models::{Department, DepartmentForm, DepartmentListQuery};
use crate::services::DepartmentService;

const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[axum::debug_handler]
pub async fn list_departments(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    WithRejection(Query(query), _): WithRejection<Query<DepartmentListQuery>, AppError>,
) -> Result<Json<ListResponse<Department>>, AppError> {
    let departments = DepartmentService::new(&state)
        .list_departments(&query, auth.token())
        .await?;

    Ok(Json(departments))
}

#[axum::debug_handler]
pub async fn department_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    WithRejection(Query(query), _): WithRejection<Query<DepartmentListQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    let departments = DepartmentService::new(&state)
        .list_departments(&query, auth.token())
        .await?;

    Ok(Json(TableView::build("Departments", &departments)))
}

#[axum::debug_handler]
pub async fn get_department(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    WithRejection(Path(department_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Department>, AppError> {
    let department = DepartmentService::new(&state)
        .get_department(department_id, auth.token())
        .await?;

    Ok(Json(department))
}

#[axum::debug_handler]
pub async fn new_department_form(
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<DepartmentForm>>, AppError> {
    require_role(&user, ADMIN_ONLY, "manage departments")?;
    Ok(Json(DepartmentForm::open_add()))
}

#[axum::debug_handler]
pub async fn edit_department_form(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(department_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<FormEnvelope<DepartmentForm>>, AppError> {
    require_role(&user, ADMIN_ONLY, "manage departments")?;

    let department = DepartmentService::new(&state)
        .get_department(department_id, auth.token())
        .await?;

    Ok(Json(DepartmentForm::open_edit(&department_id.to_string(), &department)))
}

#[axum::debug_handler]
pub async fn create_department(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(form), _): WithRejection<Json<DepartmentForm>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, ADMIN_ONLY, "manage departments")?;

    let created = DepartmentService::new(&state)
        .create_department(form, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_department(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(department_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<DepartmentForm>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, ADMIN_ONLY, "manage departments")?;

    let updated = DepartmentService::new(&state)
        .update_department(department_id, form, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_department(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(department_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, ADMIN_ONLY, "manage departments")?;

    DepartmentService::new(&state)
        .delete_department(department_id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
