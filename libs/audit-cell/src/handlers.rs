use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::{extract::WithRejection, TypedHeader};
use headers::{authorization::Bearer, Authorization};

use shared_backend::AppState;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_models::listing::{ListResponse, TableView};
use shared_utils::extractor::require_role;

use crate::models::{AuditLog, AuditLogQuery, LoginHistory, LoginHistoryQuery};
use crate::services::AuditService;

const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[axum::debug_handler]
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<AuditLogQuery>, AppError>,
) -> Result<Json<ListResponse<AuditLog>>, AppError> {
    require_role(&user, ADMIN_ONLY, "view audit logs")?;

    let entries = AuditService::new(&state)
        .list_audit_logs(&query, auth.token())
        .await?;

    Ok(Json(entries))
}

#[axum::debug_handler]
pub async fn audit_log_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<AuditLogQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    require_role(&user, ADMIN_ONLY, "view audit logs")?;

    let entries = AuditService::new(&state)
        .list_audit_logs(&query, auth.token())
        .await?;

    Ok(Json(TableView::build("Audit Logs", &entries)))
}

#[axum::debug_handler]
pub async fn delete_audit_log(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, ADMIN_ONLY, "delete audit logs")?;

    AuditService::new(&state)
        .delete_audit_log(id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_login_history(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<LoginHistoryQuery>, AppError>,
) -> Result<Json<ListResponse<LoginHistory>>, AppError> {
    require_role(&user, ADMIN_ONLY, "view login history")?;

    let entries = AuditService::new(&state)
        .list_login_history(&query, auth.token())
        .await?;

    Ok(Json(entries))
}

#[axum::debug_handler]
pub async fn login_history_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<LoginHistoryQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    require_role(&user, ADMIN_ONLY, "view login history")?;

    let entries = AuditService::new(&state)
        .list_login_history(&query, auth.token())
        .await?;

    Ok(Json(TableView::build("Login History", &entries)))
}

#[axum::debug_handler]
pub async fn delete_login_history(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, ADMIN_ONLY, "delete login history")?;

    AuditService::new(&state)
        .delete_login_history(id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
