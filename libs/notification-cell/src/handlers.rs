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

use crate::models::{Notification, NotificationForm, NotificationListQuery};
use crate::services::NotificationService;

const MANAGERS: &[Role] = &[Role::Admin, Role::Staff];

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<NotificationListQuery>, AppError>,
) -> Result<Json<ListResponse<Notification>>, AppError> {
    let notifications = NotificationService::new(&state)
        .list_notifications(&user, &query, auth.token())
        .await?;

    Ok(Json(notifications))
}

#[axum::debug_handler]
pub async fn notification_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<NotificationListQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    let notifications = NotificationService::new(&state)
        .list_notifications(&user, &query, auth.token())
        .await?;

    Ok(Json(TableView::build("Notifications", &notifications)))
}

#[axum::debug_handler]
pub async fn get_notification(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(notification_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Notification>, AppError> {
    let notification = NotificationService::new(&state)
        .get_notification(&user, notification_id, auth.token())
        .await?;

    Ok(Json(notification))
}

#[axum::debug_handler]
pub async fn new_notification_form(
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<NotificationForm>>, AppError> {
    require_role(&user, MANAGERS, "send notifications")?;
    Ok(Json(NotificationForm::open_add()))
}

#[axum::debug_handler]
pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(form), _): WithRejection<Json<NotificationForm>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, MANAGERS, "send notifications")?;

    let sender = user.email.clone().unwrap_or_else(|| user.scope_id().to_string());
    let created = NotificationService::new(&state)
        .send_notification(form, &sender, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(notification_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Value>, AppError> {
    let updated = NotificationService::new(&state)
        .mark_read(&user, notification_id, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(notification_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, MANAGERS, "delete notifications")?;

    NotificationService::new(&state)
        .delete_notification(notification_id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
