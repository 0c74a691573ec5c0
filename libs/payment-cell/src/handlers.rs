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

use crate::models::{AppointmentOption, Payment, PaymentForm, PaymentListQuery, PaymentStatusChange, PaymentSummary};
use crate::services::PaymentService;

// Billing is a back-office screen only.
const MANAGERS: &[Role] = &[Role::Admin, Role::Staff];

#[axum::debug_handler]
pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<PaymentListQuery>, AppError>,
) -> Result<Json<ListResponse<Payment>>, AppError> {
    require_role(&user, MANAGERS, "view payments")?;

    let payments = PaymentService::new(&state)
        .list_payments(&query, auth.token())
        .await?;

    Ok(Json(payments))
}

#[axum::debug_handler]
pub async fn payment_table(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Query(query), _): WithRejection<Query<PaymentListQuery>, AppError>,
) -> Result<Json<TableView>, AppError> {
    require_role(&user, MANAGERS, "view payments")?;

    let payments = PaymentService::new(&state)
        .list_payments(&query, auth.token())
        .await?;

    Ok(Json(TableView::build("Payments", &payments)))
}

#[axum::debug_handler]
pub async fn payment_summary(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<PaymentSummary>, AppError> {
    require_role(&user, MANAGERS, "view payments")?;

    let summary = PaymentService::new(&state).summary(auth.token()).await?;

    Ok(Json(summary))
}

#[axum::debug_handler]
pub async fn appointment_options(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<AppointmentOption>>, AppError> {
    require_role(&user, MANAGERS, "record payments")?;

    let options = PaymentService::new(&state)
        .appointment_options(auth.token())
        .await?;

    Ok(Json(options))
}

#[axum::debug_handler]
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(payment_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Payment>, AppError> {
    require_role(&user, MANAGERS, "view payments")?;

    let payment = PaymentService::new(&state)
        .get_payment(payment_id, auth.token())
        .await?;

    Ok(Json(payment))
}

#[axum::debug_handler]
pub async fn new_payment_form(
    Extension(user): Extension<User>,
) -> Result<Json<FormEnvelope<PaymentForm>>, AppError> {
    require_role(&user, MANAGERS, "record payments")?;
    Ok(Json(PaymentForm::open_add()))
}

#[axum::debug_handler]
pub async fn edit_payment_form(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(payment_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<FormEnvelope<PaymentForm>>, AppError> {
    require_role(&user, MANAGERS, "edit payments")?;

    let payment = PaymentService::new(&state)
        .get_payment(payment_id, auth.token())
        .await?;

    Ok(Json(PaymentForm::open_edit(&payment_id.to_string(), &payment)))
}

#[axum::debug_handler]
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Json(form), _): WithRejection<Json<PaymentForm>, AppError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, MANAGERS, "record payments")?;

    let created = PaymentService::new(&state)
        .create_payment(form, auth.token())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_payment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(payment_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<PaymentForm>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, MANAGERS, "edit payments")?;

    let updated = PaymentService::new(&state)
        .update_payment(payment_id, form, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn change_payment_status(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(payment_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(change), _): WithRejection<Json<PaymentStatusChange>, AppError>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, MANAGERS, "edit payments")?;

    let updated = PaymentService::new(&state)
        .change_status(payment_id, &change.status, auth.token())
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_payment(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    WithRejection(Path(payment_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    require_role(&user, MANAGERS, "delete payments")?;

    PaymentService::new(&state)
        .delete_payment(payment_id, auth.token())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
