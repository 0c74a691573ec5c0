use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};

use shared_backend::AppState;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{AdminDashboard, Dashboard, DoctorDashboard, PatientDashboard};
use crate::services::DashboardService;

const BACK_OFFICE: &[Role] = &[Role::Admin, Role::Staff];

#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Json<Dashboard> {
    Json(DashboardService::new(&state).dashboard(&user, auth.token()).await)
}

#[axum::debug_handler]
pub async fn admin_dashboard(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<AdminDashboard>, AppError> {
    require_role(&user, BACK_OFFICE, "view the admin dashboard")?;

    let dashboard = DashboardService::new(&state)
        .admin_dashboard(&user, auth.token())
        .await;

    Ok(Json(dashboard))
}

#[axum::debug_handler]
pub async fn doctor_dashboard(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<DoctorDashboard>, AppError> {
    require_role(&user, &[Role::Doctor], "view the doctor dashboard")?;

    let dashboard = DashboardService::new(&state)
        .doctor_dashboard(&user, auth.token())
        .await;

    Ok(Json(dashboard))
}

#[axum::debug_handler]
pub async fn patient_dashboard(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<PatientDashboard>, AppError> {
    require_role(&user, &[Role::Patient], "view the patient dashboard")?;

    let dashboard = DashboardService::new(&state)
        .patient_dashboard(&user, auth.token())
        .await;

    Ok(Json(dashboard))
}
