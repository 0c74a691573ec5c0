use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::jwt::validate_token;

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_value = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let user = validate_token(token, &config.session_secret, config.session_max_age_hours)
        .map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// 403 unless the user holds one of `roles`. `action` completes the
/// sentence "... cannot {action}".
pub fn require_role(user: &User, roles: &[Role], action: &str) -> Result<(), AppError> {
    if user.has_any_role(roles) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "{} users cannot {}",
            user.role.as_str().to_lowercase(),
            action
        )))
    }
}

/// Scoped roles may only touch rows they own; back office touches all.
pub fn require_owner(user: &User, owner_id: Option<&str>, action: &str) -> Result<(), AppError> {
    if user.is_back_office() || user.owns(owner_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("You can only {} your own records", action)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{
        http::StatusCode,
        middleware,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    use crate::test_utils::{JwtTestUtils, TestConfig, TestUser};

    fn app() -> Router {
        let config = TestConfig::default().to_arc();
        Router::new()
            .route("/me", get(|Extension(user): Extension<User>| async move { user.id }))
            .layer(middleware::from_fn_with_state(config, auth_middleware))
    }

    #[tokio::test]
    async fn middleware_inserts_user() {
        let user = TestUser::staff("s@hkare.test");
        let token = JwtTestUtils::create_test_token(&user, &TestConfig::default().jwt_secret, None);

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, user.id.as_bytes());
    }

    #[tokio::test]
    async fn middleware_rejects_missing_or_basic_auth() {
        let missing = app()
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let basic = app()
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header("Authorization", "Basic abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(basic.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn role_and_owner_guards() {
        let doctor = TestUser::doctor("d@hkare.test").to_user();

        assert!(require_role(&doctor, &[Role::Doctor, Role::Admin], "edit records").is_ok());
        assert_matches!(
            require_role(&doctor, &[Role::Admin], "manage staff"),
            Err(AppError::Forbidden(msg)) if msg == "doctor users cannot manage staff"
        );

        assert!(require_owner(&doctor, Some(doctor.scope_id()), "edit").is_ok());
        assert_matches!(require_owner(&doctor, Some("someone-else"), "edit"), Err(AppError::Forbidden(_)));

        let admin = TestUser::admin("a@hkare.test").to_user();
        assert!(require_owner(&admin, Some("someone-else"), "edit").is_ok());
    }
}
