use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{JwtHeader, Role, SessionClaims, User};

type HmacSha256 = Hmac<Sha256>;

/// Validates an HS256 session token and returns the signed-in user.
///
/// Besides `exp`, a session older than `max_age_hours` (measured from `iat`)
/// is rejected; `max_age_hours <= 0` disables that check.
pub fn validate_token(token: &str, secret: &str, max_age_hours: i64) -> Result<User, String> {
    if secret.is_empty() {
        return Err("Session secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let header: JwtHeader = decode_segment(header_b64).map_err(|_| "Invalid token header".to_string())?;
    if header.alg != "HS256" {
        debug!("Rejecting token signed with {}", header.alg);
        return Err("Unsupported token algorithm".to_string());
    }

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims: SessionClaims = decode_segment(claims_b64)?;
    let now = Utc::now().timestamp();

    // an exp past i64::MAX is simply far in the future
    if let Some(exp) = claims.exp.and_then(|exp| i64::try_from(exp).ok()) {
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let issued = claims
        .iat
        .map(i64::try_from)
        .transpose()
        .map_err(|_| "Invalid token issue time".to_string())?;

    if let (Some(iat), true) = (issued, max_age_hours > 0) {
        if now.saturating_sub(iat) > max_age_hours.saturating_mul(3600) {
            debug!("Session issued at {} is older than {}h", iat, max_age_hours);
            return Err("Session expired, please sign in again".to_string());
        }
    }

    let role: Role = claims
        .role
        .as_deref()
        .ok_or_else(|| "Token carries no role".to_string())?
        .parse()?;

    let user = User {
        id: claims.sub,
        email: claims.email,
        role,
        role_id: claims.role_id,
        issued_at: issued.and_then(|timestamp| Utc.timestamp_opt(timestamp, 0).single()),
    };

    debug!("Token validated successfully for user: {} ({})", user.id, user.role);
    Ok(user)
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| "Invalid claims encoding".to_string())?;
    serde_json::from_slice(&bytes).map_err(|e| {
        debug!("Failed to parse token segment: {}", e);
        "Invalid claims format".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};

    const SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

    #[test]
    fn accepts_fresh_token() {
        let doctor = TestUser::doctor("doc@hkare.test");
        let token = JwtTestUtils::create_test_token(&doctor, SECRET, Some(1));

        let user = validate_token(&token, SECRET, 12).unwrap();
        assert_eq!(user.id, doctor.id);
        assert_eq!(user.role, Role::Doctor);
        assert_eq!(user.role_id.as_deref(), Some(doctor.role_id.as_str()));
    }

    #[test]
    fn rejects_expired_and_forged_tokens() {
        let patient = TestUser::patient("p@hkare.test");

        let expired = JwtTestUtils::create_expired_token(&patient, SECRET);
        assert_eq!(validate_token(&expired, SECRET, 12).unwrap_err(), "Token expired");

        let forged = JwtTestUtils::create_invalid_signature_token(&patient);
        assert_eq!(validate_token(&forged, SECRET, 12).unwrap_err(), "Invalid token signature");

        let malformed = JwtTestUtils::create_malformed_token();
        assert!(validate_token(&malformed, SECRET, 12).is_err());
    }

    #[test]
    fn rejects_sessions_older_than_max_age() {
        let admin = TestUser::admin("a@hkare.test");
        let stale = JwtTestUtils::create_token_issued_hours_ago(&admin, SECRET, 13);

        assert!(validate_token(&stale, SECRET, 12).unwrap_err().contains("Session expired"));
        assert!(validate_token(&stale, SECRET, 0).is_ok());
    }

    #[test]
    fn extreme_timestamps_and_max_age_do_not_overflow() {
        let admin = TestUser::admin("a@hkare.test");
        let now = Utc::now().timestamp() as u64;

        let stale = JwtTestUtils::create_token_issued_hours_ago(&admin, SECRET, 13);
        assert!(validate_token(&stale, SECRET, i64::MAX).is_ok());

        let far_future = JwtTestUtils::create_token_with_times(&admin, SECRET, now, u64::MAX);
        assert!(validate_token(&far_future, SECRET, 12).is_ok());

        let bad_issue = JwtTestUtils::create_token_with_times(&admin, SECRET, u64::MAX, u64::MAX);
        assert_eq!(validate_token(&bad_issue, SECRET, 12).unwrap_err(), "Invalid token issue time");
    }

    #[test]
    fn rejects_unknown_roles() {
        let nurse = TestUser::new("n@hkare.test", "NURSE");
        let token = JwtTestUtils::create_test_token(&nurse, SECRET, None);
        assert!(validate_token(&token, SECRET, 12).unwrap_err().contains("Unknown role"));
    }

    #[test]
    fn missing_secret_rejects_everything() {
        let token = JwtTestUtils::create_test_token(&TestUser::default(), SECRET, None);
        assert!(validate_token(&token, "", 12).is_err());
    }
}
