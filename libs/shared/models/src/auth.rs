use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// Claims carried by the session token the login flow hands out.
/// `role_id` is the doctor/patient/staff id the backend scopes lists by.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub role_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Staff,
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::Doctor => "DOCTOR",
            Role::Patient => "PATIENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase();
        match normalized.strip_prefix("ROLE_").unwrap_or(&normalized) {
            "ADMIN" => Ok(Role::Admin),
            "STAFF" => Ok(Role::Staff),
            "DOCTOR" => Ok(Role::Doctor),
            "PATIENT" => Ok(Role::Patient),
            _ => Err(format!("Unknown role: {}", raw)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub role_id: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Manages every record on a screen (admin or staff portal).
    pub fn is_back_office(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Staff)
    }

    /// Id the backend knows this user by in scoped listings.
    pub fn scope_id(&self) -> &str {
        self.role_id.as_deref().unwrap_or(&self.id)
    }

    pub fn owns(&self, owner_id: Option<&str>) -> bool {
        owner_id == Some(self.scope_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, role_id: Option<&str>) -> User {
        User {
            id: "user-1".to_string(),
            email: None,
            role,
            role_id: role_id.map(str::to_string),
            issued_at: None,
        }
    }

    #[test]
    fn role_parsing_ignores_case_and_spring_prefix() {
        assert_eq!("doctor".parse::<Role>(), Ok(Role::Doctor));
        assert_eq!("ROLE_ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert!("nurse".parse::<Role>().is_err());
    }

    #[test]
    fn scope_id_prefers_role_id() {
        assert_eq!(user(Role::Doctor, Some("DOC-7")).scope_id(), "DOC-7");
        assert_eq!(user(Role::Patient, None).scope_id(), "user-1");
    }

    #[test]
    fn ownership_compares_scope_id() {
        let doctor = user(Role::Doctor, Some("DOC-7"));
        assert!(doctor.owns(Some("DOC-7")));
        assert!(!doctor.owns(Some("DOC-8")));
        assert!(!doctor.owns(None));
    }
}
