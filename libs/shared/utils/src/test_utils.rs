use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};

pub struct TestConfig {
    pub jwt_secret: String,
    pub backend_url: String,
    pub api_prefix: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            backend_url: "http://localhost:8080".to_string(),
            api_prefix: "/api".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_backend(backend_url: &str) -> Self {
        Self {
            backend_url: backend_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            backend_url: self.backend_url.clone(),
            api_prefix: self.api_prefix.clone(),
            session_secret: self.jwt_secret.clone(),
            request_timeout_secs: 5,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub role_id: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@hkare.test", "PATIENT")
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        let prefix: String = role.chars().take(3).collect();
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
            role_id: format!("{}-{}", prefix.to_uppercase(), &Uuid::new_v4().simple().to_string()[..8]),
        }
    }

    pub fn with_role_id(mut self, role_id: &str) -> Self {
        self.role_id = role_id.to_string();
        self
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "DOCTOR")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "PATIENT")
    }

    pub fn staff(email: &str) -> Self {
        Self::new(email, "STAFF")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "ADMIN")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: self.role.parse().unwrap_or(Role::Patient),
            role_id: Some(self.role_id.clone()),
            issued_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    fn sign(payload: serde_json::Value, secret: &str) -> String {
        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(12));

        Self::sign(
            json!({
                "sub": user.id,
                "email": user.email,
                "role": user.role,
                "role_id": user.role_id,
                "iat": now.timestamp(),
                "exp": exp.timestamp()
            }),
            secret,
        )
    }

    pub fn create_token_issued_hours_ago(user: &TestUser, secret: &str, hours: i64) -> String {
        let issued = Utc::now() - Duration::hours(hours);
        let exp = Utc::now() + Duration::hours(24);

        Self::sign(
            json!({
                "sub": user.id,
                "email": user.email,
                "role": user.role,
                "role_id": user.role_id,
                "iat": issued.timestamp(),
                "exp": exp.timestamp()
            }),
            secret,
        )
    }

    /// Raw `iat`/`exp` values, including ones no real clock produces.
    pub fn create_token_with_times(user: &TestUser, secret: &str, iat: u64, exp: u64) -> String {
        Self::sign(
            json!({
                "sub": user.id,
                "email": user.email,
                "role": user.role,
                "role_id": user.role_id,
                "iat": iat,
                "exp": exp
            }),
            secret,
        )
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(12))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }

    pub fn bearer(user: &TestUser) -> String {
        format!(
            "Bearer {}",
            Self::create_test_token(user, &TestConfig::default().jwt_secret, None)
        )
    }
}

/// Backend payloads in the shape the hospital REST API returns them.
pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn department(id: i64, name: &str) -> serde_json::Value {
        json!({
            "departmentId": id,
            "name": name,
            "description": format!("{} department", name),
            "headDoctorId": "DOC-1",
            "headDoctorName": "Gregory House"
        })
    }

    pub fn staff(staff_id: &str, first_name: &str, last_name: &str) -> serde_json::Value {
        json!({
            "staffId": staff_id,
            "firstName": first_name,
            "lastName": last_name,
            "email": format!("{}@hkare.test", first_name.to_lowercase()),
            "phoneNumber": "555-0100",
            "address": "1 Hospital Way",
            "dateOfBirth": "1985-02-10T00:00:00",
            "gender": "FEMALE",
            "departmentId": 1,
            "departmentName": "Administration",
            "position": "Receptionist",
            "hireDate": "2020-01-15",
            "admin": false
        })
    }

    pub fn doctor(doctor_id: &str, first_name: &str, last_name: &str, specialization: &str) -> serde_json::Value {
        json!({
            "doctorId": doctor_id,
            "firstName": first_name,
            "lastName": last_name,
            "email": format!("{}@hkare.test", last_name.to_lowercase()),
            "phoneNumber": "555-0101",
            "address": "2 Clinic Road",
            "gender": "MALE",
            "dateOfBirth": "1970-05-20T00:00:00",
            "specialization": specialization,
            "qualification": "MD",
            "experienceYears": 15,
            "licenseNumber": "LIC-001",
            "consultationFee": 150.0,
            "bio": "Attending physician",
            "rating": 4.5,
            "departmentId": 1,
            "departmentName": "Cardiology"
        })
    }

    pub fn patient(patient_id: &str, first_name: &str, last_name: &str) -> serde_json::Value {
        json!({
            "patientId": patient_id,
            "email": format!("{}@hkare.test", first_name.to_lowercase()),
            "firstName": first_name,
            "lastName": last_name,
            "phoneNumber": "555-0199",
            "address": "3 Patient Street",
            "gender": "FEMALE",
            "dateOfBirth": "1992-11-03T00:00:00",
            "bloodGroup": "O+",
            "height": 168.0,
            "weight": 61.5,
            "allergies": "Penicillin",
            "emergencyContactName": "John Doe",
            "emergencyContactPhone": "555-0111",
            "insuranceProvider": "CareFirst",
            "insuranceId": "INS-42",
            "primaryDoctor": {
                "doctorId": "DOC-1",
                "firstName": "Gregory",
                "lastName": "House",
                "specialization": "Diagnostics"
            },
            "createdAt": "2024-01-01T08:00:00",
            "updatedAt": "2024-01-01T08:00:00"
        })
    }

    pub fn appointment(id: i64, patient_id: &str, doctor_id: &str, date: &str, status: &str) -> serde_json::Value {
        json!({
            "appointmentId": id,
            "patientId": patient_id,
            "patientName": "Jane Doe",
            "patientEmail": "jane@hkare.test",
            "patientPhone": "555-0199",
            "doctorId": doctor_id,
            "doctorName": "Gregory House",
            "doctorSpecialization": "Diagnostics",
            "departmentId": 1,
            "departmentName": "Cardiology",
            "appointmentDate": date,
            "startTime": "09:30:00",
            "endTime": "09:30:00",
            "status": status,
            "reason": "Chest pain",
            "notes": null,
            "appointmentFee": 150.0,
            "isPaid": false
        })
    }

    pub fn payment(id: i64, appointment_id: i64, amount: f64, status: &str, date: &str) -> serde_json::Value {
        json!({
            "paymentId": id,
            "patientId": "PAT-1",
            "patientName": "Jane Doe",
            "appointmentId": appointment_id,
            "appointmentDateTime": format!("{}T09:30:00", date),
            "doctorName": "Gregory House",
            "amount": amount,
            "type": "CONSULTATION",
            "status": status,
            "transactionId": format!("TX-{}", id),
            "paymentMethod": "CASH",
            "notes": null,
            "paymentDate": format!("{}T00:00:00", date),
            "staffId": null,
            "staffName": null,
            "createdAt": format!("{}T10:00:00", date),
            "updatedAt": format!("{}T10:00:00", date)
        })
    }

    pub fn medical_record(id: i64, patient_id: &str, doctor_id: &str, record_type: &str, date: &str) -> serde_json::Value {
        json!({
            "recordId": id,
            "patientId": patient_id,
            "patientName": "Jane Doe",
            "doctorId": doctor_id,
            "doctorName": "Gregory House",
            "doctorSpecialization": "Diagnostics",
            "appointmentId": null,
            "appointmentDateTime": null,
            "recordType": record_type,
            "diagnosis": "Hypertension",
            "symptoms": "Headache",
            "treatment": "Lifestyle changes",
            "notes": null,
            "prescription": null,
            "testResults": null,
            "medicalHistory": null,
            "recordDate": format!("{}T00:00:00", date),
            "nextAppointment": null,
            "createdAt": format!("{}T11:00:00", date),
            "updatedAt": format!("{}T11:00:00", date)
        })
    }

    pub fn prescription(id: i64, patient_id: &str, doctor_id: &str, status: &str, date: &str) -> serde_json::Value {
        json!({
            "prescriptionId": id,
            "patientId": patient_id,
            "patientName": "Jane Doe",
            "doctorId": doctor_id,
            "doctorName": "Gregory House",
            "medicalRecordId": null,
            "prescriptionDate": date,
            "expiryDate": null,
            "status": status,
            "notes": null,
            "isRefillable": true,
            "refillsRemaining": 2,
            "totalRefills": 2,
            "medications": [{
                "medicationName": "Amoxicillin",
                "dosage": "500mg",
                "frequency": "3x daily",
                "instructions": "After meals",
                "quantity": 21,
                "duration": "7 days"
            }],
            "pharmacyId": null,
            "pharmacyName": null,
            "createdAt": format!("{}T12:00:00", date),
            "updatedAt": format!("{}T12:00:00", date)
        })
    }

    pub fn medication(id: i64, name: &str, stock: i32, reorder_level: i32) -> serde_json::Value {
        json!({
            "medicationId": id,
            "name": name,
            "genericName": format!("{} generic", name),
            "brand": "Acme Pharma",
            "manufacturer": "Acme",
            "type": "ANTIBIOTIC",
            "description": null,
            "dosageForm": "Tablet",
            "strength": "500",
            "dosageUnit": "MG",
            "requiresPrescription": true,
            "price": 9.99,
            "stockQuantity": stock,
            "reorderLevel": reorder_level,
            "batchNumber": "B-1",
            "manufactureDate": "2024-01-01",
            "expiryDate": "2027-01-01",
            "isActive": true,
            "isExpired": false,
            "isLowStock": stock <= reorder_level,
            "daysUntilExpiry": 400
        })
    }

    pub fn audit_log(id: i64, username: &str, action: &str, entity_type: &str) -> serde_json::Value {
        json!({
            "id": id,
            "username": username,
            "action": action,
            "entityType": entity_type,
            "entityId": "1",
            "details": format!("{} {}", action, entity_type),
            "timestamp": "2024-03-01T10:15:00",
            "ipAddress": "10.0.0.5"
        })
    }

    pub fn login_history(id: i64, username: &str, success: bool) -> serde_json::Value {
        json!({
            "id": id,
            "username": username,
            "loginTime": "2024-03-01T08:00:00",
            "ipAddress": "10.0.0.7",
            "userAgent": "Mozilla/5.0",
            "loginSuccess": success,
            "failureReason": if success { serde_json::Value::Null } else { json!("Bad credentials") }
        })
    }

    pub fn notification(id: i64, recipient_type: &str, recipient_id: &str, is_read: bool) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Lab results ready",
            "message": "Your results are available",
            "recipientType": recipient_type,
            "recipientId": recipient_id,
            "senderUsername": "staff@hkare.test",
            "priority": "NORMAL",
            "isRead": is_read,
            "createdAt": "2024-03-01T09:00:00"
        })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({
            "message": message
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let app_config = TestConfig::with_backend("http://backend:9000").to_app_config();

        assert_eq!(app_config.backend_url, "http://backend:9000");
        assert_eq!(app_config.api_prefix, "/api");
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::doctor("doc@hkare.test").with_role_id("DOC-9");
        assert_eq!(user.role, "DOCTOR");

        let user_model = user.to_user();
        assert_eq!(user_model.role, Role::Doctor);
        assert_eq!(user_model.scope_id(), "DOC-9");
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let token = JwtTestUtils::create_test_token(&TestUser::default(), "test-secret", Some(1));
        assert_eq!(token.split('.').count(), 3);
        assert!(JwtTestUtils::bearer(&TestUser::default()).starts_with("Bearer "));
    }
}
