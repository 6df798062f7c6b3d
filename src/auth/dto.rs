use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::Role;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub fullname: String,
    pub phone_number: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub address: String,
    pub postal_code: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for email verification.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub username: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendCodeRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Response returned after login or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
}

/// Public part of the user embedded in the auth response.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub role: Role,
    pub seller_score: f64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_user_serializes_role_lowercase() {
        let user = SessionUser {
            id: Uuid::new_v4(),
            username: "kicks".into(),
            fullname: "Kicks Seller".into(),
            role: Role::Admin,
            seller_score: 4.5,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"role\":\"admin\""));
        assert!(json.contains("\"seller_score\":4.5"));
    }

    #[test]
    fn register_request_accepts_camel_case() {
        let json = r#"{
            "username": "kicks", "email": "k@e.c", "password": "longenough",
            "fullname": "K", "phoneNumber": "1", "country": "NL", "state": "NH",
            "city": "A", "address": "M 1", "postalCode": "1000AA"
        }"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.phone_number, "1");
        assert_eq!(req.postal_code, "1000AA");
    }
}
