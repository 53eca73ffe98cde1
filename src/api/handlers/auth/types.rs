//! Request/response payloads shared by the auth handlers.

use super::storage::Credential;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, IntoParams, Debug)]
pub struct VerifyEmailParams {
    /// Raw verification token from the email link
    pub token: Option<String>,
}

#[derive(Deserialize, IntoParams, Debug)]
pub struct OAuthCallbackParams {
    /// Authorization code returned by the provider
    pub code: Option<String>,
}

/// Credential as exposed to clients, never carries the password hash.
#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FilteredUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<Credential> for FilteredUser {
    fn from(credential: Credential) -> Self {
        Self {
            id: credential.id,
            full_name: credential.full_name,
            email: credential.email,
            role: credential.role.as_str().to_string(),
            image: credential.image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::storage::{Provider, Role};
    use serde_json::{Value, json};

    #[test]
    fn register_request_uses_camel_case() {
        let payload = json!({
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "password123",
            "confirmPassword": "password123",
        });
        let request: RegisterRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(request.full_name, "Ada Lovelace");
        assert_eq!(request.confirm_password, "password123");
    }

    #[test]
    fn filtered_user_omits_password_hash() {
        let credential = Credential {
            id: Uuid::new_v4(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: Some("$argon2id$v=19$secret".to_string()),
            is_verified: true,
            provider: Provider::Local,
            provider_id: None,
            image: None,
            role: Role::User,
        };

        let value: Value = serde_json::to_value(FilteredUser::from(credential)).unwrap();
        assert_eq!(value["fullName"], json!("Ada Lovelace"));
        assert_eq!(value["role"], json!("user"));
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
        assert!(value.get("image").is_none());
    }
}
