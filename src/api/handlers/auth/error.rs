//! Error type shared by all auth handlers.

use crate::api::response::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User with this email already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Incorrect password")]
    PasswordMismatch,

    #[error("Please verify your email before logging in")]
    UnverifiedAccount,

    #[error("Token is invalid or has expired")]
    InvalidOrExpiredToken,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Session is invalid or has expired")]
    SessionExpired,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Google sign-in is not configured")]
    ProviderNotConfigured,

    #[error("Failed to send verification email")]
    EmailDelivery(#[source] anyhow::Error),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::PasswordMismatch | Self::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            Self::UnverifiedAccount | Self::SessionExpired => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::ProviderNotConfigured | Self::EmailDelivery(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Internal details are logged, never sent to the client
        match &self {
            Self::Internal(err) => error!("internal error: {err:#}"),
            Self::EmailDelivery(err) => error!("email delivery failed: {err:#}"),
            _ => {}
        }

        let status = self.status();
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn status_codes_match_error_class() {
        assert_eq!(
            AuthError::Validation("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::DuplicateEmail.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::PasswordMismatch.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::UnverifiedAccount.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::InvalidOrExpiredToken.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::SessionExpired.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::NotFound("User").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::Internal(anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_message_is_generic() {
        let err = AuthError::Internal(anyhow!("connection refused to 10.0.0.1"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn not_found_names_the_resource() {
        assert_eq!(AuthError::NotFound("User").to_string(), "User not found");
    }

    #[tokio::test]
    async fn response_carries_failure_envelope() {
        let response = AuthError::DuplicateEmail.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert_eq!(
            value["message"],
            serde_json::json!("User with this email already exists")
        );
    }
}
