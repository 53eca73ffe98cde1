//! Password login.

use axum::{Json, extract::Extension, response::IntoResponse};
use sqlx::PgPool;
use std::sync::Arc;

use super::{
    error::AuthError,
    session::establish_session,
    state::AuthState,
    strategy::{AuthStrategy, StrategyInput},
    types::{FilteredUser, LoginRequest},
    utils::normalize_email,
};
use crate::api::response::ApiResponse;

/// Log in with email and password, establishing a new session.
///
/// Any previous session for the user is replaced; its refresh token stops
/// working immediately.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, auth cookies set", body = FilteredUser),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Unknown email or wrong password"),
        (status = 403, description = "Account not verified")
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AuthError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let credential = state
        .service()
        .local()
        .resolve(
            &pool,
            StrategyInput::Password {
                email: normalize_email(&request.email),
                password: request.password,
            },
        )
        .await?;

    let (cookies, user) = establish_session(&pool, &state, credential).await?;

    Ok((cookies, Json(ApiResponse::ok("Login successful", user))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        email::LogEmailSender,
        handlers::auth::{
            state::AuthConfig,
            strategy::{AuthService, LocalStrategy},
            tokens::TokenConfig,
        },
    };
    use anyhow::Result;
    use axum::http::StatusCode;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    fn auth_state() -> Result<Arc<AuthState>> {
        let config = AuthConfig::new("http://localhost:5173".to_string())?;
        let tokens = TokenConfig::new(
            SecretString::from("access-secret"),
            900,
            SecretString::from("refresh-secret"),
            604_800,
        );
        let service = AuthService::new(LocalStrategy, None);
        Ok(Arc::new(AuthState::new(
            config,
            tokens,
            service,
            Arc::new(LogEmailSender),
        )))
    }

    #[tokio::test]
    async fn login_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = login(Extension(pool), Extension(auth_state()?), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn login_empty_fields() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = login(
            Extension(pool),
            Extension(auth_state()?),
            Some(Json(LoginRequest {
                email: "  ".to_string(),
                password: String::new(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
