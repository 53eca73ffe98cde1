//! Google sign-in endpoints.

use axum::{
    Json,
    extract::{Extension, Query},
    response::{IntoResponse, Redirect},
};
use sqlx::PgPool;
use std::sync::Arc;

use super::{
    error::AuthError,
    session::establish_session,
    state::AuthState,
    strategy::{AuthStrategy, StrategyInput},
    types::{FilteredUser, OAuthCallbackParams},
};
use crate::api::response::ApiResponse;

/// Send the browser to Google's consent screen.
#[utoipa::path(
    get,
    path = "/api/v1/oauth/google",
    responses(
        (status = 307, description = "Redirect to Google's consent screen"),
        (status = 500, description = "Google sign-in is not configured")
    ),
    tag = "oauth"
)]
pub async fn google_redirect(
    state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let strategy = state
        .service()
        .google()
        .ok_or(AuthError::ProviderNotConfigured)?;
    let url = strategy.consent_url()?;

    Ok(Redirect::temporary(&url))
}

/// Exchange the authorization code and establish a session.
///
/// First sign-in creates a verified credential; an existing account with the
/// same email is linked and returned as-is.
#[utoipa::path(
    get,
    path = "/api/v1/oauth/google/callback",
    params(OAuthCallbackParams),
    responses(
        (status = 200, description = "Logged in, auth cookies set", body = FilteredUser),
        (status = 400, description = "Missing authorization code"),
        (status = 401, description = "Provider identity carries no email"),
        (status = 500, description = "Code exchange failed")
    ),
    tag = "oauth"
)]
pub async fn google_callback(
    Query(params): Query<OAuthCallbackParams>,
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let code = params.code.as_deref().map(str::trim).unwrap_or_default();
    if code.is_empty() {
        return Err(AuthError::Validation(
            "Authorization code is required".to_string(),
        ));
    }

    let strategy = state
        .service()
        .google()
        .ok_or(AuthError::ProviderNotConfigured)?;

    let credential = strategy
        .resolve(
            &pool,
            StrategyInput::AuthorizationCode {
                code: code.to_string(),
            },
        )
        .await?;

    let (cookies, user) = establish_session(&pool, &state, credential).await?;

    Ok((cookies, Json(ApiResponse::ok("Login successful", user))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        email::LogEmailSender,
        handlers::auth::{
            state::AuthConfig,
            strategy::{AuthService, GoogleOAuthConfig, GoogleOAuthStrategy, LocalStrategy},
            tokens::TokenConfig,
        },
    };
    use anyhow::Result;
    use axum::http::StatusCode;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    fn auth_state(with_google: bool) -> Result<Arc<AuthState>> {
        let config = AuthConfig::new("http://localhost:5173".to_string())?;
        let tokens = TokenConfig::new(
            SecretString::from("access-secret"),
            900,
            SecretString::from("refresh-secret"),
            604_800,
        );
        let google = if with_google {
            Some(GoogleOAuthStrategy::new(GoogleOAuthConfig {
                client_id: "client-id".to_string(),
                client_secret: SecretString::from("client-secret"),
                redirect_url: "http://localhost:8080/api/v1/oauth/google/callback".to_string(),
            })?)
        } else {
            None
        };
        Ok(Arc::new(AuthState::new(
            config,
            tokens,
            AuthService::new(LocalStrategy, google),
            Arc::new(LogEmailSender),
        )))
    }

    #[tokio::test]
    async fn redirect_fails_when_not_configured() -> Result<()> {
        let response = google_redirect(Extension(auth_state(false)?))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }

    #[tokio::test]
    async fn redirect_points_at_google() -> Result<()> {
        let response = google_redirect(Extension(auth_state(true)?))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        let location = response
            .headers()
            .get(axum::http::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
        Ok(())
    }

    #[tokio::test]
    async fn callback_missing_code() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = google_callback(
            Query(OAuthCallbackParams { code: None }),
            Extension(pool),
            Extension(auth_state(true)?),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn callback_fails_when_not_configured() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = google_callback(
            Query(OAuthCallbackParams {
                code: Some("code".to_string()),
            }),
            Extension(pool),
            Extension(auth_state(false)?),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }
}
