//! Resolve cookies into an authenticated principal.

use axum::http::HeaderMap;
use sqlx::PgPool;

use super::{
    error::AuthError,
    session::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, extract_cookie},
    state::AuthState,
    storage::{Credential, lookup_by_id, lookup_refresh_token},
    tokens::{verify_access_token, verify_refresh_token},
    utils::hash_token,
};

/// An authenticated caller, credential re-fetched from the store.
pub struct Principal {
    pub credential: Credential,
}

/// Authenticate via the access cookie.
///
/// Missing, malformed, badly signed, and expired tokens all collapse into a
/// single `Unauthenticated` answer so responses leak nothing about which
/// check failed.
pub(super) async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
) -> Result<Principal, AuthError> {
    let token = extract_cookie(headers, ACCESS_COOKIE_NAME).ok_or(AuthError::Unauthenticated)?;
    let claims =
        verify_access_token(state.tokens(), &token).map_err(|_| AuthError::Unauthenticated)?;

    let credential = lookup_by_id(pool, claims.id)
        .await?
        .ok_or(AuthError::NotFound("User"))?;

    Ok(Principal { credential })
}

/// Authenticate via the refresh cookie, used only by `/refresh-token`.
///
/// Signature verification and the stored hash must agree; a token that was
/// replaced by a newer login verifies fine but its row is gone, which is
/// exactly the revocation this store exists for.
pub(super) async fn require_refresh(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
) -> Result<Principal, AuthError> {
    let token = extract_cookie(headers, REFRESH_COOKIE_NAME).ok_or(AuthError::Unauthenticated)?;
    let claims =
        verify_refresh_token(state.tokens(), &token).map_err(|_| AuthError::SessionExpired)?;

    let user_id = lookup_refresh_token(pool, &hash_token(&token))
        .await?
        .ok_or(AuthError::SessionExpired)?;
    if user_id != claims.id {
        return Err(AuthError::SessionExpired);
    }

    let credential = lookup_by_id(pool, claims.id)
        .await?
        .ok_or(AuthError::SessionExpired)?;

    Ok(Principal { credential })
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
    use axum::http::{HeaderValue, header::COOKIE};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Result<AuthState> {
        let config = AuthConfig::new("http://localhost:5173".to_string())?;
        let tokens = TokenConfig::new(
            SecretString::from("access-secret"),
            900,
            SecretString::from("refresh-secret"),
            604_800,
        );
        let service = AuthService::new(LocalStrategy, None);
        Ok(AuthState::new(
            config,
            tokens,
            service,
            Arc::new(LogEmailSender),
        ))
    }

    #[tokio::test]
    async fn require_auth_missing_cookie() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let result = require_auth(&HeaderMap::new(), &pool, &auth_state()?).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
        Ok(())
    }

    #[tokio::test]
    async fn require_auth_garbage_token() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("accessToken=garbage"));
        let result = require_auth(&headers, &pool, &auth_state()?).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
        Ok(())
    }

    #[tokio::test]
    async fn require_refresh_missing_cookie() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let result = require_refresh(&HeaderMap::new(), &pool, &auth_state()?).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
        Ok(())
    }

    #[tokio::test]
    async fn require_refresh_garbage_token() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("refreshToken=garbage"));
        let result = require_refresh(&headers, &pool, &auth_state()?).await;
        assert!(matches!(result, Err(AuthError::SessionExpired)));
        Ok(())
    }
}
