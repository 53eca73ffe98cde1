//! Cookie plumbing and the session endpoints (refresh, logout).

use anyhow::{Context, anyhow};
use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::{
    error::AuthError,
    principal::require_refresh,
    state::AuthState,
    storage::{Credential, delete_refresh_token, replace_refresh_token},
    tokens::{issue_access_token, issue_refresh_token},
    types::FilteredUser,
    utils::hash_token,
};
use crate::api::response::ApiResponse;

pub(super) const ACCESS_COOKIE_NAME: &str = "accessToken";
pub(super) const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Build an `HttpOnly` auth cookie.
///
/// `SameSite=None` because the frontend is served from a different origin;
/// `Secure` only when the frontend itself is HTTPS so local dev still works.
fn auth_cookie(
    name: &str,
    value: &str,
    max_age_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=None; Max-Age={max_age_seconds}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    auth_cookie(name, "", 0, secure)
}

pub(super) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

/// Issue both tokens for a resolved credential and store the refresh hash,
/// replacing any previous session for this user.
pub(super) async fn establish_session(
    pool: &PgPool,
    state: &AuthState,
    credential: Credential,
) -> Result<(HeaderMap, FilteredUser), AuthError> {
    let access = issue_access_token(
        state.tokens(),
        credential.id,
        &credential.email,
        credential.role.as_str(),
    )?;
    let refresh = issue_refresh_token(state.tokens(), credential.id)?;

    // Only the hash is stored; the cookie holds the raw value
    replace_refresh_token(
        pool,
        credential.id,
        &hash_token(&refresh),
        state.tokens().refresh_ttl_seconds(),
    )
    .await?;

    let secure = state.config().cookie_secure();
    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        auth_cookie(
            ACCESS_COOKIE_NAME,
            &access,
            state.tokens().access_ttl_seconds(),
            secure,
        )
        .map_err(|err| anyhow!("failed to build access cookie: {err}"))?,
    );
    headers.append(
        SET_COOKIE,
        auth_cookie(
            REFRESH_COOKIE_NAME,
            &refresh,
            state.tokens().refresh_ttl_seconds(),
            secure,
        )
        .map_err(|err| anyhow!("failed to build refresh cookie: {err}"))?,
    );

    Ok((headers, FilteredUser::from(credential)))
}

/// Mint a fresh access token off a valid refresh cookie.
#[utoipa::path(
    post,
    path = "/api/v1/refresh-token",
    responses(
        (status = 200, description = "New access token cookie set"),
        (status = 401, description = "Missing refresh cookie"),
        (status = 403, description = "Refresh token invalid, expired, or revoked")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let principal = require_refresh(&headers, &pool, &state).await?;
    let credential = principal.credential;

    let access = issue_access_token(
        state.tokens(),
        credential.id,
        &credential.email,
        credential.role.as_str(),
    )?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        SET_COOKIE,
        auth_cookie(
            ACCESS_COOKIE_NAME,
            &access,
            state.tokens().access_ttl_seconds(),
            state.config().cookie_secure(),
        )
        .map_err(|err| anyhow!("failed to build access cookie: {err}"))?,
    );

    Ok((
        response_headers,
        Json(ApiResponse::message("Access token refreshed")),
    ))
}

/// Revoke the stored refresh token and clear both cookies.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 200, description = "Session revoked, cookies cleared"),
        (status = 400, description = "No refresh cookie present")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(token) = extract_cookie(&headers, REFRESH_COOKIE_NAME) else {
        return Err(AuthError::Validation("No active session".to_string()));
    };

    // Best effort: clear the cookies even if the row was already gone
    if let Err(err) = delete_refresh_token(&pool, &hash_token(&token)).await {
        error!("Failed to delete refresh token: {err}");
    }

    let secure = state.config().cookie_secure();
    let mut response_headers = HeaderMap::new();
    response_headers.append(
        SET_COOKIE,
        clear_cookie(ACCESS_COOKIE_NAME, secure)
            .context("failed to build cookie")
            .map_err(AuthError::Internal)?,
    );
    response_headers.append(
        SET_COOKIE,
        clear_cookie(REFRESH_COOKIE_NAME, secure)
            .context("failed to build cookie")
            .map_err(AuthError::Internal)?,
    );

    Ok((
        response_headers,
        Json(ApiResponse::message("Logged out successfully")),
    ))
}
