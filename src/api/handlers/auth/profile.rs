//! Authenticated profile fetch.

use axum::{Json, extract::Extension, http::HeaderMap, response::IntoResponse};
use sqlx::PgPool;
use std::sync::Arc;

use super::{error::AuthError, principal::require_auth, state::AuthState, types::FilteredUser};
use crate::api::response::ApiResponse;

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Authenticated user's profile", body = FilteredUser),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User no longer exists")
    ),
    tag = "auth"
)]
pub async fn profile(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let principal = require_auth(&headers, &pool, &state).await?;

    Ok(Json(ApiResponse::ok(
        "Profile fetched successfully",
        FilteredUser::from(principal.credential),
    )))
}
