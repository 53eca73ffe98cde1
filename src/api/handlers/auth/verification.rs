//! Email verification endpoint.

use anyhow::Context;
use axum::{
    Json,
    extract::{Extension, Query},
    response::IntoResponse,
};
use sqlx::PgPool;

use super::{
    error::AuthError,
    storage::{consume_verification_token, mark_verified},
    types::VerifyEmailParams,
    utils::hash_token,
};
use crate::api::response::ApiResponse;

/// Consume the emailed token and activate the account.
///
/// Consumption is deletion, so a second attempt with the same token fails
/// regardless of expiry.
#[utoipa::path(
    post,
    path = "/api/v1/verify-email",
    params(VerifyEmailParams),
    responses(
        (status = 200, description = "Email verified"),
        (status = 400, description = "Missing, invalid, or expired token"),
        (status = 404, description = "User no longer exists")
    ),
    tag = "auth"
)]
pub async fn verify_email(
    Query(params): Query<VerifyEmailParams>,
    pool: Extension<PgPool>,
) -> Result<impl IntoResponse, AuthError> {
    let token = params.token.as_deref().map(str::trim).unwrap_or_default();
    if token.is_empty() {
        return Err(AuthError::Validation(
            "Verification token is required".to_string(),
        ));
    }

    // Hash before lookup; raw tokens are never stored server-side
    let token_hash = hash_token(token);

    let mut tx = pool
        .begin()
        .await
        .context("begin verify-email transaction")?;

    let Some(user_id) = consume_verification_token(&mut tx, &token_hash).await? else {
        let _ = tx.rollback().await;
        return Err(AuthError::InvalidOrExpiredToken);
    };

    if !mark_verified(&mut tx, user_id).await? {
        let _ = tx.rollback().await;
        return Err(AuthError::NotFound("User"));
    }

    tx.commit().await.context("commit verify-email transaction")?;

    Ok(Json(ApiResponse::message("Email verified successfully")))
}
