//! JWT issuance and verification for access and refresh tokens.
//!
//! Access and refresh tokens are signed with separate secrets so one kind can
//! never pass verification as the other. Refresh claims carry only the user
//! id, role and email belong to the short-lived access token.

use anyhow::{Context, Result};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signing secrets and lifetimes for both token kinds.
#[derive(Debug)]
pub struct TokenConfig {
    access_secret: SecretString,
    access_ttl_seconds: i64,
    refresh_secret: SecretString,
    refresh_ttl_seconds: i64,
}

impl TokenConfig {
    #[must_use]
    pub fn new(
        access_secret: SecretString,
        access_ttl_seconds: i64,
        refresh_secret: SecretString,
        refresh_ttl_seconds: i64,
    ) -> Self {
        Self {
            access_secret,
            access_ttl_seconds,
            refresh_secret,
            refresh_ttl_seconds,
        }
    }

    pub(super) fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    pub(super) fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }
}

/// Claims carried by the short-lived access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by the refresh token, intentionally minimal.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

fn now_seconds() -> i64 {
    i64::try_from(get_current_timestamp()).unwrap_or(0)
}

/// Sign a new access token for the given credential claims.
pub(super) fn issue_access_token(
    config: &TokenConfig,
    id: Uuid,
    email: &str,
    role: &str,
) -> Result<String> {
    let iat = now_seconds();
    let claims = AccessClaims {
        id,
        email: email.to_string(),
        role: role.to_string(),
        iat,
        exp: iat + config.access_ttl_seconds,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.access_secret.expose_secret().as_bytes()),
    )
    .context("failed to sign access token")
}

/// Sign a new refresh token for the given user id.
pub(super) fn issue_refresh_token(config: &TokenConfig, id: Uuid) -> Result<String> {
    let iat = now_seconds();
    let claims = RefreshClaims {
        id,
        iat,
        exp: iat + config.refresh_ttl_seconds,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.refresh_secret.expose_secret().as_bytes()),
    )
    .context("failed to sign refresh token")
}

// Expiry is enforced exactly, no clock leeway
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}

/// Verify signature and expiry of an access token.
pub(super) fn verify_access_token(config: &TokenConfig, token: &str) -> Result<AccessClaims> {
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.access_secret.expose_secret().as_bytes()),
        &validation(),
    )
    .context("invalid access token")?;
    Ok(data.claims)
}

/// Verify signature and expiry of a refresh token.
pub(super) fn verify_refresh_token(config: &TokenConfig, token: &str) -> Result<RefreshClaims> {
    let data = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(config.refresh_secret.expose_secret().as_bytes()),
        &validation(),
    )
    .context("invalid refresh token")?;
    Ok(data.claims)
}
