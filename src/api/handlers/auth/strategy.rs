//! Authentication strategies.
//!
//! Each strategy turns its own kind of proof (password, authorization code)
//! into a stored `Credential`. Routes pick a strategy explicitly through the
//! `AuthService` built once at server start.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::PgPool;
use std::time::Duration;
use url::Url;

use super::{
    error::AuthError,
    password::verify_password,
    storage::{Credential, FederatedProfile, Provider, find_or_create_federated, lookup_by_email},
    utils::normalize_email,
};
use crate::APP_USER_AGENT;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Proof of identity presented to a strategy.
#[derive(Debug)]
pub enum StrategyInput {
    Password { email: String, password: String },
    AuthorizationCode { code: String },
}

#[async_trait]
pub trait AuthStrategy: Send + Sync {
    async fn resolve(&self, pool: &PgPool, input: StrategyInput) -> Result<Credential, AuthError>;
}

/// Email + password against the local credential store.
pub struct LocalStrategy;

#[async_trait]
impl AuthStrategy for LocalStrategy {
    async fn resolve(&self, pool: &PgPool, input: StrategyInput) -> Result<Credential, AuthError> {
        let StrategyInput::Password { email, password } = input else {
            return Err(AuthError::Internal(anyhow!(
                "local strategy requires email and password"
            )));
        };

        let credential = lookup_by_email(pool, &email)
            .await
            .map_err(AuthError::Internal)?
            .ok_or(AuthError::InvalidCredentials)?;

        // OAuth-only accounts have no password hash and cannot log in locally
        let Some(password_hash) = credential.password_hash.clone() else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, password_hash)
            .await
            .map_err(AuthError::Internal)?
        {
            return Err(AuthError::PasswordMismatch);
        }

        if !credential.is_verified {
            return Err(AuthError::UnverifiedAccount);
        }

        Ok(credential)
    }
}

#[derive(Debug)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_url: String,
}

#[derive(Deserialize, Debug)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Deserialize, Debug)]
struct GoogleProfile {
    id: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Authorization-code flow against Google's OAuth 2.0 endpoints.
pub struct GoogleOAuthStrategy {
    client: reqwest::Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthStrategy {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(config: GoogleOAuthConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build OAuth HTTP client")?;

        Ok(Self { client, config })
    }

    /// Consent URL the browser is redirected to.
    pub(super) fn consent_url(&self) -> Result<String> {
        let mut url = Url::parse(GOOGLE_AUTH_URL).context("failed to parse consent URL")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile");
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", &self.config.client_id),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("redirect_uri", &self.config.redirect_url),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|err| AuthError::Internal(anyhow!("token exchange failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Internal(anyhow!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|err| AuthError::Internal(anyhow!("invalid token response: {err}")))?;

        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, AuthError> {
        let response = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| AuthError::Internal(anyhow!("userinfo fetch failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Internal(anyhow!(
                "userinfo endpoint returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|err| AuthError::Internal(anyhow!("invalid userinfo response: {err}")))
    }
}

/// Map a provider identity onto the stored credential shape.
///
/// The email is normalized like register/login input so link-by-email cannot
/// miss an existing account over letter case.
fn federated_profile(profile: GoogleProfile) -> Result<FederatedProfile, AuthError> {
    // An identity without an email cannot be linked to a credential
    let Some(email) = profile.email else {
        return Err(AuthError::InvalidCredentials);
    };
    let email = normalize_email(&email);

    let full_name = profile.name.unwrap_or_else(|| {
        email
            .split('@')
            .next()
            .unwrap_or(email.as_str())
            .to_string()
    });

    Ok(FederatedProfile {
        email,
        full_name,
        provider: Provider::Google,
        provider_id: profile.id,
        image: profile.picture,
    })
}

#[async_trait]
impl AuthStrategy for GoogleOAuthStrategy {
    async fn resolve(&self, pool: &PgPool, input: StrategyInput) -> Result<Credential, AuthError> {
        let StrategyInput::AuthorizationCode { code } = input else {
            return Err(AuthError::Internal(anyhow!(
                "google strategy requires an authorization code"
            )));
        };

        let access_token = self.exchange_code(&code).await?;
        let profile = self.fetch_profile(&access_token).await?;

        find_or_create_federated(pool, federated_profile(profile)?)
            .await
            .map_err(AuthError::Internal)
    }
}

/// Strategies available to the routes, built once at server start.
pub struct AuthService {
    local: LocalStrategy,
    google: Option<GoogleOAuthStrategy>,
}

impl AuthService {
    #[must_use]
    pub fn new(local: LocalStrategy, google: Option<GoogleOAuthStrategy>) -> Self {
        Self { local, google }
    }

    pub(super) fn local(&self) -> &LocalStrategy {
        &self.local
    }

    pub(super) fn google(&self) -> Option<&GoogleOAuthStrategy> {
        self.google.as_ref()
    }
}
