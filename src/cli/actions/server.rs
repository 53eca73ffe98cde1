//! Wire up the server action: build the auth state from CLI arguments and
//! hand it to the API layer.

use crate::api::{
    self,
    email::{EmailSender, LogEmailSender, ResendEmailSender},
    handlers::auth::{
        state::{AuthConfig, AuthState},
        strategy::{AuthService, GoogleOAuthConfig, GoogleOAuthStrategy, LocalStrategy},
        tokens::TokenConfig,
    },
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;

#[derive(Debug)]
pub struct GoogleArgs {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_url: String,
}

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub client_url: String,
    pub access_token_secret: SecretString,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_secret: SecretString,
    pub refresh_token_ttl_seconds: i64,
    pub verification_token_ttl_seconds: i64,
    pub sweep_interval_seconds: u64,
    pub resend_api_key: Option<SecretString>,
    pub email_from: String,
    pub google: Option<GoogleArgs>,
}

/// Start the API server.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server fails to bind
pub async fn execute(args: Args) -> Result<()> {
    let config = AuthConfig::new(args.client_url)?
        .with_verification_token_ttl_seconds(args.verification_token_ttl_seconds)
        .with_sweep_interval_seconds(args.sweep_interval_seconds);

    let tokens = TokenConfig::new(
        args.access_token_secret,
        args.access_token_ttl_seconds,
        args.refresh_token_secret,
        args.refresh_token_ttl_seconds,
    );

    let email_sender: Arc<dyn EmailSender> = match args.resend_api_key {
        Some(api_key) => Arc::new(ResendEmailSender::new(api_key, args.email_from)?),
        None => {
            tracing::warn!("No Resend API key configured, verification emails will be logged");
            Arc::new(LogEmailSender)
        }
    };

    let google = match args.google {
        Some(google) => Some(GoogleOAuthStrategy::new(GoogleOAuthConfig {
            client_id: google.client_id,
            client_secret: google.client_secret,
            redirect_url: google.redirect_url,
        })?),
        None => None,
    };

    let service = AuthService::new(LocalStrategy, google);

    let state = AuthState::new(config, tokens, service, email_sender);

    api::new(args.port, &args.dsn, Arc::new(state)).await
}
