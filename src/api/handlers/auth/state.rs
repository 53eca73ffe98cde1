//! Auth configuration and shared handler state.

use super::{strategy::AuthService, tokens::TokenConfig};
use crate::api::email::EmailSender;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const DEFAULT_VERIFICATION_TOKEN_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 5 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    client_url: String,
    verification_token_ttl_seconds: i64,
    sweep_interval: Duration,
}

impl AuthConfig {
    /// # Errors
    ///
    /// Returns an error if the client URL does not parse
    pub fn new(client_url: String) -> Result<Self> {
        Url::parse(&client_url).with_context(|| format!("Invalid client URL: {client_url}"))?;

        Ok(Self {
            client_url,
            verification_token_ttl_seconds: DEFAULT_VERIFICATION_TOKEN_TTL_SECONDS,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECONDS),
        })
    }

    #[must_use]
    pub fn with_verification_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.verification_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_sweep_interval_seconds(mut self, seconds: u64) -> Self {
        self.sweep_interval = Duration::from_secs(seconds);
        self
    }

    pub(crate) fn client_url(&self) -> &str {
        &self.client_url
    }

    pub(super) fn verification_token_ttl_seconds(&self) -> i64 {
        self.verification_token_ttl_seconds
    }

    pub(crate) fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    // Cookies are only marked Secure when the frontend is served over HTTPS
    pub(super) fn cookie_secure(&self) -> bool {
        self.client_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    tokens: TokenConfig,
    service: AuthService,
    email_sender: Arc<dyn EmailSender>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        tokens: TokenConfig,
        service: AuthService,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            config,
            tokens,
            service,
            email_sender,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenConfig {
        &self.tokens
    }

    pub(super) fn service(&self) -> &AuthService {
        &self.service
    }

    pub(super) fn email_sender(&self) -> &dyn EmailSender {
        self.email_sender.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() -> Result<()> {
        let config = AuthConfig::new("http://localhost:5173".to_string())?;

        assert_eq!(config.client_url(), "http://localhost:5173");
        assert_eq!(
            config.verification_token_ttl_seconds(),
            DEFAULT_VERIFICATION_TOKEN_TTL_SECONDS
        );
        assert_eq!(
            config.sweep_interval(),
            Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECONDS)
        );
        assert!(!config.cookie_secure());

        let config = config
            .with_verification_token_ttl_seconds(120)
            .with_sweep_interval_seconds(30);

        assert_eq!(config.verification_token_ttl_seconds(), 120);
        assert_eq!(config.sweep_interval(), Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn cookie_secure_follows_client_scheme() -> Result<()> {
        let config = AuthConfig::new("https://learn.example.com".to_string())?;
        assert!(config.cookie_secure());
        Ok(())
    }

    #[test]
    fn auth_config_rejects_invalid_url() {
        assert!(AuthConfig::new("not a url".to_string()).is_err());
    }
}
