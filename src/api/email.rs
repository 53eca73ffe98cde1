//! Verification email delivery.
//!
//! Registration sends the verification email inline so a failed delivery can
//! roll the new credential back instead of leaving an account that can never
//! verify. `EmailSender` is the seam: `ResendEmailSender` talks to the Resend
//! HTTP API, `LogEmailSender` logs the message and is the default for local
//! development where no API key is configured.

use crate::APP_USER_AGENT;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::time::Duration;
use tracing::info;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub html_body: String,
}

/// Email delivery abstraction.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a message, an error aborts the registration that produced it.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            subject = %message.subject,
            body = %message.html_body,
            "email send stub"
        );
        Ok(())
    }
}

/// Sender backed by the Resend HTTP API.
pub struct ResendEmailSender {
    client: reqwest::Client,
    api_key: SecretString,
    from: String,
}

impl ResendEmailSender {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(api_key: SecretString, from: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build email HTTP client")?;

        Ok(Self {
            client,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({
                "from": self.from,
                "to": [message.to_email],
                "subject": message.subject,
                "html": message.html_body,
            }))
            .send()
            .await
            .context("Failed to reach email API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Email API returned {status}: {body}"));
        }

        Ok(())
    }
}

#[must_use]
pub fn verification_email(to_email: &str, full_name: &str, verify_url: &str) -> EmailMessage {
    let html_body = format!(
        "<p>Hi {full_name},</p>\
         <p>Welcome to Lectern. Please confirm your email address by clicking the \
         link below. The link expires shortly, so do not wait too long.</p>\
         <p><a href=\"{verify_url}\">Verify your email</a></p>\
         <p>If you did not create an account, you can ignore this message.</p>"
    );

    EmailMessage {
        to_email: to_email.to_string(),
        subject: "Verify your email address".to_string(),
        html_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sender_always_succeeds() -> Result<()> {
        let message = verification_email(
            "new@example.com",
            "New User",
            "http://localhost:5173/verify-email?token=abc",
        );
        LogEmailSender.send(&message).await
    }

    #[test]
    fn test_verification_email_contains_link_and_name() {
        let message = verification_email(
            "new@example.com",
            "New User",
            "http://localhost:5173/verify-email?token=abc",
        );

        assert_eq!(message.to_email, "new@example.com");
        assert!(message.html_body.contains("Hi New User"));
        assert!(
            message
                .html_body
                .contains("http://localhost:5173/verify-email?token=abc")
        );
    }
}
