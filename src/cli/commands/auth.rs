//! Authentication and session related arguments.
//!
//! Secrets are required and intentionally have no defaults. The access and
//! refresh secrets must differ so a refresh token can never pass access-token
//! verification.

use clap::{Arg, Command, builder::ValueParser};

pub const ARG_CLIENT_URL: &str = "client-url";
pub const ARG_ACCESS_TOKEN_SECRET: &str = "access-token-secret";
pub const ARG_ACCESS_TOKEN_TTL: &str = "access-token-ttl-seconds";
pub const ARG_REFRESH_TOKEN_SECRET: &str = "refresh-token-secret";
pub const ARG_REFRESH_TOKEN_TTL: &str = "refresh-token-ttl-seconds";
pub const ARG_VERIFICATION_TOKEN_TTL: &str = "verification-token-ttl-seconds";
pub const ARG_SWEEP_INTERVAL: &str = "sweep-interval-seconds";
pub const ARG_RESEND_API_KEY: &str = "resend-api-key";
pub const ARG_EMAIL_FROM: &str = "email-from";
pub const ARG_GOOGLE_CLIENT_ID: &str = "google-client-id";
pub const ARG_GOOGLE_CLIENT_SECRET: &str = "google-client-secret";
pub const ARG_GOOGLE_REDIRECT_URL: &str = "google-redirect-url";

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CLIENT_URL)
                .long(ARG_CLIENT_URL)
                .help("Frontend base URL, used for CORS, cookies and verification links")
                .default_value("http://localhost:5173")
                .env("LECTERN_CLIENT_URL")
                .value_parser(ValueParser::string()),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_SECRET)
                .long(ARG_ACCESS_TOKEN_SECRET)
                .help("HMAC secret for signing access tokens")
                .env("LECTERN_ACCESS_TOKEN_SECRET")
                .required(true)
                .hide_env_values(true)
                .value_parser(ValueParser::string()),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_TTL)
                .long(ARG_ACCESS_TOKEN_TTL)
                .help("Access token lifetime in seconds")
                .default_value("900")
                .env("LECTERN_ACCESS_TOKEN_TTL_SECONDS")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_SECRET)
                .long(ARG_REFRESH_TOKEN_SECRET)
                .help("HMAC secret for signing refresh tokens, must differ from the access secret")
                .env("LECTERN_REFRESH_TOKEN_SECRET")
                .required(true)
                .hide_env_values(true)
                .value_parser(ValueParser::string()),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_TTL)
                .long(ARG_REFRESH_TOKEN_TTL)
                .help("Refresh token lifetime in seconds")
                .default_value("604800")
                .env("LECTERN_REFRESH_TOKEN_TTL_SECONDS")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_VERIFICATION_TOKEN_TTL)
                .long(ARG_VERIFICATION_TOKEN_TTL)
                .help("Email verification token lifetime in seconds")
                .default_value("900")
                .env("LECTERN_VERIFICATION_TOKEN_TTL_SECONDS")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SWEEP_INTERVAL)
                .long(ARG_SWEEP_INTERVAL)
                .help("Interval in seconds between sweeps of expired tokens")
                .default_value("300")
                .env("LECTERN_SWEEP_INTERVAL_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_RESEND_API_KEY)
                .long(ARG_RESEND_API_KEY)
                .help("Resend API key, verification emails are logged instead of sent when unset")
                .env("LECTERN_RESEND_API_KEY")
                .hide_env_values(true)
                .value_parser(ValueParser::string()),
        )
        .arg(
            Arg::new(ARG_EMAIL_FROM)
                .long(ARG_EMAIL_FROM)
                .help("From header for outgoing verification emails")
                .default_value("Lectern <onboarding@resend.dev>")
                .env("LECTERN_EMAIL_FROM")
                .value_parser(ValueParser::string()),
        )
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_ID)
                .long(ARG_GOOGLE_CLIENT_ID)
                .help("Google OAuth client id, Google sign-in is disabled when unset")
                .env("LECTERN_GOOGLE_CLIENT_ID")
                .value_parser(ValueParser::string()),
        )
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_SECRET)
                .long(ARG_GOOGLE_CLIENT_SECRET)
                .help("Google OAuth client secret")
                .env("LECTERN_GOOGLE_CLIENT_SECRET")
                .hide_env_values(true)
                .value_parser(ValueParser::string()),
        )
        .arg(
            Arg::new(ARG_GOOGLE_REDIRECT_URL)
                .long(ARG_GOOGLE_REDIRECT_URL)
                .help("Redirect URL registered with Google for the OAuth callback")
                .env("LECTERN_GOOGLE_REDIRECT_URL")
                .value_parser(ValueParser::string()),
        )
}
