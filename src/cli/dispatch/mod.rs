use crate::cli::{
    actions::{Action, server},
    commands::{ARG_DSN, ARG_PORT, auth},
};
use anyhow::{Result, anyhow};
use clap::ArgMatches;
use secrecy::SecretString;

/// Build the Action from parsed arguments.
///
/// # Errors
///
/// Returns an error if a required argument is missing or the configuration
/// is inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(ARG_PORT)
        .copied()
        .ok_or_else(|| anyhow!("Port is required"))?;

    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .ok_or_else(|| anyhow!("DSN is required"))?;

    let client_url = matches
        .get_one::<String>(auth::ARG_CLIENT_URL)
        .cloned()
        .ok_or_else(|| anyhow!("Client URL is required"))?;

    let access_token_secret = matches
        .get_one::<String>(auth::ARG_ACCESS_TOKEN_SECRET)
        .cloned()
        .ok_or_else(|| anyhow!("Access token secret is required"))?;

    let refresh_token_secret = matches
        .get_one::<String>(auth::ARG_REFRESH_TOKEN_SECRET)
        .cloned()
        .ok_or_else(|| anyhow!("Refresh token secret is required"))?;

    if access_token_secret == refresh_token_secret {
        return Err(anyhow!(
            "Access and refresh token secrets must not be the same"
        ));
    }

    let google = match (
        matches.get_one::<String>(auth::ARG_GOOGLE_CLIENT_ID),
        matches.get_one::<String>(auth::ARG_GOOGLE_CLIENT_SECRET),
        matches.get_one::<String>(auth::ARG_GOOGLE_REDIRECT_URL),
    ) {
        (Some(client_id), Some(client_secret), Some(redirect_url)) => Some(server::GoogleArgs {
            client_id: client_id.clone(),
            client_secret: SecretString::from(client_secret.clone()),
            redirect_url: redirect_url.clone(),
        }),
        (None, None, None) => None,
        _ => {
            return Err(anyhow!(
                "Google OAuth requires client id, client secret and redirect URL together"
            ));
        }
    };

    Ok(Action::Server(Box::new(server::Args {
        port,
        dsn,
        client_url,
        access_token_secret: SecretString::from(access_token_secret),
        access_token_ttl_seconds: matches
            .get_one::<i64>(auth::ARG_ACCESS_TOKEN_TTL)
            .copied()
            .unwrap_or(900),
        refresh_token_secret: SecretString::from(refresh_token_secret),
        refresh_token_ttl_seconds: matches
            .get_one::<i64>(auth::ARG_REFRESH_TOKEN_TTL)
            .copied()
            .unwrap_or(604_800),
        verification_token_ttl_seconds: matches
            .get_one::<i64>(auth::ARG_VERIFICATION_TOKEN_TTL)
            .copied()
            .unwrap_or(900),
        sweep_interval_seconds: matches
            .get_one::<u64>(auth::ARG_SWEEP_INTERVAL)
            .copied()
            .unwrap_or(300),
        resend_api_key: matches
            .get_one::<String>(auth::ARG_RESEND_API_KEY)
            .map(|key| SecretString::from(key.clone())),
        email_from: matches
            .get_one::<String>(auth::ARG_EMAIL_FROM)
            .cloned()
            .unwrap_or_else(|| "Lectern <onboarding@resend.dev>".to_string()),
        google,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    const BASE_ARGS: [&str; 7] = [
        "lectern",
        "--dsn",
        "postgresql://localhost/lectern",
        "--access-token-secret",
        "a-secret",
        "--refresh-token-secret",
        "r-secret",
    ];

    fn matches_from(args: &[&str]) -> Result<ArgMatches> {
        Ok(commands::new().try_get_matches_from(args)?)
    }

    #[test]
    fn test_handler_server_action() -> Result<()> {
        temp_env::with_vars_unset(
            [
                "LECTERN_PORT",
                "LECTERN_CLIENT_URL",
                "LECTERN_GOOGLE_CLIENT_ID",
                "LECTERN_GOOGLE_CLIENT_SECRET",
                "LECTERN_GOOGLE_REDIRECT_URL",
            ],
            || -> Result<()> {
                let matches = matches_from(&BASE_ARGS)?;
                let Action::Server(args) = handler(&matches)?;

                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgresql://localhost/lectern");
                assert_eq!(args.client_url, "http://localhost:5173");
                assert_eq!(args.access_token_secret.expose_secret(), "a-secret");
                assert_eq!(args.access_token_ttl_seconds, 900);
                assert_eq!(args.refresh_token_ttl_seconds, 604_800);
                assert!(args.google.is_none());
                Ok(())
            },
        )
    }

    #[test]
    fn test_handler_rejects_equal_secrets() -> Result<()> {
        temp_env::with_vars_unset(["LECTERN_PORT"], || -> Result<()> {
            let matches = matches_from(&[
                "lectern",
                "--dsn",
                "postgresql://localhost/lectern",
                "--access-token-secret",
                "same",
                "--refresh-token-secret",
                "same",
            ])?;
            assert!(handler(&matches).is_err());
            Ok(())
        })
    }

    #[test]
    fn test_handler_rejects_partial_google_config() -> Result<()> {
        temp_env::with_vars_unset(
            ["LECTERN_GOOGLE_CLIENT_SECRET", "LECTERN_GOOGLE_REDIRECT_URL"],
            || -> Result<()> {
                let mut args = BASE_ARGS.to_vec();
                args.extend(["--google-client-id", "client-id"]);
                let matches = matches_from(&args)?;
                assert!(handler(&matches).is_err());
                Ok(())
            },
        )
    }

    #[test]
    fn test_handler_full_google_config() -> Result<()> {
        let mut args = BASE_ARGS.to_vec();
        args.extend([
            "--google-client-id",
            "client-id",
            "--google-client-secret",
            "client-secret",
            "--google-redirect-url",
            "http://localhost:8080/api/v1/oauth/google/callback",
        ]);
        let matches = matches_from(&args)?;
        let Action::Server(parsed) = handler(&matches)?;

        let google = parsed.google.expect("google config should be present");
        assert_eq!(google.client_id, "client-id");
        assert_eq!(
            google.redirect_url,
            "http://localhost:8080/api/v1/oauth/google/callback"
        );
        Ok(())
    }
}
