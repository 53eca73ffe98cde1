//! Database helpers for credentials, verification tokens, and refresh tokens.

use anyhow::{Context, Result, anyhow};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

const CREDENTIAL_COLUMNS: &str =
    "id, full_name, email, password_hash, is_verified, provider, provider_id, image, role";

/// Identity provider that owns a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Local,
    Google,
    Github,
}

impl Provider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Google => "google",
            Self::Github => "github",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "local" => Ok(Self::Local),
            "google" => Ok(Self::Google),
            "github" => Ok(Self::Github),
            other => Err(anyhow!("unknown provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Teacher,
    Student,
    User,
    Writer,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::User => "user",
            Self::Writer => "writer",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            "user" => Ok(Self::User),
            "writer" => Ok(Self::Writer),
            other => Err(anyhow!("unknown role: {other}")),
        }
    }
}

/// Full credential row, the password hash never leaves this module's callers.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub is_verified: bool,
    pub provider: Provider,
    pub provider_id: Option<String>,
    pub image: Option<String>,
    pub role: Role,
}

fn credential_from_row(row: &PgRow) -> Result<Credential> {
    let provider: String = row.get("provider");
    let role: String = row.get("role");
    Ok(Credential {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        is_verified: row.get("is_verified"),
        provider: Provider::parse(&provider)?,
        provider_id: row.get("provider_id"),
        image: row.get("image"),
        role: Role::parse(&role)?,
    })
}

/// Outcome when attempting to create a new unverified user.
#[derive(Debug)]
pub(super) enum InsertOutcome {
    Created(Uuid),
    Conflict,
}

pub(super) async fn insert_unverified(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    full_name: &str,
    email: &str,
    password_hash: &str,
) -> Result<InsertOutcome> {
    let query = r"
        INSERT INTO users (full_name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut **tx)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(InsertOutcome::Created(row.get("id"))),
        Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

pub(super) async fn lookup_by_email(pool: &PgPool, email: &str) -> Result<Option<Credential>> {
    let query = format!("SELECT {CREDENTIAL_COLUMNS} FROM users WHERE email = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;

    row.as_ref().map(credential_from_row).transpose()
}

pub(super) async fn lookup_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Credential>> {
    let query = format!("SELECT {CREDENTIAL_COLUMNS} FROM users WHERE id = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by id")?;

    row.as_ref().map(credential_from_row).transpose()
}

/// Activate a user after email verification. Idempotent, returns false when
/// the user no longer exists.
pub(super) async fn mark_verified(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
) -> Result<bool> {
    let query = r"
        UPDATE users
        SET is_verified = TRUE, updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .context("failed to mark user verified")?;

    Ok(result.rows_affected() > 0)
}

/// Remove a credential and its token rows (registration rollback only).
pub(super) async fn delete_user(pool: &PgPool, user_id: Uuid) -> Result<()> {
    // Token rows go with the user via ON DELETE CASCADE
    let query = "DELETE FROM users WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete user")?;

    Ok(())
}

/// Profile data pulled from a federated provider.
#[derive(Debug)]
pub(super) struct FederatedProfile {
    pub(super) email: String,
    pub(super) full_name: String,
    pub(super) provider: Provider,
    pub(super) provider_id: String,
    pub(super) image: Option<String>,
}

/// Look up a credential by email, creating a verified federated one when absent.
///
/// An existing credential is returned untouched, signing in with Google links
/// by email rather than duplicating the account.
pub(super) async fn find_or_create_federated(
    pool: &PgPool,
    profile: FederatedProfile,
) -> Result<Credential> {
    if let Some(existing) = lookup_by_email(pool, &profile.email).await? {
        return Ok(existing);
    }

    let query = format!(
        r"
        INSERT INTO users (full_name, email, is_verified, provider, provider_id, image)
        VALUES ($1, $2, TRUE, $3, $4, $5)
        ON CONFLICT (email) DO NOTHING
        RETURNING {CREDENTIAL_COLUMNS}
    "
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(profile.provider.as_str())
        .bind(&profile.provider_id)
        .bind(&profile.image)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to insert federated user")?;

    if let Some(row) = row {
        return credential_from_row(&row);
    }

    // Lost the insert race, the concurrent row wins
    lookup_by_email(pool, &profile.email)
        .await?
        .ok_or_else(|| anyhow!("federated user vanished after conflict"))
}

pub(super) async fn insert_verification_token(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    token_hash: &[u8],
    ttl_seconds: i64,
) -> Result<()> {
    let query = r"
        INSERT INTO verification_tokens (user_id, token_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(token_hash)
        .bind(ttl_seconds)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .context("failed to insert verification token")?;

    Ok(())
}

/// Consume a verification token: single use by deletion. Returns the owning
/// user id, or `None` when the token is unknown or expired.
pub(super) async fn consume_verification_token(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    token_hash: &[u8],
) -> Result<Option<Uuid>> {
    let query = r"
        DELETE FROM verification_tokens
        WHERE token_hash = $1 AND expires_at > NOW()
        RETURNING user_id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .context("failed to consume verification token")?;

    Ok(row.map(|row| row.get("user_id")))
}

/// Store a refresh token hash, replacing any previous one for the user.
///
/// The UNIQUE(user_id) constraint makes this the single-active-session
/// enforcement point, concurrent logins serialize on the conflict and exactly
/// one row survives.
pub(super) async fn replace_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &[u8],
    ttl_seconds: i64,
) -> Result<()> {
    let query = r"
        INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        ON CONFLICT (user_id) DO UPDATE
        SET token_hash = EXCLUDED.token_hash,
            expires_at = EXCLUDED.expires_at,
            created_at = NOW()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(token_hash)
        .bind(ttl_seconds)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to store refresh token")?;

    Ok(())
}

/// Look up an unexpired refresh token by hash, returning the owning user id.
pub(super) async fn lookup_refresh_token(pool: &PgPool, token_hash: &[u8]) -> Result<Option<Uuid>> {
    let query = r"
        SELECT user_id FROM refresh_tokens
        WHERE token_hash = $1 AND expires_at > NOW()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup refresh token")?;

    Ok(row.map(|row| row.get("user_id")))
}

/// Revoke a stored refresh token by hash (logout).
pub(super) async fn delete_refresh_token(pool: &PgPool, token_hash: &[u8]) -> Result<bool> {
    let query = "DELETE FROM refresh_tokens WHERE token_hash = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete refresh token")?;

    Ok(result.rows_affected() > 0)
}

/// Drop expired rows from both token tables. Returns (verification, refresh)
/// row counts for the sweeper's logs.
pub(crate) async fn delete_expired_tokens(pool: &PgPool) -> Result<(u64, u64)> {
    let query = "DELETE FROM verification_tokens WHERE expires_at <= NOW()";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let verification = sqlx::query(query)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to sweep verification tokens")?
        .rows_affected();

    let query = "DELETE FROM refresh_tokens WHERE expires_at <= NOW()";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let refresh = sqlx::query(query)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to sweep refresh tokens")?
        .rows_affected();

    Ok((verification, refresh))
}
