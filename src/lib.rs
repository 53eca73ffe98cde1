//! # Lectern (E-learning Platform Backend)
//!
//! `lectern` is the backend for an e-learning platform. Its core is
//! credential and session lifecycle management: registration gated by email
//! verification, password login, short-lived access tokens, server-tracked
//! refresh tokens, and federated (Google) identity linking.
//!
//! ## Session Model
//!
//! Authentication is cookie based. A short-lived access token (JWT, HS256)
//! authorizes protected requests; a longer-lived refresh token backs the
//! session server-side so it can be revoked. At most one refresh token row
//! exists per user: a new login atomically replaces the previous one, so a
//! login on a second device invalidates the first.
//!
//! ## Verification
//!
//! Local accounts start unverified and cannot log in until the single-use,
//! time-boxed email verification token is consumed. Federated accounts are
//! created verified; the provider already proved email ownership.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
