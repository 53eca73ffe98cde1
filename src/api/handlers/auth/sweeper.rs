//! Background sweep of expired token rows.
//!
//! Handlers filter on `expires_at > NOW()` regardless; the sweep only keeps
//! the token tables from accumulating dead rows.

use sqlx::PgPool;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error};

use super::storage::delete_expired_tokens;

/// Spawn a background task that periodically deletes expired verification and
/// refresh tokens.
pub fn spawn(pool: PgPool, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(interval).await;

            match delete_expired_tokens(&pool).await {
                Ok((verification, refresh)) => {
                    if verification + refresh > 0 {
                        debug!(verification, refresh, "swept expired tokens");
                    }
                }
                Err(err) => error!("token sweep failed: {err}"),
            }
        }
    })
}
