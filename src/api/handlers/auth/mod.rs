//! Credential and session lifecycle: registration, email verification,
//! password and federated login, token refresh, revocation.

pub mod error;
pub mod login;
pub mod oauth;
pub mod principal;
pub mod profile;
pub mod register;
pub mod session;
pub mod state;
pub mod storage;
pub mod strategy;
pub mod sweeper;
pub mod tokens;
pub mod types;
pub mod verification;

mod password;
mod utils;
