//! Token command implementation.
//!
//! Mints a bearer token the way `/api/auth/login` would, for poking at a
//! running server with curl.

use anyhow::{Context, Result};
use qms_lib::Qms;

use crate::api::{self, auth::JwtAuth};
use crate::cli::TokenArgs;
use crate::config::Config;

/// Issue a token for `username` against a fresh store built from `config`.
///
/// # Errors
///
/// Returns an error if the user doesn't exist or signing fails.
pub fn issue_token(username: &str, config: &Config) -> Result<String> {
    let user = Qms::new(api::initial_store(config))
        .login(username)
        .with_context(|| format!("cannot issue token for {username:?}"))?;
    JwtAuth::new(config.auth.jwt_secret.as_bytes(), config.auth.token_ttl_hours)
        .issue(&user)
        .context("failed to sign token")
}

/// Execute the token command.
///
/// # Errors
///
/// Returns an error if the token cannot be issued.
pub fn execute(args: &TokenArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    if args.no_seed {
        config.data.seed = false;
    }
    let token = issue_token(&args.username, &config)?;
    println!("{token}");
    Ok(())
}
