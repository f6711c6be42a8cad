//! Serve command implementation.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::cli::ServeArgs;
use crate::config::Config;

/// Fold CLI flags over the loaded config.
#[must_use]
pub fn effective_config(args: &ServeArgs, mut config: Config) -> Config {
    if let Some(ref bind) = args.bind {
        config.server.bind.clone_from(bind);
    }
    if args.no_seed {
        config.data.seed = false;
    }
    config
}

/// Execute the serve command.
///
/// # Errors
///
/// Returns an error if the runtime cannot start, the address cannot be
/// bound, or the server fails.
pub fn execute(args: &ServeArgs, config: Config) -> Result<()> {
    let config = effective_config(args, config);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(serve(config))
}

async fn serve(config: Config) -> Result<()> {
    if config.auth.uses_default_secret() {
        warn!("using the built-in JWT secret; set QMS_JWT_SECRET outside development");
    }

    let state = AppState::from_config(&config);
    {
        let qms = state.qms.lock().await;
        let store = qms.store();
        info!(
            seeded = config.data.seed,
            users = store.user_count(),
            issues = store.issue_count(),
            tasks = store.task_count(),
            "store ready"
        );
    }

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    let addr = listener.local_addr().context("failed to read bound address")?;
    info!(addr = %addr, "QMS API listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = ServeArgs {
            bind: Some("127.0.0.1:0".to_string()),
            no_seed: true,
        };
        let config = effective_config(&args, Config::default());
        assert_eq!(config.server.bind, "127.0.0.1:0");
        assert!(!config.data.seed);
    }

    #[test]
    fn absent_flags_keep_config() {
        let config = effective_config(&ServeArgs::default(), Config::default());
        assert_eq!(config, Config::default());
    }
}
