//! REST surface over [`qms_lib::Qms`].
//!
//! - [`auth`] - JWT issuing/verification and the caller extractor
//! - [`error`] - error → HTTP response mapping
//! - [`routes`] - one handler module per resource
//!
//! Handlers hold the service mutex for the whole of their core work, so
//! each request sees and leaves a consistent store.

pub mod auth;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use qms_lib::{InMemoryStore, Qms};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use auth::JwtAuth;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub qms: Arc<Mutex<Qms>>,
    pub tokens: Arc<JwtAuth>,
}

impl AppState {
    #[must_use]
    pub fn new(qms: Qms, tokens: JwtAuth) -> Self {
        Self {
            qms: Arc::new(Mutex::new(qms)),
            tokens: Arc::new(tokens),
        }
    }

    /// State for a fresh process: seeded or empty store, key from config.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Qms::new(initial_store(config)),
            JwtAuth::new(
                config.auth.jwt_secret.as_bytes(),
                config.auth.token_ttl_hours,
            ),
        )
    }
}

/// Demo data when `data.seed` is on, otherwise an empty store.
#[must_use]
pub fn initial_store(config: &Config) -> InMemoryStore {
    if config.data.seed {
        InMemoryStore::seeded()
    } else {
        InMemoryStore::new()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::session::routes())
        .merge(routes::users::routes())
        .merge(routes::defects::routes())
        .merge(routes::issues::routes())
        .merge(routes::tasks::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
