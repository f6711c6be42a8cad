//! `/auth` endpoints: login, registration, current user.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use qms_lib::User;
use qms_lib::update::Registration;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::AppState;
use crate::api::auth::Authenticated;
use crate::api::error::ApiError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
}

/// Passwords are accepted and ignored; the username alone identifies the account.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body?;
    let user = state.qms.lock().await.login(&request.username).map_err(|e| {
        info!(error = %e, "login rejected");
        ApiError::LoginFailed
    })?;
    let token = state.tokens.issue(&user)?;
    info!(user_id = user.id, "login succeeded");
    Ok(Json(LoginResponse { token, user }))
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(draft) = body?;
    let user = state.qms.lock().await.register(&draft)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn me(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.qms.lock().await.me(&caller)?))
}
