//! `/users` endpoints. All require a quality-equivalent caller.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use qms_lib::User;
use qms_lib::update::{NewUser, UserUpdate};

use crate::api::AppState;
use crate::api::auth::Authenticated;
use crate::api::error::ApiError;
use crate::api::extract::EntityId;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route(
            "/users/{id}",
            get(show).patch(update).put(update).delete(remove),
        )
}

async fn list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.qms.lock().await.list_users(&caller)?))
}

async fn show(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.qms.lock().await.get_user(&caller, id)?))
}

async fn create(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(draft) = body?;
    let user = state.qms.lock().await.create_user(&caller, &draft)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
    body: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(patch) = body?;
    Ok(Json(state.qms.lock().await.update_user(&caller, id, &patch)?))
}

async fn remove(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    state.qms.lock().await.delete_user(&caller, id)?;
    Ok(StatusCode::NO_CONTENT)
}
