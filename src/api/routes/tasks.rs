//! `/tasks` endpoints. Updates run through the workflow engine, so closing
//! the last open task of an issue readies the issue for closure.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use qms_lib::update::{NewTask, TaskUpdate};
use qms_lib::view::TaskDetails;

use crate::api::AppState;
use crate::api::auth::Authenticated;
use crate::api::error::ApiError;
use crate::api::extract::EntityId;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list).post(create))
        .route(
            "/tasks/{id}",
            get(show).patch(update).put(update).delete(remove),
        )
}

async fn list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Json<Vec<TaskDetails>> {
    Json(state.qms.lock().await.list_tasks(&caller))
}

async fn show(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
) -> Result<Json<TaskDetails>, ApiError> {
    Ok(Json(state.qms.lock().await.get_task(&caller, id)?))
}

async fn create(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskDetails>), ApiError> {
    let Json(draft) = body?;
    let task = state.qms.lock().await.create_task(&caller, &draft)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
    body: Result<Json<TaskUpdate>, JsonRejection>,
) -> Result<Json<TaskDetails>, ApiError> {
    let Json(patch) = body?;
    Ok(Json(state.qms.lock().await.update_task(&caller, id, &patch)?))
}

async fn remove(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    state.qms.lock().await.delete_task(&caller, id)?;
    Ok(StatusCode::NO_CONTENT)
}
