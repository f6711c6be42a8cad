//! `/issues` endpoints. Status changes and deletion are gated in the service.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use qms_lib::update::{IssueUpdate, NewIssue};
use qms_lib::view::IssueDetails;

use crate::api::AppState;
use crate::api::auth::Authenticated;
use crate::api::error::ApiError;
use crate::api::extract::EntityId;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/issues", get(list).post(create))
        .route(
            "/issues/{id}",
            get(show).patch(update).put(update).delete(remove),
        )
}

async fn list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Json<Vec<IssueDetails>> {
    Json(state.qms.lock().await.list_issues(&caller))
}

async fn show(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
) -> Result<Json<IssueDetails>, ApiError> {
    Ok(Json(state.qms.lock().await.get_issue(&caller, id)?))
}

async fn create(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    body: Result<Json<NewIssue>, JsonRejection>,
) -> Result<(StatusCode, Json<IssueDetails>), ApiError> {
    let Json(draft) = body?;
    let issue = state.qms.lock().await.create_issue(&caller, &draft)?;
    Ok((StatusCode::CREATED, Json(issue)))
}

async fn update(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
    body: Result<Json<IssueUpdate>, JsonRejection>,
) -> Result<Json<IssueDetails>, ApiError> {
    let Json(patch) = body?;
    Ok(Json(
        state.qms.lock().await.update_issue(&caller, id, &patch)?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    state.qms.lock().await.delete_issue(&caller, id)?;
    Ok(StatusCode::NO_CONTENT)
}
