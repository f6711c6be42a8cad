//! `/defects` endpoints.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use qms_lib::update::{DefectUpdate, NewDefect};
use qms_lib::view::DefectDetails;

use crate::api::AppState;
use crate::api::auth::Authenticated;
use crate::api::error::ApiError;
use crate::api::extract::EntityId;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/defects", get(list).post(create))
        .route(
            "/defects/{id}",
            get(show).patch(update).put(update).delete(remove),
        )
}

async fn list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Json<Vec<DefectDetails>> {
    Json(state.qms.lock().await.list_defects(&caller))
}

async fn show(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
) -> Result<Json<DefectDetails>, ApiError> {
    Ok(Json(state.qms.lock().await.get_defect(&caller, id)?))
}

async fn create(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    body: Result<Json<NewDefect>, JsonRejection>,
) -> Result<(StatusCode, Json<DefectDetails>), ApiError> {
    let Json(draft) = body?;
    let defect = state.qms.lock().await.create_defect(&caller, &draft)?;
    Ok((StatusCode::CREATED, Json(defect)))
}

async fn update(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
    body: Result<Json<DefectUpdate>, JsonRejection>,
) -> Result<Json<DefectDetails>, ApiError> {
    let Json(patch) = body?;
    Ok(Json(
        state.qms.lock().await.update_defect(&caller, id, &patch)?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    state.qms.lock().await.delete_defect(&caller, id)?;
    Ok(StatusCode::NO_CONTENT)
}
