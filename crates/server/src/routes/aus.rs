use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use models::{Au, AuDraft};
use serde::Serialize;

use crate::errors::ApiError;
use crate::state::AppState;

/// Header carrying the admin token for deletes.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// `{message, au}` body returned by create and delete.
#[derive(Serialize, Debug)]
pub struct AuEnvelope {
    pub message: &'static str,
    pub au: Au,
}

/// List all AUs, newest first
pub async fn list_aus(State(state): State<AppState>) -> Result<Json<Vec<Au>>, ApiError> {
    Ok(Json(state.aus.list().await?))
}

/// Create an AU from `{name, author, desc, link?}`
pub async fn create_au(
    State(state): State<AppState>,
    payload: Result<Json<AuDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<AuEnvelope>), ApiError> {
    let Json(draft) = payload?;
    let au = state.aus.create(draft).await?;
    Ok((StatusCode::CREATED, Json(AuEnvelope { message: "AU saved successfully", au })))
}

/// Delete an AU; needs the admin token in `X-Admin-Token`
pub async fn delete_au(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<AuEnvelope>, ApiError> {
    let token = headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok());
    let au = state.aus.delete(&id, token).await?;
    Ok(Json(AuEnvelope { message: "AU deleted", au }))
}
