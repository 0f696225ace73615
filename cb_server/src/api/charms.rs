//! Charm API handlers.
//!
//! A charm is reachable only through a page the caller owns. The parent page
//! is always looked up server-side, never taken from the request body.

use axum::{
    Json,
    extract::{Extension, Path, State, rejection::JsonRejection},
};
use charmbook::{
    auth::Identity,
    charms::{Charm, CharmInput, CharmPatch},
};

use super::{Ack, AppState, Created, error::ApiError};

/// List the charms of one of the caller's pages.
pub async fn list_charms(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(page_id): Path<String>,
) -> Result<Json<Vec<Charm>>, ApiError> {
    Ok(Json(state.charms.list_by_page(&caller, &page_id).await?))
}

/// Add a charm to one of the caller's pages.
///
/// # Request Body
///
/// ```json
/// { "shape": "heart", "color": "gold", "title": "Anniversary", "text_value": "10 years" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown shape or color, or `text_value` over 256 bytes
/// - `404 Not Found`: Page absent or owned by someone else
pub async fn create_charm(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(page_id): Path<String>,
    payload: Result<Json<CharmInput>, JsonRejection>,
) -> Result<Json<Created>, ApiError> {
    let Json(input) = payload?;
    let id = state.charms.create(&caller, &page_id, input).await?;
    Ok(Json(Created { id }))
}

/// Update a charm; omitted or empty fields keep their stored values.
pub async fn update_charm(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<CharmPatch>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let Json(patch) = payload?;
    state.charms.update(&caller, &id, patch).await?;
    Ok(Ack::ok())
}

/// Delete a charm.
pub async fn delete_charm(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    state.charms.delete(&caller, &id).await?;
    Ok(Ack::ok())
}
