//! Page API handlers.
//!
//! Everything except [`get_public_page`] runs behind the session guard and
//! acts on behalf of the injected [`Identity`]. A page that belongs to
//! someone else answers exactly like a page that does not exist.

use axum::{
    Json,
    extract::{Extension, Path, State, rejection::JsonRejection},
};
use charmbook::{auth::Identity, pages::{Page, PageInput}};

use super::{Ack, AppState, Created, error::ApiError};

/// List the caller's pages, most recently updated first.
pub async fn list_pages(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<Vec<Page>>, ApiError> {
    Ok(Json(state.pages.list_mine(&caller).await?))
}

/// Create a page owned by the caller.
///
/// # Request Body
///
/// ```json
/// { "title": "Summer", "note": "beach charms", "is_public": false }
/// ```
pub async fn create_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    payload: Result<Json<PageInput>, JsonRejection>,
) -> Result<Json<Created>, ApiError> {
    let Json(input) = payload?;
    let id = state.pages.create(&caller, input).await?;
    Ok(Json(Created { id }))
}

/// Read one of the caller's pages.
///
/// # Errors
///
/// - `404 Not Found`: Page absent or owned by someone else
pub async fn get_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Page>, ApiError> {
    Ok(Json(state.pages.get_mine(&caller, &id).await?))
}

/// Replace the title, note and visibility of one of the caller's pages.
pub async fn update_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<PageInput>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let Json(input) = payload?;
    state.pages.update(&caller, &id, &input).await?;
    Ok(Ack::ok())
}

/// Delete one of the caller's pages together with its charms.
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    state.pages.delete(&caller, &id).await?;
    Ok(Ack::ok())
}

/// Read a page flagged public; no session needed.
///
/// # Errors
///
/// - `404 Not Found`: Page absent
/// - `403 Forbidden`: Page exists but is private
pub async fn get_public_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Page>, ApiError> {
    Ok(Json(state.pages.get_public(&id).await?))
}
