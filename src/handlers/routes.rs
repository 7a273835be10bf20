//! `GET /api/routes/{route_id}`

use axum::extract::{Path, State};
use axum::Json;

use super::AppState;
use crate::error::{Error, Result};
use crate::types::Route;

/// Fetch one route from the vendor and return its canonical shape
pub async fn handle_get_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<Json<Route>> {
    if route_id.trim().is_empty() {
        return Err(Error::validation("Route ID is required"));
    }

    let route = state.backend.fetch_route(&route_id).await?;
    Ok(Json(route))
}
