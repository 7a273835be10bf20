//! `GET`/`POST /api/territories`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::error::{Error, Result};
use crate::types::{CreateTerritoryRequest, Territory};

/// List the territories known to the optimizer
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<Territory>>> {
    let raw = state.backend.list_territories().await?;
    let territories: Vec<Territory> = serde_json::from_value(raw).map_err(|e| Error::Gateway {
        status: 502,
        body: format!("unexpected territory payload: {}", e),
    })?;
    Ok(Json(territories))
}

/// Create a new territory
pub async fn handle_create(
    State(state): State<AppState>,
    payload: Result<Json<CreateTerritoryRequest>, JsonRejection>,
) -> Result<Json<Territory>> {
    let Json(request) = payload.map_err(|e| Error::validation(e.body_text()))?;

    let name = match request.name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.trim(),
        _ => {
            return Err(Error::validation(
                "Invalid input data. Territory name is required.",
            ))
        }
    };

    let description = request.description.as_deref().unwrap_or_default();
    let raw = state.backend.create_territory(name, description).await?;
    let created: Territory = serde_json::from_value(raw).map_err(|e| Error::Gateway {
        status: 502,
        body: format!("unexpected territory payload: {}", e),
    })?;
    Ok(Json(created))
}
