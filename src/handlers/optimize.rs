//! `POST /api/optimize`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::error::{Error, Result};
use crate::services::normalizer::normalize_stops;
use crate::types::{OptimizationResult, OptimizeRequest};

/// Normalize the submitted stops and run them through the optimizer
pub async fn handle_optimize(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<OptimizationResult>> {
    let Json(request) = payload.map_err(|e| Error::validation(e.body_text()))?;

    // Rejected here, before anything reaches the vendor gateway
    if request.stops.is_empty() {
        return Err(Error::validation(
            "Invalid input data. Expected an array of stops.",
        ));
    }

    let stops = normalize_stops(&request.stops)?;
    info!("Optimize request with {} stops", stops.len());

    let result = state
        .backend
        .optimize(stops, &request.session_params())
        .await?;

    Ok(Json(result))
}
