//! `/api/sessions` workflow endpoints
//!
//! One session walks a spreadsheet from upload through column mapping to
//! optimized routes, with a retry action after a failed optimization.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde_json::{json, Value};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use super::upload::read_workbook;
use super::AppState;
use crate::error::{Error, Result};
use crate::services::workflow::WorkflowSession;
use crate::types::{OptimizationResult, OptimizeRequest};

fn fetch(state: &AppState, id: Uuid) -> Result<Arc<AsyncMutex<WorkflowSession>>> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| Error::NotFound("Session not found".to_string()))
}

/// Open a new session
pub async fn handle_create(State(state): State<AppState>) -> Json<Value> {
    let id = state
        .sessions
        .create(Arc::clone(&state.mapper), Arc::clone(&state.backend));
    Json(json!({ "sessionId": id, "state": "upload" }))
}

/// Report where a session stands
pub async fn handle_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let session = fetch(&state, session_id)?;
    let session = session.lock().await;
    Ok(Json(json!({
        "sessionId": session_id,
        "state": session.state().as_str(),
        "lastError": session.last_error(),
    })))
}

/// Attach an uploaded workbook to the session
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Value>> {
    let session = fetch(&state, session_id)?;
    let (_, data) = read_workbook(multipart).await?;

    let mut session = session.lock().await;
    let count = session.load_workbook(&data)?;
    Ok(Json(json!({
        "state": session.state().as_str(),
        "rows": count,
    })))
}

/// Map the session's rows and run the optimization
pub async fn handle_optimize(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<OptimizationResult>> {
    let Json(request) = payload.map_err(|e| Error::validation(e.body_text()))?;
    let session = fetch(&state, session_id)?;

    let mut session = session.lock().await;
    let result = session.map_and_optimize(request.session_params()).await?;
    Ok(Json(result))
}

/// Re-run a failed optimization without re-uploading
pub async fn handle_retry(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<OptimizationResult>> {
    let session = fetch(&state, session_id)?;
    let mut session = session.lock().await;
    let result = session.retry().await?;
    Ok(Json(result))
}

/// Discard the session's data and return it to upload
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let session = fetch(&state, session_id)?;
    let mut session = session.lock().await;
    session.reset();
    Ok(Json(json!({ "state": session.state().as_str() })))
}

/// Drop the session entirely
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>> {
    if !state.sessions.remove(session_id) {
        return Err(Error::NotFound("Session not found".to_string()));
    }
    Ok(Json(json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::handlers::test_support::{state_with, FakeBackend, RecordingMessenger};
    use crate::services::spreadsheet::Row;

    fn fixtures() -> (AppState, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::default());
        let state = state_with(
            Arc::clone(&backend),
            Arc::new(RecordingMessenger::default()),
            Arc::new(RecordingMessenger::default()),
        );
        (state, backend)
    }

    async fn create_session(state: &AppState) -> Uuid {
        let Json(created) = handle_create(State(state.clone())).await;
        serde_json::from_value(created["sessionId"].clone()).unwrap()
    }

    fn address_rows(count: usize) -> Vec<Row> {
        (0..count)
            .map(|i| {
                let mut row = Row::new();
                row.insert("Address".to_string(), format!("{} Main St", i + 1));
                row
            })
            .collect()
    }

    async fn load_rows(state: &AppState, id: Uuid, rows: Vec<Row>) {
        let session = state.sessions.get(id).unwrap();
        session.lock().await.load_rows(rows).unwrap();
    }

    #[tokio::test]
    async fn test_create_then_status() {
        let (state, _) = fixtures();
        let id = create_session(&state).await;

        let Json(status) = handle_status(State(state), Path(id)).await.unwrap();
        assert_eq!(status["state"], "upload");
        assert!(status["lastError"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (state, _) = fixtures();
        let result = handle_status(State(state), Path(Uuid::new_v4())).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_optimize_maps_rows_through_the_session() {
        let (state, backend) = fixtures();
        let id = create_session(&state).await;
        load_rows(&state, id, address_rows(2)).await;

        let Json(result) = handle_optimize(
            State(state.clone()),
            Path(id),
            Ok(Json(OptimizeRequest::default())),
        )
        .await
        .unwrap();

        assert_eq!(result.summary.total_stops, 2);
        assert_eq!(backend.optimize_calls.load(Ordering::SeqCst), 1);

        let Json(status) = handle_status(State(state), Path(id)).await.unwrap();
        assert_eq!(status["state"], "results");
    }

    #[tokio::test]
    async fn test_optimize_before_upload_is_rejected() {
        let (state, backend) = fixtures();
        let id = create_session(&state).await;

        let result = handle_optimize(
            State(state),
            Path(id),
            Ok(Json(OptimizeRequest::default())),
        )
        .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(backend.optimize_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_retry_after_failure_recovers() {
        let (state, backend) = fixtures();
        let id = create_session(&state).await;
        load_rows(&state, id, address_rows(1)).await;

        backend.fail.store(true, Ordering::SeqCst);
        let result = handle_optimize(
            State(state.clone()),
            Path(id),
            Ok(Json(OptimizeRequest::default())),
        )
        .await;
        assert!(matches!(result, Err(Error::Gateway { .. })));

        let Json(status) = handle_status(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(status["state"], "error");

        backend.fail.store(false, Ordering::SeqCst);
        let Json(result) = handle_retry(State(state), Path(id)).await.unwrap();
        assert_eq!(result.summary.total_stops, 1);
        assert_eq!(backend.optimize_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reset_and_delete() {
        let (state, _) = fixtures();
        let id = create_session(&state).await;
        load_rows(&state, id, address_rows(1)).await;

        let Json(after_reset) = handle_reset(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(after_reset["state"], "upload");

        let Json(deleted) = handle_delete(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(deleted["deleted"], true);

        let result = handle_delete(State(state), Path(id)).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
