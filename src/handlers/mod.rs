//! HTTP API handlers

pub mod notify;
pub mod optimize;
pub mod routes;
pub mod sessions;
pub mod territories;
pub mod upload;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::mapping::ColumnMapper;
use crate::services::messaging::Messenger;
use crate::services::optimizer::OptimizationBackend;
use crate::services::workflow::SessionStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn OptimizationBackend>,
    pub sms: Arc<dyn Messenger>,
    pub whatsapp: Arc<dyn Messenger>,
    pub mapper: Arc<dyn ColumnMapper>,
    pub sessions: Arc<SessionStore>,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/optimize", post(optimize::handle_optimize))
        .route("/api/routes/:route_id", get(routes::handle_get_route))
        .route(
            "/api/territories",
            get(territories::handle_list).post(territories::handle_create),
        )
        .route("/api/send-sms", post(notify::handle_send_sms))
        .route("/api/send-whatsapp", post(notify::handle_send_whatsapp))
        .route("/api/upload", post(upload::handle_upload))
        .route("/api/sessions", post(sessions::handle_create))
        .route(
            "/api/sessions/:session_id",
            get(sessions::handle_status).delete(sessions::handle_delete),
        )
        .route(
            "/api/sessions/:session_id/upload",
            post(sessions::handle_upload),
        )
        .route(
            "/api/sessions/:session_id/optimize",
            post(sessions::handle_optimize),
        )
        .route(
            "/api/sessions/:session_id/retry",
            post(sessions::handle_retry),
        )
        .route(
            "/api/sessions/:session_id/reset",
            post(sessions::handle_reset),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
