//! `POST /api/send-sms` and `POST /api/send-whatsapp`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::error::{Error, Result};
use crate::services::messaging::{format_sms, format_whatsapp, Messenger};
use crate::types::{RouteStop, SendMessageRequest, SendMessageResponse};

/// Format the route as plain text and hand it to the SMS provider
pub async fn handle_send_sms(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>> {
    dispatch(state.sms.as_ref(), format_sms, payload).await
}

/// Format the route with WhatsApp markup and hand it to the provider
pub async fn handle_send_whatsapp(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>> {
    dispatch(state.whatsapp.as_ref(), format_whatsapp, payload).await
}

async fn dispatch(
    messenger: &dyn Messenger,
    format: fn(&[RouteStop]) -> String,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>> {
    let Json(request) = payload.map_err(|e| Error::validation(e.body_text()))?;

    // Validated before any provider is contacted
    let (to, routes) = match (request.to, request.routes) {
        (Some(to), Some(routes)) if !to.trim().is_empty() => (to, routes.into_stops()),
        _ => {
            return Err(Error::validation(
                "Missing required fields: to and routes",
            ))
        }
    };

    let body = format(&routes);
    let message_id = messenger.send(&to, &body).await?;

    Ok(Json(SendMessageResponse {
        success: true,
        message_id,
    }))
}
