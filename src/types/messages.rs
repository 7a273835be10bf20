//! HTTP API request/response types

use serde::{Deserialize, Serialize};

use super::{Route, RouteStop, StopInput};

/// Body of `POST /api/optimize`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    #[serde(default)]
    pub stops: Vec<StopInput>,
    #[serde(default, alias = "territory_id")]
    pub territory_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub vehicle_capacity: Option<i64>,
    #[serde(default)]
    pub time_windows: Option<bool>,
}

/// Session-level parameters extracted from an optimize request
#[derive(Debug, Clone, Default)]
pub struct SessionParams {
    pub territory_id: Option<String>,
    pub date: Option<String>,
    pub vehicle_capacity: Option<i64>,
    pub time_windows: Option<bool>,
}

impl OptimizeRequest {
    pub fn session_params(&self) -> SessionParams {
        SessionParams {
            territory_id: self.territory_id.clone(),
            date: self.date.clone(),
            vehicle_capacity: self.vehicle_capacity,
            time_windows: self.time_windows,
        }
    }
}

/// Body of `POST /api/send-sms` and `POST /api/send-whatsapp`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub routes: Option<RoutesPayload>,
}

/// Routes accepted by the messaging endpoints
///
/// Callers send one optimized route, a list of routes, or a bare stop
/// list; all three collapse to the stops that get formatted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoutesPayload {
    Route(Route),
    Routes(Vec<Route>),
    Stops(Vec<RouteStop>),
}

impl RoutesPayload {
    pub fn into_stops(self) -> Vec<RouteStop> {
        match self {
            RoutesPayload::Route(route) => route.stops,
            RoutesPayload::Routes(routes) => {
                routes.into_iter().flat_map(|r| r.stops).collect()
            }
            RoutesPayload::Stops(stops) => stops,
        }
    }
}

/// Successful messaging response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    pub message_id: String,
}

/// Response of `POST /api/upload`: parsed spreadsheet rows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub rows: Vec<std::collections::HashMap<String, String>>,
    pub count: usize,
    pub columns: Vec<String>,
}
