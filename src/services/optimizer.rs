//! Optimization request/response translation
//!
//! Builds the vendor-facing payload from canonical stops, hands it to the
//! [`KardinalClient`], and normalizes the vendor's route shape back into
//! the canonical display shape. The optimization itself is opaque and
//! vendor-owned; everything here is format translation.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::defaults::{DEFAULT_TERRITORY, DEFAULT_VEHICLE_CAPACITY};
use crate::error::{Error, Result};
use crate::services::gateway::KardinalClient;
use crate::types::{
    Coordinates, OptimizationResult, OptimizationSummary, Route, RouteStatistics, RouteStop,
    SessionParams, Stop, TimeWindow,
};

/// Vendor-facing optimization request (snake_case wire format)
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationRequest {
    pub territory_id: String,
    pub date: String,
    pub constraints: Constraints,
    pub stops: Vec<RequestStop>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Constraints {
    pub vehicle_capacity: i64,
    pub time_windows: bool,
}

/// One stop as the vendor expects it
#[derive(Debug, Clone, Serialize)]
pub struct RequestStop {
    pub id: String,
    pub address: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,
    pub service_duration: i64,
    pub notes: String,
}

impl From<Stop> for RequestStop {
    fn from(stop: Stop) -> Self {
        Self {
            id: stop.id,
            address: stop.address,
            location: stop.location,
            coordinates: stop.coordinates,
            time_window: stop.time_window,
            service_duration: stop.service_duration,
            notes: stop.notes,
        }
    }
}

/// Assemble the vendor request, applying session defaults
///
/// Pure transformation: stop order is preserved exactly as received so
/// runs are reproducible.
pub fn build_request(stops: Vec<Stop>, params: &SessionParams) -> Result<OptimizationRequest> {
    if stops.is_empty() {
        return Err(Error::validation(
            "Invalid input data. Expected an array of stops.",
        ));
    }

    let date = params
        .date
        .clone()
        .unwrap_or_else(|| Utc::now().date_naive().to_string());

    Ok(OptimizationRequest {
        territory_id: params
            .territory_id
            .clone()
            .unwrap_or_else(|| DEFAULT_TERRITORY.to_string()),
        date,
        constraints: Constraints {
            vehicle_capacity: params.vehicle_capacity.unwrap_or(DEFAULT_VEHICLE_CAPACITY),
            time_windows: params.time_windows.unwrap_or(true),
        },
        stops: stops.into_iter().map(RequestStop::from).collect(),
    })
}

// Vendor response types. Everything optional: a missing field becomes a
// default, never an error.

#[derive(Debug, Deserialize)]
struct VendorOptimizeResponse {
    #[serde(default)]
    routes: Vec<VendorRoute>,
    #[serde(default)]
    total_stops: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct VendorRoute {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    vehicle: Option<String>,
    #[serde(default)]
    stops: Vec<VendorStop>,
    #[serde(default)]
    total_distance: Option<f64>,
    #[serde(default)]
    total_duration: Option<f64>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    route_polyline: Option<String>,
    #[serde(default)]
    territory: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct VendorStop {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    sequence: Option<i64>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    estimated_arrival_time: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    coordinates: Option<Coordinates>,
    #[serde(default)]
    time_window: Option<TimeWindow>,
}

/// Convert one raw vendor route into the canonical display shape
pub fn normalize_route(raw: Value) -> Result<Route> {
    let vendor: VendorRoute = serde_json::from_value(raw).map_err(|e| Error::Gateway {
        status: 502,
        body: format!("unexpected route payload: {}", e),
    })?;

    Ok(convert_route(vendor))
}

fn convert_route(vendor: VendorRoute) -> Route {
    Route {
        id: vendor.id.unwrap_or_default(),
        vehicle: vendor.vehicle.unwrap_or_default(),
        stops: vendor.stops.into_iter().map(convert_stop).collect(),
        statistics: RouteStatistics {
            total_distance: vendor.total_distance.unwrap_or(0.0),
            total_duration: vendor.total_duration.unwrap_or(0.0),
            start_time: vendor.start_time,
            end_time: vendor.end_time,
        },
        route_polyline: vendor.route_polyline,
        territory: vendor.territory,
    }
}

fn convert_stop(vendor: VendorStop) -> RouteStop {
    RouteStop {
        id: vendor.id.unwrap_or_default(),
        location: vendor
            .location
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| crate::defaults::DEFAULT_STOP_LOCATION.to_string()),
        address: vendor.address.unwrap_or_default(),
        sequence: vendor.sequence.unwrap_or(0),
        estimated_time: vendor.estimated_arrival_time,
        notes: vendor.notes.unwrap_or_default(),
        coordinates: vendor.coordinates,
        time_window: vendor.time_window,
    }
}

/// The optimization operations the HTTP layer and workflow depend on
///
/// A trait seam so the workflow controller and handlers can be exercised
/// against an in-memory backend.
#[async_trait]
pub trait OptimizationBackend: Send + Sync {
    async fn optimize(
        &self,
        stops: Vec<Stop>,
        params: &SessionParams,
    ) -> Result<OptimizationResult>;

    async fn fetch_route(&self, route_id: &str) -> Result<Route>;

    async fn list_territories(&self) -> Result<Value>;

    async fn create_territory(&self, name: &str, description: &str) -> Result<Value>;

    fn name(&self) -> &str;
}

/// The real backend: request builder + gateway + response normalizer
pub struct OptimizationService {
    gateway: KardinalClient,
}

impl OptimizationService {
    pub fn new(gateway: KardinalClient) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl OptimizationBackend for OptimizationService {
    async fn optimize(
        &self,
        stops: Vec<Stop>,
        params: &SessionParams,
    ) -> Result<OptimizationResult> {
        let request = build_request(stops, params)?;
        let date = request.date.clone();
        let stop_count = request.stops.len();

        info!("Optimizing {} stops in territory {}", stop_count, request.territory_id);

        let raw = self.gateway.post("/routes/optimize", &request).await?;
        let response: VendorOptimizeResponse =
            serde_json::from_value(raw).map_err(|e| Error::Gateway {
                status: 502,
                body: format!("unexpected optimize payload: {}", e),
            })?;

        let routes: Vec<Route> = response.routes.into_iter().map(convert_route).collect();
        let total_stops = response
            .total_stops
            .unwrap_or_else(|| routes.iter().map(|r| r.stops.len() as i64).sum());

        Ok(OptimizationResult {
            summary: OptimizationSummary {
                total_routes: routes.len(),
                total_stops,
                optimization_date: date,
            },
            routes,
        })
    }

    async fn fetch_route(&self, route_id: &str) -> Result<Route> {
        let path = format!("/routes/{}", urlencoding::encode(route_id));
        let raw = self.gateway.get(&path).await?;
        normalize_route(raw)
    }

    async fn list_territories(&self) -> Result<Value> {
        self.gateway.get("/territories").await
    }

    async fn create_territory(&self, name: &str, description: &str) -> Result<Value> {
        let body = serde_json::json!({
            "name": name,
            "description": description,
        });
        self.gateway.post("/territories", &body).await
    }

    fn name(&self) -> &str {
        "kardinal"
    }
}
