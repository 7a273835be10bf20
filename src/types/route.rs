//! Canonical route types (post-optimization)

use serde::{Deserialize, Serialize};

use super::{Coordinates, TimeWindow};

/// A stop as placed on an optimized route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub id: String,
    pub location: String,
    pub address: String,
    /// Position within the route (1-based)
    pub sequence: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,
}

/// Aggregate route statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatistics {
    pub total_distance: f64,
    /// Total duration in seconds
    pub total_duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// An ordered sequence of stops assigned to one vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub vehicle: String,
    pub stops: Vec<RouteStop>,
    pub statistics: RouteStatistics,
    #[serde(default)]
    pub route_polyline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub territory: Option<serde_json::Value>,
}

/// Summary over all routes of one optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSummary {
    pub total_routes: usize,
    pub total_stops: i64,
    pub optimization_date: String,
}

/// Full result of one optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub routes: Vec<Route>,
    pub summary: OptimizationSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_stop_omits_absent_estimated_time() {
        let stop = RouteStop {
            id: "s1".to_string(),
            location: "A".to_string(),
            address: "1 First St".to_string(),
            sequence: 1,
            estimated_time: None,
            notes: String::new(),
            coordinates: None,
            time_window: None,
        };
        let json = serde_json::to_value(&stop).unwrap();
        assert!(json.get("estimatedTime").is_none());
        assert_eq!(json["sequence"], 1);
    }

    #[test]
    fn test_route_polyline_serializes_null_when_absent() {
        let route = Route {
            id: "r1".to_string(),
            vehicle: "V1".to_string(),
            stops: vec![],
            statistics: RouteStatistics {
                total_distance: 10.0,
                total_duration: 600.0,
                start_time: Some("T0".to_string()),
                end_time: Some("T1".to_string()),
            },
            route_polyline: None,
            territory: None,
        };
        let json = serde_json::to_value(&route).unwrap();
        assert!(json["routePolyline"].is_null());
        assert_eq!(json["statistics"]["totalDistance"], 10.0);
    }
}
