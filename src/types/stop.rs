//! Canonical stop types

use serde::{Deserialize, Serialize};

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Delivery time window — present both-or-neither, never half-filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

/// One delivery/pickup location in its canonical shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: String,
    pub location: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,
    /// Service duration in minutes
    pub service_duration: i64,
    #[serde(default)]
    pub notes: String,
}

/// Caller-supplied stop as accepted by `POST /api/optimize`
///
/// Everything except the address is optional; the normalizer fills
/// defaults and drops half-specified coordinate/time-window pairs.
/// Numeric columns arrive as numbers or strings depending on how the
/// spreadsheet was parsed, so they are accepted either way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "stringly")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "stringly")]
    pub longitude: Option<String>,
    #[serde(default)]
    pub time_window_start: Option<String>,
    #[serde(default)]
    pub time_window_end: Option<String>,
    #[serde(default, deserialize_with = "stringly")]
    pub duration: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Accept a string or a bare number, yielding its string form
fn stringly<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}
