//! Stop record normalizer
//!
//! Converts heterogeneous spreadsheet rows into canonical [`Stop`]s. The
//! contract is lenient per field and strict only in aggregate: a single
//! sloppy row becomes a stop with defaults, but an empty stop list is a
//! validation failure before anything reaches the vendor.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::defaults::{DEFAULT_SERVICE_DURATION_MINUTES, DEFAULT_STOP_LOCATION};
use crate::error::{Error, Result};
use crate::types::{Coordinates, Stop, StopInput, TimeWindow};

/// Generate an opaque stop id for rows that carry none
pub fn generate_stop_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("stop-{}", suffix)
}

/// Normalize one row into its canonical shape
pub fn normalize_stop(input: &StopInput) -> Stop {
    let id = match input.id.as_deref() {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => generate_stop_id(),
    };

    let location = match input.location.as_deref() {
        Some(loc) if !loc.trim().is_empty() => loc.trim().to_string(),
        _ => DEFAULT_STOP_LOCATION.to_string(),
    };

    // Coordinates only when BOTH ends parse; a half pair is worse than none
    let coordinates = match (parse_f64(&input.latitude), parse_f64(&input.longitude)) {
        (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    };

    let time_window = match (&input.time_window_start, &input.time_window_end) {
        (Some(start), Some(end)) if !start.trim().is_empty() && !end.trim().is_empty() => {
            Some(TimeWindow {
                start: start.trim().to_string(),
                end: end.trim().to_string(),
            })
        }
        _ => None,
    };

    let service_duration = input
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_SERVICE_DURATION_MINUTES);

    Stop {
        id,
        location,
        address: input.address.clone().unwrap_or_default(),
        coordinates,
        time_window,
        service_duration,
        notes: input.notes.clone().unwrap_or_default(),
    }
}

/// Normalize a full upload, rejecting an empty result
pub fn normalize_stops(inputs: &[StopInput]) -> Result<Vec<Stop>> {
    if inputs.is_empty() {
        return Err(Error::validation(
            "Invalid input data. Expected an array of stops.",
        ));
    }
    Ok(inputs.iter().map(normalize_stop).collect())
}

fn parse_f64(value: &Option<String>) -> Option<f64> {
    value.as_deref().and_then(|v| v.trim().parse::<f64>().ok())
}
