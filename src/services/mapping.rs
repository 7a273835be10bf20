//! Column mapping
//!
//! Uploaded sheets use whatever headers the dispatcher's tooling exports.
//! A [`ColumnMapper`] turns those rows into the canonical field keys the
//! normalizer understands. The header-matching implementation replaces
//! the hosted mapping widget; a null implementation exists for tests and
//! for sheets that already use canonical keys.

use std::sync::Arc;

use tracing::warn;

use crate::error::{Error, Result};
use crate::services::spreadsheet::Row;
use crate::types::StopInput;

/// Canonical field keys, with the header labels they match
///
/// Aliases mirror the field blueprint the mapping widget was configured
/// with ("Location Name", "GPS latitude coordinate", ...).
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("id", &["id", "stop id", "stop-id"]),
    ("location", &["location", "location name", "name", "stop name"]),
    ("address", &["address", "full address", "street address"]),
    ("latitude", &["latitude", "lat", "gps latitude", "gps latitude coordinate"]),
    ("longitude", &["longitude", "lng", "lon", "gps longitude", "gps longitude coordinate"]),
    ("timeWindowStart", &["timewindowstart", "time window start", "window start", "earliest"]),
    ("timeWindowEnd", &["timewindowend", "time window end", "window end", "latest"]),
    ("duration", &["duration", "service duration", "duration minutes", "minutes"]),
    ("notes", &["notes", "note", "comment", "comments"]),
];

/// Maps raw spreadsheet rows to canonical stop fields
pub trait ColumnMapper: Send + Sync {
    /// Map one batch of rows; fails when no usable column is found
    fn map_rows(&self, rows: &[Row]) -> Result<Vec<StopInput>>;

    fn name(&self) -> &str;
}

/// Matches headers case-insensitively against the known alias table
#[derive(Debug, Default)]
pub struct HeaderMapper;

impl HeaderMapper {
    /// Resolve a raw header to its canonical key, if any
    fn canonical_key(header: &str) -> Option<&'static str> {
        let needle = header.trim().to_ascii_lowercase();
        FIELD_ALIASES
            .iter()
            .find(|(key, aliases)| {
                key.to_ascii_lowercase() == needle
                    || aliases.iter().any(|a| *a == needle)
            })
            .map(|(key, _)| *key)
    }

    fn map_row(row: &Row) -> StopInput {
        let mut input = StopInput::default();
        for (header, value) in row {
            let Some(key) = Self::canonical_key(header) else {
                continue;
            };
            let value = Some(value.clone());
            match key {
                "id" => input.id = value,
                "location" => input.location = value,
                "address" => input.address = value,
                "latitude" => input.latitude = value,
                "longitude" => input.longitude = value,
                "timeWindowStart" => input.time_window_start = value,
                "timeWindowEnd" => input.time_window_end = value,
                "duration" => input.duration = value,
                "notes" => input.notes = value,
                _ => {}
            }
        }
        input
    }
}

impl ColumnMapper for HeaderMapper {
    fn map_rows(&self, rows: &[Row]) -> Result<Vec<StopInput>> {
        let mapped: Vec<StopInput> = rows.iter().map(Self::map_row).collect();

        // A sheet where no row yielded an address cannot be routed
        if !mapped.is_empty() && mapped.iter().all(|s| s.address.is_none()) {
            return Err(Error::validation(
                "No address column recognized in the uploaded sheet",
            ));
        }

        Ok(mapped)
    }

    fn name(&self) -> &str {
        "header"
    }
}

/// Passes rows through assuming canonical keys; for tests and
/// pre-mapped input
#[derive(Debug, Default)]
pub struct NullMapper;

impl ColumnMapper for NullMapper {
    fn map_rows(&self, rows: &[Row]) -> Result<Vec<StopInput>> {
        Ok(rows.iter().map(HeaderMapper::map_row).collect())
    }

    fn name(&self) -> &str {
        "null"
    }
}

/// Pick a mapper by name, falling back to header matching
pub fn create_mapper(name: &str) -> Arc<dyn ColumnMapper> {
    match name {
        "null" => Arc::new(NullMapper),
        "header" => Arc::new(HeaderMapper),
        other => {
            warn!("Unknown column mapper '{}', using header matching", other);
            Arc::new(HeaderMapper)
        }
    }
}
