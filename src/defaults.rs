/// Service duration assumed when a row has no usable `duration` column
pub const DEFAULT_SERVICE_DURATION_MINUTES: i64 = 5;

/// Vehicle capacity sent to the optimizer when the caller supplies none
pub const DEFAULT_VEHICLE_CAPACITY: i64 = 15;

/// Sentinel territory used when the caller does not scope the request
pub const DEFAULT_TERRITORY: &str = "default_territory";

/// Label substituted for a blank location column
pub const DEFAULT_STOP_LOCATION: &str = "Stop";

/// How long the cached bearer credential is treated as valid
pub const TOKEN_VALIDITY_HOURS: i64 = 24;
