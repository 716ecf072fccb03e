//! Constants used throughout the PocketBook core crate.

/// Filename of the medication catalogue document inside the data directory.
pub const MEDICATIONS_FILENAME: &str = "medications.json";

/// Scratch file written before being renamed over [`MEDICATIONS_FILENAME`].
pub const MEDICATIONS_TEMP_FILENAME: &str = "medications.json.tmp";

/// Default `Cache-Control` max-age, in seconds, for single-medication reads.
pub const DEFAULT_CACHE_MAX_AGE_SECS: u32 = 86_400;

/// Default bind address of the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
