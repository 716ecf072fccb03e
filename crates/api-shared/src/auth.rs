//! API key checks for administrative operations.
//!
//! Writes to the catalogue are restricted to callers presenting the configured key in the
//! [`API_KEY_HEADER`] header. The expected key is resolved once at startup and passed in, so no
//! environment lookups happen per request.

/// Request header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("API key is missing")]
    Missing,
    #[error("Invalid API key")]
    Invalid,
}

/// Validates the provided API key against the expected one.
///
/// Returns `Ok(())` if the key matches, or an error if it is missing or different.
pub fn validate_api_key(provided_key: Option<&str>, expected_key: &str) -> Result<(), AuthError> {
    match provided_key {
        None => Err(AuthError::Missing),
        Some(key) if key == expected_key => Ok(()),
        Some(_) => Err(AuthError::Invalid),
    }
}
