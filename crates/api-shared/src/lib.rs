//! # API Shared
//!
//! Shared utilities and definitions for the PocketBook APIs.
//!
//! Contains:
//! - Wire types with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//! - Authentication utilities
//!
//! Used by `api-rest`; kept free of HTTP framework types so other transports can reuse it.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{validate_api_key, AuthError, API_KEY_HEADER};
pub use dto::*;
pub use health::HealthService;
