//! Entity tags and conditional-read decisions.
//!
//! A medication version is identified by a strong validator, its entity tag, and a weak one,
//! its modification time. [`evaluate`] decides whether a client's cached copy is still current:
//!
//! 1. An `If-None-Match` value equal to the current tag means "not modified", whatever any
//!    `If-Modified-Since` value says.
//! 2. Only when no `If-None-Match` was supplied, an `If-Modified-Since` value within
//!    [`MODIFIED_SINCE_TOLERANCE_MS`] of the modification time also means "not modified".
//! 3. Anything else gets the full representation.
//!
//! Malformed `If-Modified-Since` values are ignored rather than rejected.

use crate::medication::Medication;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};

/// Layout of `Last-Modified` and `If-Modified-Since` header values.
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Layout of the timestamp folded into the entity tag.
const TAG_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Header dates carry whole seconds, so exact comparison would almost never match.
pub const MODIFIED_SINCE_TOLERANCE_MS: i64 = 2_000;

/// Computes the entity tag of a medication version.
///
/// The tag covers the id, the name and the modification time (to the second), so every
/// successful write produces a new tag.
pub fn version_tag(medication: &Medication) -> String {
    let fingerprint = format!(
        "{}.{}.{}",
        medication.id,
        medication.name(),
        medication.last_modified.format(TAG_TIMESTAMP_FORMAT)
    );
    let digest = Sha256::digest(fingerprint.as_bytes());
    STANDARD.encode(digest)
}

/// Formats a timestamp for the `Last-Modified` header.
pub fn format_http_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format(HTTP_DATE_FORMAT).to_string()
}

/// Parses an `If-Modified-Since` value, returning `None` for anything malformed.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

/// Cache-validation headers supplied with a read request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalRequest {
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
}

impl ConditionalRequest {
    pub fn new(if_none_match: Option<String>, if_modified_since: Option<String>) -> Self {
        Self {
            if_none_match,
            if_modified_since,
        }
    }

    /// An empty `If-None-Match` value counts as not supplied.
    fn entity_tag(&self) -> Option<&str> {
        self.if_none_match.as_deref().filter(|tag| !tag.is_empty())
    }
}

/// Outcome of a conditional read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// The client's copy is current; respond without a body.
    NotModified,
    /// The client needs the representation, sent with these validators.
    Modified {
        etag: String,
        last_modified: String,
    },
}

/// Decides whether a read can be answered with "not modified".
pub fn evaluate(medication: &Medication, request: &ConditionalRequest) -> Freshness {
    let etag = version_tag(medication);

    match request.entity_tag() {
        Some(candidate) if candidate == etag => return Freshness::NotModified,
        Some(_) => {}
        None => {
            let since = request
                .if_modified_since
                .as_deref()
                .and_then(parse_http_date);
            if let Some(since) = since {
                let drift = (medication.last_modified - since).num_milliseconds().abs();
                if drift < MODIFIED_SINCE_TOLERANCE_MS {
                    return Freshness::NotModified;
                }
            }
        }
    }

    Freshness::Modified {
        etag,
        last_modified: format_http_date(medication.last_modified),
    }
}
