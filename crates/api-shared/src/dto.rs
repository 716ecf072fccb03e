//! JSON request and response bodies.
//!
//! Field names are camelCase on the wire. Request bodies accept missing fields so that
//! validation can report every absent value instead of rejecting the payload outright.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body of `POST /medications` and `PUT /medications/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicationReq {
    pub advice_if_declined: Option<String>,
    pub advice_if_taken: Option<String>,
    pub dose: Option<String>,
    pub exclusion_criteria: Option<String>,
    pub form: Option<String>,
    pub inclusion_criteria: Option<String>,
    pub indications: Option<String>,
    pub name: Option<String>,
    pub route: Option<String>,
    pub side_effects: Option<String>,
    /// `YYYY-MM-DD`; a trailing `THH:MM:SS` is accepted and ignored.
    #[schema(example = "2020-04-01")]
    pub policy_date: Option<String>,
}

/// A full medication record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRes {
    pub id: i32,
    pub advice_if_declined: String,
    pub advice_if_taken: String,
    pub dose: String,
    pub exclusion_criteria: String,
    pub form: String,
    pub inclusion_criteria: String,
    pub indications: String,
    pub name: String,
    pub route: String,
    pub side_effects: String,
    pub policy_date: Option<NaiveDate>,
    pub last_modified: DateTime<Utc>,
}

/// Entry of `GET /medications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicationSummaryRes {
    pub id: i32,
    pub name: String,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum RequestErrorType {
    IsBlank,
    IsInvalid,
    IsInUse,
}

/// One entry of a `400 Bad Request` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RequestErrorRes {
    pub error: RequestErrorType,
    #[schema(example = "name")]
    pub path: String,
}
