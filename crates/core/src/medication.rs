//! The medication record and its derived views.
//!
//! Three shapes of the same resource live here:
//!
//! - [`MedicationDraft`]: what a client submits on create or edit. Every field may be missing,
//!   so the draft can be validated and answered with a list of errors.
//! - [`MedicationDetails`]: the validated contents of a record, produced by
//!   [`validate`](crate::validation::validate).
//! - [`Medication`]: the stored record, i.e. details plus the store-assigned id and the
//!   server-maintained modification time.
//!
//! [`MedicationSummary`] is the lightweight projection used by collection listings.

use crate::NonEmptyText;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of a medication record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicationId(i32);

impl MedicationId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for MedicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated medication contents, without identity or timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDetails {
    pub advice_if_declined: NonEmptyText,
    pub advice_if_taken: NonEmptyText,
    pub dose: NonEmptyText,
    pub exclusion_criteria: NonEmptyText,
    pub form: NonEmptyText,
    pub inclusion_criteria: NonEmptyText,
    pub indications: NonEmptyText,
    pub name: NonEmptyText,
    pub route: NonEmptyText,
    pub side_effects: NonEmptyText,
    #[serde(default)]
    pub policy_date: Option<NaiveDate>,
}

/// A stored medication record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: MedicationId,
    #[serde(flatten)]
    pub details: MedicationDetails,
    pub last_modified: DateTime<Utc>,
}

impl Medication {
    pub fn name(&self) -> &str {
        self.details.name.as_str()
    }
}

impl fmt::Display for Medication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.id, self.details.name)
    }
}

/// The create/edit view of a medication.
///
/// Required text fields are optional here because clients may omit them; the validation engine
/// reports each missing one. `policy_date` is kept as raw text so that a malformed value can be
/// reported against its field instead of rejecting the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicationDraft {
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
    pub policy_date: Option<String>,
}

impl MedicationDraft {
    /// Builds the edit view of an existing record.
    ///
    /// This is the inverse of [`validate`](crate::validation::validate): validating the returned
    /// draft yields the record's details unchanged.
    pub fn from_medication(medication: &Medication) -> Self {
        let details = &medication.details;
        let text = |value: &NonEmptyText| Some(value.as_str().to_owned());

        Self {
            advice_if_declined: text(&details.advice_if_declined),
            advice_if_taken: text(&details.advice_if_taken),
            dose: text(&details.dose),
            exclusion_criteria: text(&details.exclusion_criteria),
            form: text(&details.form),
            inclusion_criteria: text(&details.inclusion_criteria),
            indications: text(&details.indications),
            name: text(&details.name),
            route: text(&details.route),
            side_effects: text(&details.side_effects),
            policy_date: details
                .policy_date
                .map(|date| date.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Listing view of a medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationSummary {
    pub id: MedicationId,
    pub name: String,
    pub last_modified: DateTime<Utc>,
}

impl MedicationSummary {
    pub fn project(medication: &Medication) -> Self {
        Self {
            id: medication.id,
            name: medication.name().to_owned(),
            last_modified: medication.last_modified,
        }
    }
}
