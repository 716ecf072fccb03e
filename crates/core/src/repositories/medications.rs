//! Medication lifecycle management.
//!
//! [`MedicationService`] is the single entry point for reading and writing medications. It
//! combines the validation engine, the name uniqueness check, the store and the conditional-read
//! evaluator into one contract:
//!
//! - **Create** validates the draft and checks the name against every stored record. Any errors
//!   are returned together and nothing is written; otherwise the record is stamped with the
//!   current time and inserted.
//! - **Read** returns [`MedicationError::NotFound`] for unknown ids, otherwise a [`ReadOutcome`]
//!   decided by the request's cache validators.
//! - **List** projects every record to a [`MedicationSummary`].
//! - **Update** validates first, unconditionally, checking the name against every *other*
//!   record. Only a valid draft is then checked for existence. The whole record is replaced and
//!   re-stamped.
//! - **Delete** is idempotent.
//!
//! The store rejects duplicate names on its own as well; such a rejection surfaces as the same
//! `isInUse` error as the check performed here.
//!
//! ## Pure Data Operations
//!
//! No HTTP concerns live here. Status codes, headers and authorization belong in `api-rest`.

use crate::clock::Clock;
use crate::conditional::{evaluate, ConditionalRequest, Freshness};
use crate::error::{MedicationError, MedicationResult};
use crate::medication::{
    Medication, MedicationDetails, MedicationDraft, MedicationId, MedicationSummary,
};
use crate::store::MedicationStore;
use crate::validation::{candidate_name, validate, RequestError, RequestErrors};
use std::sync::Arc;

/// Result of a single-medication read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The client's cached copy is current.
    NotModified,
    /// The full record with its validators.
    Current {
        medication: Medication,
        etag: String,
        last_modified: String,
    },
}

/// Service for creating, reading, updating and deleting medications.
#[derive(Clone, Debug)]
pub struct MedicationService {
    store: Arc<dyn MedicationStore>,
    clock: Arc<dyn Clock>,
}

impl MedicationService {
    /// Creates a service over the given store and clock.
    pub fn new(store: Arc<dyn MedicationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Lists summaries of every medication, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`MedicationError::Store`] if the store cannot be read.
    pub fn list(&self) -> MedicationResult<Vec<MedicationSummary>> {
        let medications = self.store.find_all()?;
        Ok(medications.iter().map(MedicationSummary::project).collect())
    }

    /// Fetches a medication without any conditional handling.
    ///
    /// # Errors
    ///
    /// Returns [`MedicationError::NotFound`] if no medication has this id.
    pub fn find(&self, id: MedicationId) -> MedicationResult<Medication> {
        self.store
            .find_by_id(id)?
            .ok_or(MedicationError::NotFound(id))
    }

    /// Reads a medication, honouring `If-None-Match` and `If-Modified-Since`.
    ///
    /// # Errors
    ///
    /// Returns [`MedicationError::NotFound`] if no medication has this id.
    pub fn read(
        &self,
        id: MedicationId,
        request: &ConditionalRequest,
    ) -> MedicationResult<ReadOutcome> {
        let medication = self.find(id)?;

        Ok(match evaluate(&medication, request) {
            Freshness::NotModified => {
                tracing::debug!("medication {} not modified", id);
                ReadOutcome::NotModified
            }
            Freshness::Modified {
                etag,
                last_modified,
            } => ReadOutcome::Current {
                medication,
                etag,
                last_modified,
            },
        })
    }

    /// Whether `name` is free for a record, ignoring the record `exclude` itself.
    ///
    /// # Errors
    ///
    /// Returns [`MedicationError::Store`] if the store cannot be queried.
    pub fn name_available(
        &self,
        name: &str,
        exclude: Option<MedicationId>,
    ) -> MedicationResult<bool> {
        Ok(!self.store.name_exists(name, exclude)?)
    }

    /// Creates a medication from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`MedicationError::Validation`] with every blank, invalid or in-use field, or
    /// [`MedicationError::Store`] if the write fails for another reason.
    pub fn create(&self, draft: &MedicationDraft) -> MedicationResult<Medication> {
        let details = self.check(draft, None)?;

        let medication = self.store.insert(details, self.clock.now_utc())?;
        tracing::info!("medication created: {}", medication);

        Ok(medication)
    }

    /// Replaces a medication with the contents of a draft.
    ///
    /// Validation errors take priority over a missing id.
    ///
    /// # Errors
    ///
    /// Returns [`MedicationError::Validation`] for an invalid draft (whether or not `id`
    /// exists), [`MedicationError::NotFound`] for an unknown id, or [`MedicationError::Store`]
    /// if the write fails for another reason.
    pub fn update(
        &self,
        id: MedicationId,
        draft: &MedicationDraft,
    ) -> MedicationResult<Medication> {
        let details = self.check(draft, Some(id))?;

        if self.store.find_by_id(id)?.is_none() {
            return Err(MedicationError::NotFound(id));
        }

        let medication = Medication {
            id,
            details,
            last_modified: self.clock.now_utc(),
        };
        self.store.update(&medication)?;
        tracing::info!("medication updated: {}", medication);

        Ok(medication)
    }

    /// Deletes a medication. Deleting an unknown id succeeds without changes.
    ///
    /// # Errors
    ///
    /// Returns [`MedicationError::Store`] if the store cannot be written.
    pub fn delete(&self, id: MedicationId) -> MedicationResult<()> {
        if self.store.delete(id)? {
            tracing::info!("medication deleted: {}", id);
        } else {
            tracing::debug!("medication {} already absent", id);
        }
        Ok(())
    }

    /// Runs field validation and the uniqueness check, collecting errors from both.
    fn check(
        &self,
        draft: &MedicationDraft,
        exclude: Option<MedicationId>,
    ) -> MedicationResult<MedicationDetails> {
        let (details, mut errors) = match validate(draft) {
            Ok(details) => (Some(details), RequestErrors::default()),
            Err(errors) => (None, errors),
        };

        if let Some(name) = candidate_name(draft) {
            if !self.name_available(name.as_str(), exclude)? {
                errors.push(RequestError::name_in_use());
            }
        }

        match details {
            Some(details) if errors.is_empty() => Ok(details),
            _ => {
                tracing::warn!(
                    "medication validation failed with {} error(s): {}",
                    errors.len(),
                    errors
                );
                Err(MedicationError::Validation(errors))
            }
        }
    }
}
