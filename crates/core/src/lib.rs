//! # PocketBook Core
//!
//! Core business logic for the PocketBook medication catalogue.
//!
//! This crate contains pure data operations:
//! - The medication record, its edit view and its listing summary
//! - Field validation with ordered, non-truncated error lists
//! - Name uniqueness, checked before writes and backed by the store
//! - Entity tags and conditional-read decisions
//! - Storage behind the [`MedicationStore`] trait (in memory or a JSON document)
//!
//! **No API concerns**: HTTP routing, headers and authorization belong in `api-rest` or
//! `api-shared`.

pub mod clock;
pub mod conditional;
pub mod config;
pub mod constants;
pub mod error;
pub mod medication;
pub mod repositories;
pub mod store;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use conditional::{ConditionalRequest, Freshness};
pub use config::{CoreConfig, StorageBackend};
pub use constants::*;
pub use error::{MedicationError, MedicationResult, StoreError, StoreResult};
pub use medication::{
    Medication, MedicationDetails, MedicationDraft, MedicationId, MedicationSummary,
};
pub use pocketbook_types::{NonEmptyText, TextError};
pub use repositories::medications::{MedicationService, ReadOutcome};
pub use store::{FileStore, InMemoryStore, MedicationStore};
pub use validation::{MedicationField, RequestError, RequestErrorKind, RequestErrors};
