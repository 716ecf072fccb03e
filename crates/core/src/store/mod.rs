//! Persistent storage for medication records.
//!
//! The lifecycle logic in [`MedicationService`](crate::repositories::medications::MedicationService)
//! only talks to storage through [`MedicationStore`]. Every method is atomic on its own; the
//! store also enforces name uniqueness on `insert` and `update`, which backs up the check the
//! service performs before writing.
//!
//! Two implementations are provided:
//!
//! - [`InMemoryStore`]: process-local, used for tests and ephemeral deployments.
//! - [`FileStore`]: the same table persisted to a JSON document in a data directory.

mod file;
mod memory;
mod table;

pub use file::FileStore;
pub use memory::InMemoryStore;

use crate::error::StoreResult;
use crate::medication::{Medication, MedicationDetails, MedicationId};
use chrono::{DateTime, Utc};
use std::fmt::Debug;

pub trait MedicationStore: Send + Sync + Debug {
    /// Stores a new record, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NameInUse`](crate::StoreError::NameInUse) if another record already
    /// has the same name.
    fn insert(
        &self,
        details: MedicationDetails,
        last_modified: DateTime<Utc>,
    ) -> StoreResult<Medication>;

    fn find_by_id(&self, id: MedicationId) -> StoreResult<Option<Medication>>;

    /// All records, ordered by id.
    fn find_all(&self) -> StoreResult<Vec<Medication>>;

    /// Whether any record other than `exclude` is named `name`.
    fn name_exists(&self, name: &str, exclude: Option<MedicationId>) -> StoreResult<bool>;

    /// Replaces the stored record with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if no record has that id,
    /// or [`StoreError::NameInUse`](crate::StoreError::NameInUse) if the new name belongs to a
    /// different record.
    fn update(&self, medication: &Medication) -> StoreResult<()>;

    /// Removes a record, returning whether it existed.
    fn delete(&self, id: MedicationId) -> StoreResult<bool>;
}
