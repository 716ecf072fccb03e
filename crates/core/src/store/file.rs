//! JSON-document medication store.
//!
//! The whole table lives in memory and is written to `<data_dir>/medications.json` after every
//! mutation. A mutation is applied to a copy of the table, the copy is written to a temporary
//! file which is then renamed over the document, and only after that succeeds does the copy
//! replace the in-memory table. A failed write therefore leaves both disk and memory as they
//! were.

use super::table::{MedicationTable, TableDocument};
use super::MedicationStore;
use crate::constants::{MEDICATIONS_FILENAME, MEDICATIONS_TEMP_FILENAME};
use crate::error::{StoreError, StoreResult};
use crate::medication::{Medication, MedicationDetails, MedicationId};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    table: RwLock<MedicationTable>,
}

impl FileStore {
    /// Opens the store in `dir`, creating the directory if needed.
    ///
    /// A missing document is treated as an empty catalogue.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created or the document cannot be
    /// read, and `StoreError::Deserialization` if the document is not a valid table.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(StoreError::Io)?;

        let path = dir.join(MEDICATIONS_FILENAME);
        let table = if path.is_file() {
            let raw = fs::read_to_string(&path).map_err(StoreError::Io)?;
            let document: TableDocument =
                serde_json::from_str(&raw).map_err(StoreError::Deserialization)?;
            MedicationTable::from_document(document)
        } else {
            MedicationTable::default()
        };

        tracing::debug!("opened medication store at {}", path.display());

        Ok(Self {
            dir,
            table: RwLock::new(table),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, MedicationTable>> {
        self.table.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn persist(&self, table: &MedicationTable) -> StoreResult<()> {
        let raw = serde_json::to_vec_pretty(&table.to_document()).map_err(StoreError::Serialization)?;

        let temp_path = self.dir.join(MEDICATIONS_TEMP_FILENAME);
        fs::write(&temp_path, raw).map_err(StoreError::Io)?;
        fs::rename(&temp_path, self.dir.join(MEDICATIONS_FILENAME)).map_err(StoreError::Io)
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut MedicationTable) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.table.write().map_err(|_| StoreError::LockPoisoned)?;

        let mut next = guard.clone();
        let out = op(&mut next)?;
        self.persist(&next)?;
        *guard = next;

        Ok(out)
    }
}

impl MedicationStore for FileStore {
    fn insert(
        &self,
        details: MedicationDetails,
        last_modified: DateTime<Utc>,
    ) -> StoreResult<Medication> {
        self.mutate(|table| table.insert(details, last_modified))
    }

    fn find_by_id(&self, id: MedicationId) -> StoreResult<Option<Medication>> {
        Ok(self.read()?.find_by_id(id))
    }

    fn find_all(&self) -> StoreResult<Vec<Medication>> {
        Ok(self.read()?.find_all())
    }

    fn name_exists(&self, name: &str, exclude: Option<MedicationId>) -> StoreResult<bool> {
        Ok(self.read()?.name_exists(name, exclude))
    }

    fn update(&self, medication: &Medication) -> StoreResult<()> {
        self.mutate(|table| table.update(medication))
    }

    fn delete(&self, id: MedicationId) -> StoreResult<bool> {
        if !self.read()?.contains(id) {
            return Ok(false);
        }
        self.mutate(|table| Ok(table.delete(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::tests::sample_draft;
    use crate::validation::validate;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn details(name: &str) -> MedicationDetails {
        validate(&sample_draft(name)).expect("sample draft should be valid")
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 4, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_open_missing_document_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::open(temp_dir.path().join("nested")).expect("open should succeed");

        assert!(store.find_all().expect("list should succeed").is_empty());
        assert!(store.dir().is_dir(), "data directory should be created");
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let (aspirin, codeine) = {
            let store = FileStore::open(temp_dir.path()).expect("open should succeed");
            let aspirin = store.insert(details("Aspirin"), at(1)).expect("insert should succeed");
            let codeine = store.insert(details("Codeine"), at(2)).expect("insert should succeed");
            (aspirin, codeine)
        };

        let reopened = FileStore::open(temp_dir.path()).expect("reopen should succeed");
        assert_eq!(
            reopened.find_all().expect("list should succeed"),
            vec![aspirin, codeine]
        );

        let next = reopened.insert(details("Morphine"), at(3)).expect("insert should succeed");
        assert_eq!(next.id, MedicationId::new(3));
    }

    #[test]
    fn test_update_and_delete_are_persisted() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::open(temp_dir.path()).expect("open should succeed");
        let aspirin = store.insert(details("Aspirin"), at(1)).expect("insert should succeed");
        let codeine = store.insert(details("Codeine"), at(2)).expect("insert should succeed");

        let mut renamed = aspirin.clone();
        renamed.details = details("Aspirin EC");
        renamed.last_modified = at(5);
        store.update(&renamed).expect("update should succeed");
        assert!(store.delete(codeine.id).expect("delete should succeed"));

        let reopened = FileStore::open(temp_dir.path()).expect("reopen should succeed");
        assert_eq!(reopened.find_all().unwrap(), vec![renamed]);
    }

    #[test]
    fn test_rejected_write_leaves_document_unchanged() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::open(temp_dir.path()).expect("open should succeed");
        store.insert(details("Aspirin"), at(1)).expect("insert should succeed");
        let before = fs::read_to_string(temp_dir.path().join(MEDICATIONS_FILENAME))
            .expect("document should exist");

        let err = store
            .insert(details("Aspirin"), at(2))
            .expect_err("duplicate should be rejected");
        assert!(matches!(err, StoreError::NameInUse));

        let after = fs::read_to_string(temp_dir.path().join(MEDICATIONS_FILENAME))
            .expect("document should exist");
        assert_eq!(before, after);
        assert_eq!(store.find_all().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_missing_does_not_write_document() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::open(temp_dir.path()).expect("open should succeed");

        assert!(!store.delete(MedicationId::new(4)).expect("delete should succeed"));
        assert!(!temp_dir.path().join(MEDICATIONS_FILENAME).exists());
    }

    #[test]
    fn test_open_rejects_corrupt_document() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(MEDICATIONS_FILENAME), "{ not json")
            .expect("should write corrupt document");

        let err = FileStore::open(temp_dir.path()).expect_err("corrupt document should fail");
        assert!(matches!(err, StoreError::Deserialization(_)));
    }
}
