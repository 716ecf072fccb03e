use super::table::MedicationTable;
use super::MedicationStore;
use crate::error::{StoreError, StoreResult};
use crate::medication::{Medication, MedicationDetails, MedicationId};
use chrono::{DateTime, Utc};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-local medication store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    table: RwLock<MedicationTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, MedicationTable>> {
        self.table.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, MedicationTable>> {
        self.table.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl MedicationStore for InMemoryStore {
    fn insert(
        &self,
        details: MedicationDetails,
        last_modified: DateTime<Utc>,
    ) -> StoreResult<Medication> {
        self.write()?.insert(details, last_modified)
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
        self.write()?.update(medication)
    }

    fn delete(&self, id: MedicationId) -> StoreResult<bool> {
        Ok(self.write()?.delete(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::tests::sample_draft;
    use crate::validation::validate;
    use chrono::TimeZone;

    fn details(name: &str) -> MedicationDetails {
        validate(&sample_draft(name)).expect("sample draft should be valid")
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 4, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let store = InMemoryStore::new();

        let first = store.insert(details("Aspirin"), at(1)).expect("insert should succeed");
        let second = store.insert(details("Codeine"), at(2)).expect("insert should succeed");

        assert_eq!(first.id, MedicationId::new(1));
        assert_eq!(second.id, MedicationId::new(2));
        assert_eq!(
            store.find_by_id(second.id).expect("lookup should succeed"),
            Some(second)
        );
    }

    #[test]
    fn test_insert_rejects_duplicate_name() {
        let store = InMemoryStore::new();
        store.insert(details("Aspirin"), at(1)).expect("insert should succeed");

        let err = store
            .insert(details("Aspirin"), at(2))
            .expect_err("duplicate name should be rejected");

        assert!(matches!(err, StoreError::NameInUse));
        assert_eq!(store.find_all().expect("list should succeed").len(), 1);
    }

    #[test]
    fn test_name_exists_honours_exclusion() {
        let store = InMemoryStore::new();
        let aspirin = store.insert(details("Aspirin"), at(1)).expect("insert should succeed");

        assert!(store.name_exists("Aspirin", None).unwrap());
        assert!(!store.name_exists("Aspirin", Some(aspirin.id)).unwrap());
        assert!(!store.name_exists("aspirin", None).unwrap());
    }

    #[test]
    fn test_update_enforces_existence_and_unique_name() {
        let store = InMemoryStore::new();
        let aspirin = store.insert(details("Aspirin"), at(1)).expect("insert should succeed");
        store.insert(details("Codeine"), at(2)).expect("insert should succeed");

        let mut renamed = aspirin.clone();
        renamed.details.name = details("Codeine").name;
        assert!(matches!(store.update(&renamed), Err(StoreError::NameInUse)));

        let mut missing = aspirin.clone();
        missing.id = MedicationId::new(99);
        assert!(matches!(
            store.update(&missing),
            Err(StoreError::NotFound(id)) if id == MedicationId::new(99)
        ));

        let mut touched = aspirin.clone();
        touched.last_modified = at(3);
        store.update(&touched).expect("update should succeed");
        assert_eq!(store.find_by_id(aspirin.id).unwrap(), Some(touched));
    }

    #[test]
    fn test_delete_reports_whether_record_existed() {
        let store = InMemoryStore::new();
        let aspirin = store.insert(details("Aspirin"), at(1)).expect("insert should succeed");

        assert!(store.delete(aspirin.id).unwrap());
        assert!(!store.delete(aspirin.id).unwrap());
        assert!(store.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let store = InMemoryStore::new();
        let aspirin = store.insert(details("Aspirin"), at(1)).expect("insert should succeed");
        store.delete(aspirin.id).expect("delete should succeed");

        let codeine = store.insert(details("Codeine"), at(2)).expect("insert should succeed");
        assert_eq!(codeine.id, MedicationId::new(2));
    }
}
