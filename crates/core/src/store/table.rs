use crate::error::{StoreError, StoreResult};
use crate::medication::{Medication, MedicationDetails, MedicationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The medication table shared by the store implementations.
///
/// Holds the rows keyed by id plus the next id to assign, and owns the unique-name rule.
#[derive(Debug, Clone)]
pub(crate) struct MedicationTable {
    next_id: i32,
    rows: BTreeMap<MedicationId, Medication>,
}

impl Default for MedicationTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

/// On-disk shape of a [`MedicationTable`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableDocument {
    next_id: i32,
    medications: Vec<Medication>,
}

impl MedicationTable {
    pub(crate) fn from_document(document: TableDocument) -> Self {
        let rows: BTreeMap<MedicationId, Medication> = document
            .medications
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        // Never hand out an id that is already taken, even if the document disagrees.
        let next_after_rows = rows
            .keys()
            .next_back()
            .map_or(1, |id| id.get().saturating_add(1));

        Self {
            next_id: document.next_id.max(next_after_rows),
            rows,
        }
    }

    pub(crate) fn to_document(&self) -> TableDocument {
        TableDocument {
            next_id: self.next_id,
            medications: self.rows.values().cloned().collect(),
        }
    }

    pub(crate) fn insert(
        &mut self,
        details: MedicationDetails,
        last_modified: DateTime<Utc>,
    ) -> StoreResult<Medication> {
        if self.name_exists(details.name.as_str(), None) {
            return Err(StoreError::NameInUse);
        }

        let id = MedicationId::new(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted)?;

        let medication = Medication {
            id,
            details,
            last_modified,
        };
        self.rows.insert(id, medication.clone());
        Ok(medication)
    }

    pub(crate) fn find_by_id(&self, id: MedicationId) -> Option<Medication> {
        self.rows.get(&id).cloned()
    }

    pub(crate) fn find_all(&self) -> Vec<Medication> {
        self.rows.values().cloned().collect()
    }

    pub(crate) fn contains(&self, id: MedicationId) -> bool {
        self.rows.contains_key(&id)
    }

    pub(crate) fn name_exists(&self, name: &str, exclude: Option<MedicationId>) -> bool {
        self.rows
            .values()
            .any(|m| m.name() == name && Some(m.id) != exclude)
    }

    pub(crate) fn update(&mut self, medication: &Medication) -> StoreResult<()> {
        if !self.rows.contains_key(&medication.id) {
            return Err(StoreError::NotFound(medication.id));
        }
        if self.name_exists(medication.name(), Some(medication.id)) {
            return Err(StoreError::NameInUse);
        }

        self.rows.insert(medication.id, medication.clone());
        Ok(())
    }

    pub(crate) fn delete(&mut self, id: MedicationId) -> bool {
        self.rows.remove(&id).is_some()
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

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 4, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_fails_once_ids_run_out() {
        let mut table = MedicationTable::from_document(TableDocument {
            next_id: i32::MAX,
            medications: Vec::new(),
        });

        let err = table
            .insert(details("Aspirin"), at())
            .expect_err("no id should be left to assign");

        assert!(matches!(err, StoreError::IdsExhausted));
        assert!(table.find_all().is_empty());
    }

    #[test]
    fn test_names_are_compared_exactly() {
        let mut table = MedicationTable::default();
        table
            .insert(details("Aspirin"), at())
            .expect("first insert should succeed");

        assert!(table.name_exists("Aspirin", None));
        assert!(!table.name_exists(" Aspirin", None));
        assert!(!table.name_exists("aspirin", None));
        assert!(matches!(
            table.insert(details("Aspirin"), at()),
            Err(StoreError::NameInUse)
        ));
    }
}
