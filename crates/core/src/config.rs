//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::clock::{Clock, SystemClock};
use crate::constants::DEFAULT_CACHE_MAX_AGE_SECS;
use crate::error::{MedicationError, MedicationResult};
use crate::repositories::medications::MedicationService;
use crate::store::{FileStore, InMemoryStore, MedicationStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where medications are kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory; contents are lost on exit.
    Memory,
    /// A JSON document inside the given directory.
    File(PathBuf),
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    storage: StorageBackend,
}

impl CoreConfig {
    pub fn new(storage: StorageBackend) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &StorageBackend {
        &self.storage
    }

    /// The directory backing the file store, if one is configured.
    pub fn medication_data_dir(&self) -> Option<&Path> {
        match &self.storage {
            StorageBackend::Memory => None,
            StorageBackend::File(dir) => Some(dir),
        }
    }

    /// Opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`MedicationError::Store`] if the file store cannot be opened.
    pub fn open_store(&self) -> MedicationResult<Arc<dyn MedicationStore>> {
        let store: Arc<dyn MedicationStore> = match &self.storage {
            StorageBackend::Memory => Arc::new(InMemoryStore::new()),
            StorageBackend::File(dir) => Arc::new(FileStore::open(dir.clone())?),
        };
        Ok(store)
    }

    /// Builds a [`MedicationService`] over the configured store and the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`MedicationError::Store`] if the store cannot be opened.
    pub fn medication_service(&self) -> MedicationResult<MedicationService> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(MedicationService::new(self.open_store()?, clock))
    }
}

/// Parse the storage backend from an optional data directory value.
///
/// If `value` is `None` or empty/whitespace, medications are kept in memory.
pub fn storage_from_env_value(value: Option<String>) -> StorageBackend {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map_or(StorageBackend::Memory, |dir| {
            StorageBackend::File(PathBuf::from(dir))
        })
}

/// Parse the `Cache-Control` max-age from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default of one day.
pub fn cache_max_age_from_env_value(value: Option<String>) -> MedicationResult<u32> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_CACHE_MAX_AGE_SECS),
        Some(v) => v.parse::<u32>().map_err(|_| {
            MedicationError::InvalidInput(format!(
                "cache max-age must be a whole number of seconds, got {v:?}"
            ))
        }),
    }
}
