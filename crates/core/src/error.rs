use crate::medication::MedicationId;
use crate::validation::{RequestError, RequestErrors};

/// Failures raised by a [`MedicationStore`](crate::store::MedicationStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The unique index on the medication name rejected the write.
    #[error("medication name is already in use")]
    NameInUse,
    #[error("medication {0} does not exist")]
    NotFound(MedicationId),
    #[error("no medication ids left to assign")]
    IdsExhausted,
    #[error("failed to access medication storage: {0}")]
    Io(std::io::Error),
    #[error("failed to serialize medications: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize medications: {0}")]
    Deserialization(serde_json::Error),
    #[error("medication storage lock was poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum MedicationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("medication failed validation: {0}")]
    Validation(RequestErrors),
    #[error("medication {0} was not found")]
    NotFound(MedicationId),
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for MedicationError {
    /// Backstop rejections from the store are reported in the same shape as the
    /// checks performed before the write.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NameInUse => {
                MedicationError::Validation(RequestErrors::from(vec![RequestError::name_in_use()]))
            }
            StoreError::NotFound(id) => MedicationError::NotFound(id),
            other => MedicationError::Store(other),
        }
    }
}

pub type MedicationResult<T> = std::result::Result<T, MedicationError>;
