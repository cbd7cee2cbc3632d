use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Record store unavailable: {0}")]
    Backend(String),

    #[error("Failed to decode record: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        StoreError::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
