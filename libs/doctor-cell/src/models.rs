use serde::{Deserialize, Serialize};

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::ValidationErrors;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Doctor registration or edit form. Edits replace every field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorRequest {
    pub full_name: String,
    pub national_id: String,
    pub specialty: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor rejected: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::Validation(errors) => AppError::Validation(errors),
            DoctorError::Store(StoreError::NotFound { entity, id }) => {
                AppError::NotFound(format!("{} {} not found", entity, id))
            }
            DoctorError::Store(StoreError::UniqueViolation(msg)) => AppError::Conflict(msg),
            DoctorError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
