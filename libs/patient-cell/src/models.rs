use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::{Sex, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRequest {
    pub full_name: String,
    pub national_id: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PatientError {
    #[error("Patient rejected: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::Validation(errors) => AppError::Validation(errors),
            PatientError::Store(StoreError::NotFound { entity, id }) => {
                AppError::NotFound(format!("{} {} not found", entity, id))
            }
            PatientError::Store(StoreError::UniqueViolation(msg)) => AppError::Conflict(msg),
            PatientError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
