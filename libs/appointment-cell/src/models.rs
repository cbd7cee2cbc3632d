// libs/appointment-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::{Doctor, NewAppointment, Patient, ValidationErrors};

// ==============================================================================
// DRAFTS
// ==============================================================================

/// Proposed appointment values prior to persistence.
///
/// Any field may be unset while a form is only partially filled in; the
/// booking rules are skipped until all of doctor, patient, specialty, date and
/// time are present.
#[derive(Debug, Clone, Default)]
pub struct AppointmentDraft {
    pub doctor: Option<Doctor>,
    pub patient: Option<Patient>,
    pub specialty: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub notes: Option<String>,
}

impl AppointmentDraft {
    pub fn is_complete(&self) -> bool {
        self.doctor.is_some()
            && self.patient.is_some()
            && self.specialty.as_deref().is_some_and(|s| !s.trim().is_empty())
            && self.date.is_some()
            && self.time.is_some()
    }

    /// Write model for the store, available once every required field is set.
    pub fn into_record(self) -> Option<NewAppointment> {
        Some(NewAppointment {
            doctor_id: self.doctor?.id,
            patient_id: self.patient?.id,
            specialty: self.specialty.filter(|s| !s.trim().is_empty())?,
            date: self.date?,
            time: self.time?,
            notes: self.notes,
        })
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Appointment submission as received from the intake layer. Every field is
/// optional on the wire; presence is checked by the booking service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub specialty: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// Dry-run check; `appointment_id` names the appointment being edited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateAppointmentRequest {
    pub appointment_id: Option<Uuid>,
    #[serde(flatten)]
    pub appointment: AppointmentRequest,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment rejected: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppointmentError {
    /// Field errors carried by a rejection, if this is one.
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppointmentError::Validation(errors) => Some(errors),
            AppointmentError::Store(_) => None,
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Validation(errors) => AppError::Validation(errors),
            AppointmentError::Store(StoreError::NotFound { entity, id }) => {
                AppError::NotFound(format!("{} {} not found", entity, id))
            }
            AppointmentError::Store(StoreError::UniqueViolation(msg)) => AppError::Conflict(msg),
            AppointmentError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
