use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{AppState, AppointmentQuery, DoctorRepository, RecordStore, StoreError};
use shared_models::{Doctor, Field, FieldErrorKind, NewDoctor, ValidationErrors};
use shared_utils::validation::{
    normalize_optional, validate_email, validate_full_name, validate_max_len,
    validate_national_id, MAX_FULL_NAME_LEN, MAX_NATIONAL_ID_LEN, MAX_PHONE_LEN,
    MAX_SPECIALTY_LEN,
};

use crate::models::{DoctorError, DoctorRequest};

pub struct DoctorService {
    store: Arc<dyn RecordStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.store.clone())
    }

    /// Register a new doctor
    pub async fn create_doctor(&self, request: DoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Registering doctor: {}", request.email);

        let record = self.check(request, None).await?;
        let doctor = self.store.insert_doctor(record).await.map_err(duplicate_email)?;

        info!("Doctor {} registered", doctor.id);
        Ok(doctor)
    }

    /// Replace an existing doctor's details
    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: DoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor {}", doctor_id);

        self.store.get_doctor(doctor_id).await?;
        let record = self.check(request, Some(doctor_id)).await?;
        let doctor = self.store.update_doctor(doctor_id, record).await.map_err(duplicate_email)?;

        info!("Doctor {} updated", doctor.id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        Ok(self.store.get_doctor(doctor_id).await?)
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        Ok(self.store.list_doctors().await?)
    }

    /// Removes the doctor and every appointment booked with them.
    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        self.store.delete_doctor(doctor_id).await?;
        info!("Doctor {} deleted", doctor_id);
        Ok(())
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    async fn check(
        &self,
        request: DoctorRequest,
        existing_id: Option<Uuid>,
    ) -> Result<NewDoctor, DoctorError> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_full_name(&request.full_name) {
            errors.add(Field::FullName, e.into());
        }
        if let Err(kind) = validate_max_len(&request.full_name, MAX_FULL_NAME_LEN) {
            errors.add(Field::FullName, kind);
        }

        let national_id = request.national_id.trim().to_string();
        if national_id.is_empty() {
            errors.add(Field::NationalId, FieldErrorKind::Required);
        } else {
            if let Err(kind) = validate_national_id(&national_id) {
                errors.add(Field::NationalId, kind);
            }
            if let Err(kind) = validate_max_len(&national_id, MAX_NATIONAL_ID_LEN) {
                errors.add(Field::NationalId, kind);
            }
        }

        let specialty = request.specialty.trim().to_string();
        if specialty.is_empty() {
            errors.add(Field::Specialty, FieldErrorKind::Required);
        } else if let Err(kind) = validate_max_len(&specialty, MAX_SPECIALTY_LEN) {
            errors.add(Field::Specialty, kind);
        }

        let email = request.email.trim().to_string();
        if email.is_empty() {
            errors.add(Field::Email, FieldErrorKind::Required);
        } else if let Err(kind) = validate_email(&email) {
            errors.add(Field::Email, kind);
        } else if let Some(other) = self.store.find_doctor_by_email(&email).await? {
            if Some(other.id) != existing_id {
                warn!("Email {} already registered to doctor {}", email, other.id);
                errors.add(Field::Email, FieldErrorKind::DuplicateEmail);
            }
        }

        let phone = normalize_optional(request.phone);
        if let Some(phone) = &phone {
            if let Err(kind) = validate_max_len(phone, MAX_PHONE_LEN) {
                errors.add(Field::Phone, kind);
            }
        }

        errors.into_result().map_err(DoctorError::Validation)?;

        Ok(NewDoctor {
            full_name: request.full_name,
            national_id,
            specialty,
            email,
            phone,
        })
    }
}

/// A unique-index hit on commit means another registration took the email
/// after the pre-check ran.
fn duplicate_email(err: StoreError) -> DoctorError {
    match err {
        StoreError::UniqueViolation(_) => {
            let mut errors = ValidationErrors::new();
            errors.add(Field::Email, FieldErrorKind::DuplicateEmail);
            DoctorError::Validation(errors)
        }
        other => DoctorError::Store(other),
    }
}
