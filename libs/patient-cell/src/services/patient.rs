use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{AppState, AppointmentQuery, PatientRepository, RecordStore};
use shared_models::{Field, FieldErrorKind, NewPatient, Patient, ValidationErrors};
use shared_utils::validation::{
    normalize_optional, validate_full_name, validate_max_len, MAX_FULL_NAME_LEN,
    MAX_NATIONAL_ID_LEN, MAX_PHONE_LEN,
};

use crate::models::{PatientError, PatientRequest};

pub struct PatientService {
    store: Arc<dyn RecordStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.store.clone())
    }

    pub async fn create_patient(&self, request: PatientRequest) -> Result<Patient, PatientError> {
        debug!("Registering patient: {}", request.national_id);

        let record = check(request)?;
        let patient = self.store.insert_patient(record).await?;

        info!("Patient {} registered", patient.id);
        Ok(patient)
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: PatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient {}", patient_id);

        self.store.get_patient(patient_id).await?;
        let record = check(request)?;
        let patient = self.store.update_patient(patient_id, record).await?;

        info!("Patient {} updated", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        Ok(self.store.get_patient(patient_id).await?)
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        Ok(self.store.list_patients().await?)
    }

    /// Removes the patient and their appointment history.
    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), PatientError> {
        self.store.delete_patient(patient_id).await?;
        info!("Patient {} deleted", patient_id);
        Ok(())
    }
}

fn check(request: PatientRequest) -> Result<NewPatient, PatientError> {
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
    } else if let Err(kind) = validate_max_len(&national_id, MAX_NATIONAL_ID_LEN) {
        errors.add(Field::NationalId, kind);
    }

    let phone = normalize_optional(request.phone);
    if let Some(phone) = &phone {
        if let Err(kind) = validate_max_len(phone, MAX_PHONE_LEN) {
            errors.add(Field::Phone, kind);
        }
    }

    errors.into_result().map_err(PatientError::Validation)?;

    Ok(NewPatient {
        full_name: request.full_name,
        national_id,
        birth_date: request.birth_date,
        sex: request.sex,
        phone,
    })
}
