// libs/appointment-cell/src/services/booking.rs

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{
    AppState, AppointmentFilter, AppointmentQuery, AppointmentRepository, RecordStore, StoreError,
};
use shared_models::{Appointment, Field, FieldErrorKind, NewAppointment, ValidationErrors};
use shared_utils::validation::{normalize_optional, validate_max_len, MAX_SPECIALTY_LEN};

use crate::models::{AppointmentDraft, AppointmentError, AppointmentRequest};
use crate::services::clock::{Clock, SystemClock};
use crate::services::validator::{check_appointment_date, AppointmentValidator};

/// Intake layer for appointments: resolves submissions into drafts, enforces
/// required fields, runs the booking rules and commits accepted records.
///
/// Validation and commit are two separate store round-trips with no lock in
/// between, so concurrent bookings of the same slot can both succeed.
pub struct AppointmentService {
    store: Arc<dyn RecordStore>,
    validator: AppointmentValidator,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            validator: AppointmentValidator::new(clock),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        let clock = SystemClock::with_offset_minutes(state.config.clinic_utc_offset_minutes);
        Self::new(state.store.clone(), Arc::new(clock))
    }

    pub async fn create_appointment(
        &self,
        request: AppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Booking appointment: {:?}", request);

        let record = self.check(request, None).await?;
        let appointment = self.store.insert_appointment(record).await?;

        info!("Appointment {} booked for doctor {} on {} at {}",
              appointment.id, appointment.doctor_id, appointment.date, appointment.time);
        Ok(appointment)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: AppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {}", appointment_id);

        self.store.get_appointment(appointment_id).await?;
        let record = self.check(request, Some(appointment_id)).await?;
        let appointment = self.store.update_appointment(appointment_id, record).await?;

        info!("Appointment {} updated", appointment.id);
        Ok(appointment)
    }

    /// Runs the same checks as create/update without committing anything.
    pub async fn validate_appointment(
        &self,
        request: AppointmentRequest,
        existing_id: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        self.check(request, existing_id).await.map(|_| ())
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        Ok(self.store.get_appointment(appointment_id).await?)
    }

    pub async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments with filter: {:?}", filter);
        Ok(self.store.list_appointments(filter).await?)
    }

    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        self.store.delete_appointment(appointment_id).await?;
        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    async fn check(
        &self,
        request: AppointmentRequest,
        existing_id: Option<Uuid>,
    ) -> Result<NewAppointment, AppointmentError> {
        let mut errors = ValidationErrors::new();
        let draft = self.resolve_draft(request, &mut errors).await?;

        // The date rule is a field check of its own and still applies when the
        // rest of the draft is incomplete.
        if !draft.is_complete() {
            if let Some(date) = draft.date {
                if let Err(kind) = check_appointment_date(date, self.validator.today()) {
                    errors.add(Field::Date, kind);
                }
            }
        }

        match self.validator.validate(&draft, existing_id, self.store.as_ref()).await {
            Ok(()) => {}
            Err(AppointmentError::Validation(rule_errors)) => errors.merge(rule_errors),
            Err(other) => return Err(other),
        }

        match (errors.is_empty(), draft.into_record()) {
            (true, Some(record)) => Ok(record),
            _ => Err(AppointmentError::Validation(errors)),
        }
    }

    async fn resolve_draft(
        &self,
        request: AppointmentRequest,
        errors: &mut ValidationErrors,
    ) -> Result<AppointmentDraft, AppointmentError> {
        let doctor = match request.doctor_id {
            None => {
                errors.add(Field::Doctor, FieldErrorKind::Required);
                None
            }
            Some(id) => match self.store.get_doctor(id).await {
                Ok(doctor) => Some(doctor),
                Err(e) if e.is_not_found() => {
                    errors.add(Field::Doctor, FieldErrorKind::UnknownReference);
                    None
                }
                Err(e) => return Err(e.into()),
            },
        };

        let patient = match request.patient_id {
            None => {
                errors.add(Field::Patient, FieldErrorKind::Required);
                None
            }
            Some(id) => match self.store.get_patient(id).await {
                Ok(patient) => Some(patient),
                Err(StoreError::NotFound { .. }) => {
                    errors.add(Field::Patient, FieldErrorKind::UnknownReference);
                    None
                }
                Err(e) => return Err(e.into()),
            },
        };

        let specialty = match normalize_optional(request.specialty) {
            None => {
                errors.add(Field::Specialty, FieldErrorKind::Required);
                None
            }
            Some(specialty) => match validate_max_len(&specialty, MAX_SPECIALTY_LEN) {
                Ok(()) => Some(specialty),
                Err(kind) => {
                    errors.add(Field::Specialty, kind);
                    None
                }
            },
        };

        if request.date.is_none() {
            errors.add(Field::Date, FieldErrorKind::Required);
        }
        if request.time.is_none() {
            errors.add(Field::Time, FieldErrorKind::Required);
        }

        Ok(AppointmentDraft {
            doctor,
            patient,
            specialty,
            date: request.date,
            time: request.time,
            notes: normalize_optional(request.notes),
        })
    }
}
