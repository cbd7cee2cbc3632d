// libs/appointment-cell/src/services/validator.rs

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use shared_database::AppointmentQuery;
use shared_models::{Field, FieldErrorKind, ValidationErrors};

use crate::models::{AppointmentDraft, AppointmentError};
use crate::services::clock::Clock;

/// Appointments may be booked for today or later.
pub fn check_appointment_date(date: NaiveDate, today: NaiveDate) -> Result<(), FieldErrorKind> {
    if date < today {
        return Err(FieldErrorKind::PastDate);
    }
    Ok(())
}

/// Booking rules evaluated against a point-in-time read of existing
/// appointments.
///
/// The validator never writes. Nothing stops two callers from validating the
/// same slot concurrently and both committing; a uniqueness constraint on
/// `(doctor_id, date, time)` in the store is the only guard against that.
pub struct AppointmentValidator {
    clock: Arc<dyn Clock>,
}

impl AppointmentValidator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Runs every booking rule and reports all violations together.
    ///
    /// If doctor, patient, specialty, date or time is unset the draft is
    /// accepted without any check; the intake layer must reject missing
    /// fields on its own. `existing_id` is left out of both conflict queries
    /// so an appointment never conflicts with its own stored version.
    #[instrument(skip(self, candidate, store), fields(existing_id = ?existing_id))]
    pub async fn validate<Q>(
        &self,
        candidate: &AppointmentDraft,
        existing_id: Option<Uuid>,
        store: &Q,
    ) -> Result<(), AppointmentError>
    where
        Q: AppointmentQuery + ?Sized,
    {
        let (Some(doctor), Some(patient), Some(specialty), Some(date), Some(time)) = (
            candidate.doctor.as_ref(),
            candidate.patient.as_ref(),
            candidate.specialty.as_deref().filter(|s| !s.trim().is_empty()),
            candidate.date,
            candidate.time,
        ) else {
            debug!("Incomplete appointment draft, skipping booking rules");
            return Ok(());
        };

        let mut errors = ValidationErrors::new();

        if let Err(kind) = check_appointment_date(date, self.today()) {
            errors.add(Field::Date, kind);
        }

        let doctor_slot = without(
            store.find_doctor_slot(doctor.id, date, time).await?,
            existing_id,
        );
        if !doctor_slot.is_empty() {
            warn!("Doctor {} already booked on {} at {}", doctor.id, date, time);
            errors.add(Field::Time, FieldErrorKind::DoctorTimeConflict);
        }

        let patient_day = without(
            store.find_patient_specialty_day(patient.id, date, specialty).await?,
            existing_id,
        );
        if !patient_day.is_empty() {
            warn!("Patient {} already has a {} appointment on {}", patient.id, specialty, date);
            errors.add(Field::Specialty, FieldErrorKind::PatientSpecialtyConflict);
        }

        if !doctor.practices(specialty) {
            errors.add(
                Field::Specialty,
                FieldErrorKind::SpecialtyMismatch { expected: doctor.specialty.clone() },
            );
        }

        errors.into_result().map_err(AppointmentError::Validation)
    }
}

fn without(mut ids: HashSet<Uuid>, existing_id: Option<Uuid>) -> HashSet<Uuid> {
    if let Some(id) = existing_id {
        ids.remove(&id);
    }
    ids
}
