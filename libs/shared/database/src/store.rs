// libs/shared/database/src/store.rs
use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;

use shared_models::{Appointment, Doctor, NewAppointment, NewDoctor, NewPatient, Patient};

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Optional filters for the appointment listing. Unset filters match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilter {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.doctor_id.map_or(true, |id| appointment.doctor_id == id)
            && self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.date.map_or(true, |date| appointment.date == date)
    }
}

/// Read-only queries the booking rules need.
///
/// Every call reads the current state of the store; implementations must
/// return an error rather than an empty set when the read fails.
#[async_trait]
pub trait AppointmentQuery: Send + Sync {
    /// Ids of appointments held by `doctor_id` at exactly `date` and `time`.
    async fn find_doctor_slot(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> StoreResult<HashSet<Uuid>>;

    /// Ids of appointments for `patient_id` on `date` whose specialty equals
    /// `specialty` ignoring case.
    async fn find_patient_specialty_day(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
        specialty: &str,
    ) -> StoreResult<HashSet<Uuid>>;

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Doctor>;

    async fn get_patient(&self, id: Uuid) -> StoreResult<Patient>;
}

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>>;

    async fn find_doctor_by_email(&self, email: &str) -> StoreResult<Option<Doctor>>;

    async fn insert_doctor(&self, doctor: NewDoctor) -> StoreResult<Doctor>;

    async fn update_doctor(&self, id: Uuid, doctor: NewDoctor) -> StoreResult<Doctor>;

    /// Removes the doctor together with all of their appointments.
    async fn delete_doctor(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn list_patients(&self) -> StoreResult<Vec<Patient>>;

    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient>;

    async fn update_patient(&self, id: Uuid, patient: NewPatient) -> StoreResult<Patient>;

    /// Removes the patient together with all of their appointments.
    async fn delete_patient(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Matching appointments ordered by date, then time.
    async fn list_appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>>;

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Appointment>;

    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment>;

    async fn update_appointment(&self, id: Uuid, appointment: NewAppointment) -> StoreResult<Appointment>;

    async fn delete_appointment(&self, id: Uuid) -> StoreResult<()>;
}

/// Everything the clinic service needs from persistence.
pub trait RecordStore:
    AppointmentQuery + DoctorRepository + PatientRepository + AppointmentRepository
{
}

impl<T> RecordStore for T where
    T: AppointmentQuery + DoctorRepository + PatientRepository + AppointmentRepository
{
}
