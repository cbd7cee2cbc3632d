// libs/shared/database/src/memory.rs
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{Appointment, Doctor, NewAppointment, NewDoctor, NewPatient, Patient};

use crate::error::StoreError;
use crate::store::{
    AppointmentFilter, AppointmentQuery, AppointmentRepository, DoctorRepository,
    PatientRepository, StoreResult,
};

#[derive(Default)]
struct Tables {
    doctors: BTreeMap<Uuid, Doctor>,
    patients: BTreeMap<Uuid, Patient>,
    appointments: BTreeMap<Uuid, Appointment>,
}

/// Process-local record store.
///
/// Doctor emails are unique, and deleting a doctor or patient removes their
/// appointments. No constraint is placed on (doctor, date, time).
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentQuery for InMemoryStore {
    async fn find_doctor_slot(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> StoreResult<HashSet<Uuid>> {
        let tables = self.tables.read().await;
        Ok(tables
            .appointments
            .values()
            .filter(|apt| apt.doctor_id == doctor_id && apt.date == date && apt.time == time)
            .map(|apt| apt.id)
            .collect())
    }

    async fn find_patient_specialty_day(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
        specialty: &str,
    ) -> StoreResult<HashSet<Uuid>> {
        let wanted = specialty.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .appointments
            .values()
            .filter(|apt| {
                apt.patient_id == patient_id
                    && apt.date == date
                    && apt.specialty.to_lowercase() == wanted
            })
            .map(|apt| apt.id)
            .collect())
    }

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Doctor> {
        let tables = self.tables.read().await;
        tables
            .doctors
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Doctor", id))
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Patient> {
        let tables = self.tables.read().await;
        tables
            .patients
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Patient", id))
    }
}

#[async_trait]
impl DoctorRepository for InMemoryStore {
    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        let tables = self.tables.read().await;
        Ok(tables.doctors.values().cloned().collect())
    }

    async fn find_doctor_by_email(&self, email: &str) -> StoreResult<Option<Doctor>> {
        let tables = self.tables.read().await;
        Ok(tables.doctors.values().find(|d| d.email == email).cloned())
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> StoreResult<Doctor> {
        let mut tables = self.tables.write().await;
        if tables.doctors.values().any(|d| d.email == doctor.email) {
            return Err(StoreError::UniqueViolation(format!("doctors.email = {}", doctor.email)));
        }

        let doctor = doctor.into_doctor(Uuid::new_v4());
        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn update_doctor(&self, id: Uuid, doctor: NewDoctor) -> StoreResult<Doctor> {
        let mut tables = self.tables.write().await;
        if !tables.doctors.contains_key(&id) {
            return Err(StoreError::not_found("Doctor", id));
        }
        if tables.doctors.values().any(|d| d.id != id && d.email == doctor.email) {
            return Err(StoreError::UniqueViolation(format!("doctors.email = {}", doctor.email)));
        }

        let doctor = doctor.into_doctor(id);
        tables.doctors.insert(id, doctor.clone());
        Ok(doctor)
    }

    async fn delete_doctor(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.doctors.remove(&id).is_none() {
            return Err(StoreError::not_found("Doctor", id));
        }

        let before = tables.appointments.len();
        tables.appointments.retain(|_, apt| apt.doctor_id != id);
        debug!("Deleted doctor {} and {} appointments", id, before - tables.appointments.len());
        Ok(())
    }
}

#[async_trait]
impl PatientRepository for InMemoryStore {
    async fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        let tables = self.tables.read().await;
        Ok(tables.patients.values().cloned().collect())
    }

    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        let patient = patient.into_patient(Uuid::new_v4());
        let mut tables = self.tables.write().await;
        tables.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn update_patient(&self, id: Uuid, patient: NewPatient) -> StoreResult<Patient> {
        let mut tables = self.tables.write().await;
        if !tables.patients.contains_key(&id) {
            return Err(StoreError::not_found("Patient", id));
        }

        let patient = patient.into_patient(id);
        tables.patients.insert(id, patient.clone());
        Ok(patient)
    }

    async fn delete_patient(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.patients.remove(&id).is_none() {
            return Err(StoreError::not_found("Patient", id));
        }

        let before = tables.appointments.len();
        tables.appointments.retain(|_, apt| apt.patient_id != id);
        debug!("Deleted patient {} and {} appointments", id, before - tables.appointments.len());
        Ok(())
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryStore {
    async fn list_appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let tables = self.tables.read().await;
        let mut appointments: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|apt| filter.matches(apt))
            .cloned()
            .collect();
        appointments.sort_by_key(|apt| (apt.date, apt.time));
        Ok(appointments)
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Appointment> {
        let tables = self.tables.read().await;
        tables
            .appointments
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Appointment", id))
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment> {
        let mut tables = self.tables.write().await;
        check_references(&tables, &appointment)?;

        let appointment = appointment.into_appointment(Uuid::new_v4());
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(&self, id: Uuid, appointment: NewAppointment) -> StoreResult<Appointment> {
        let mut tables = self.tables.write().await;
        if !tables.appointments.contains_key(&id) {
            return Err(StoreError::not_found("Appointment", id));
        }
        check_references(&tables, &appointment)?;

        let appointment = appointment.into_appointment(id);
        tables.appointments.insert(id, appointment.clone());
        Ok(appointment)
    }

    async fn delete_appointment(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .appointments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Appointment", id))
    }
}

// Foreign keys: an appointment may only point at existing rows.
fn check_references(tables: &Tables, appointment: &NewAppointment) -> StoreResult<()> {
    if !tables.doctors.contains_key(&appointment.doctor_id) {
        return Err(StoreError::not_found("Doctor", appointment.doctor_id));
    }
    if !tables.patients.contains_key(&appointment.patient_id) {
        return Err(StoreError::not_found("Patient", appointment.patient_id));
    }
    Ok(())
}
