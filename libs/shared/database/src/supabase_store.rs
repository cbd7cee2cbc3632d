// libs/shared/database/src/supabase_store.rs
use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{Appointment, Doctor, NewAppointment, NewDoctor, NewPatient, Patient};

use crate::error::StoreError;
use crate::store::{
    AppointmentFilter, AppointmentQuery, AppointmentRepository, DoctorRepository,
    PatientRepository, StoreResult,
};
use crate::supabase::SupabaseClient;

/// Record store backed by Supabase's PostgREST API.
///
/// Cascading deletes rely on `ON DELETE CASCADE` foreign keys from
/// `appointments` to `doctors` and `patients`, and email uniqueness on a
/// unique index over `doctors.email`.
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

#[derive(Deserialize)]
struct IdRow {
    id: Uuid,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> StoreResult<Vec<T>> {
        let rows: Vec<Value> = self.supabase.request(Method::GET, path, None)
            .await
            .map_err(backend_error)?;
        decode_rows(rows)
    }

    async fn fetch_one<T: DeserializeOwned>(&self, table: &str, entity: &'static str, id: Uuid) -> StoreResult<T> {
        let path = format!("/rest/v1/{}?id=eq.{}", table, id);
        self.fetch::<T>(&path)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(entity, id))
    }

    async fn fetch_ids(&self, path: &str) -> StoreResult<HashSet<Uuid>> {
        Ok(self.fetch::<IdRow>(path).await?.into_iter().map(|row| row.id).collect())
    }

    async fn write<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        entity: &'static str,
        id: Option<Uuid>,
    ) -> StoreResult<T> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let rows: Vec<Value> = self.supabase.request_with_headers(
            method,
            path,
            body,
            Some(headers),
        ).await.map_err(backend_error)?;

        match (decode_rows::<T>(rows)?.into_iter().next(), id) {
            (Some(row), _) => Ok(row),
            (None, Some(id)) => Err(StoreError::not_found(entity, id)),
            (None, None) => Err(StoreError::Backend(format!("{} write returned no rows", entity))),
        }
    }

    async fn delete(&self, table: &str, entity: &'static str, id: Uuid) -> StoreResult<()> {
        let path = format!("/rest/v1/{}?id=eq.{}", table, id);
        let _: Value = self.write(Method::DELETE, &path, None, entity, Some(id)).await?;
        Ok(())
    }
}

#[async_trait]
impl AppointmentQuery for SupabaseStore {
    async fn find_doctor_slot(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> StoreResult<HashSet<Uuid>> {
        debug!("Querying appointments for doctor {} at {} {}", doctor_id, date, time);

        let path = format!(
            "/rest/v1/appointments?select=id&doctor_id=eq.{}&date=eq.{}&time=eq.{}",
            doctor_id,
            date.format("%Y-%m-%d"),
            time.format("%H:%M:%S"),
        );
        self.fetch_ids(&path).await
    }

    async fn find_patient_specialty_day(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
        specialty: &str,
    ) -> StoreResult<HashSet<Uuid>> {
        debug!("Querying appointments for patient {} on {} in {}", patient_id, date, specialty);

        let path = format!(
            "/rest/v1/appointments?select=id&patient_id=eq.{}&date=eq.{}&specialty=ilike.{}",
            patient_id,
            date.format("%Y-%m-%d"),
            urlencoding::encode(&escape_like(specialty)),
        );
        self.fetch_ids(&path).await
    }

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Doctor> {
        self.fetch_one("doctors", "Doctor", id).await
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Patient> {
        self.fetch_one("patients", "Patient", id).await
    }
}

#[async_trait]
impl DoctorRepository for SupabaseStore {
    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        self.fetch("/rest/v1/doctors?order=full_name.asc").await
    }

    async fn find_doctor_by_email(&self, email: &str) -> StoreResult<Option<Doctor>> {
        let path = format!("/rest/v1/doctors?email=eq.{}", urlencoding::encode(email));
        Ok(self.fetch::<Doctor>(&path).await?.into_iter().next())
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> StoreResult<Doctor> {
        let body = serde_json::to_value(&doctor).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.write(Method::POST, "/rest/v1/doctors", Some(body), "Doctor", None).await
    }

    async fn update_doctor(&self, id: Uuid, doctor: NewDoctor) -> StoreResult<Doctor> {
        let body = serde_json::to_value(&doctor).map_err(|e| StoreError::Decode(e.to_string()))?;
        let path = format!("/rest/v1/doctors?id=eq.{}", id);
        self.write(Method::PATCH, &path, Some(body), "Doctor", Some(id)).await
    }

    async fn delete_doctor(&self, id: Uuid) -> StoreResult<()> {
        self.delete("doctors", "Doctor", id).await
    }
}

#[async_trait]
impl PatientRepository for SupabaseStore {
    async fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        self.fetch("/rest/v1/patients?order=full_name.asc").await
    }

    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        let body = serde_json::to_value(&patient).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.write(Method::POST, "/rest/v1/patients", Some(body), "Patient", None).await
    }

    async fn update_patient(&self, id: Uuid, patient: NewPatient) -> StoreResult<Patient> {
        let body = serde_json::to_value(&patient).map_err(|e| StoreError::Decode(e.to_string()))?;
        let path = format!("/rest/v1/patients?id=eq.{}", id);
        self.write(Method::PATCH, &path, Some(body), "Patient", Some(id)).await
    }

    async fn delete_patient(&self, id: Uuid) -> StoreResult<()> {
        self.delete("patients", "Patient", id).await
    }
}

#[async_trait]
impl AppointmentRepository for SupabaseStore {
    async fn list_appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let mut query_parts = vec![];

        if let Some(doctor_id) = filter.doctor_id {
            query_parts.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(patient_id) = filter.patient_id {
            query_parts.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(date) = filter.date {
            query_parts.push(format!("date=eq.{}", date.format("%Y-%m-%d")));
        }
        query_parts.push("order=date.asc,time.asc".to_string());

        let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));
        self.fetch(&path).await
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Appointment> {
        self.fetch_one("appointments", "Appointment", id).await
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment> {
        let body = serde_json::to_value(&appointment).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.write(Method::POST, "/rest/v1/appointments", Some(body), "Appointment", None).await
    }

    async fn update_appointment(&self, id: Uuid, appointment: NewAppointment) -> StoreResult<Appointment> {
        let body = serde_json::to_value(&appointment).map_err(|e| StoreError::Decode(e.to_string()))?;
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        self.write(Method::PATCH, &path, Some(body), "Appointment", Some(id)).await
    }

    async fn delete_appointment(&self, id: Uuid) -> StoreResult<()> {
        self.delete("appointments", "Appointment", id).await
    }
}

fn backend_error(err: anyhow::Error) -> StoreError {
    let message = err.to_string();
    if message.starts_with("Conflict") {
        StoreError::UniqueViolation(message)
    } else {
        StoreError::Backend(message)
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> StoreResult<Vec<T>> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| StoreError::Decode(e.to_string()))
}

/// `ilike` without wildcards is case-insensitive equality once the pattern
/// characters in the value are escaped.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_' | '*') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
