// libs/appointment-cell/tests/validator_test.rs

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use appointment_cell::{AppointmentDraft, AppointmentError, AppointmentValidator, FixedClock};
use shared_database::{
    AppointmentQuery, AppointmentRepository, DoctorRepository, InMemoryStore, PatientRepository,
    StoreError, StoreResult,
};
use shared_models::{
    Doctor, Field, FieldErrorKind, NewAppointment, NewDoctor, NewPatient, Patient, Sex,
};

// =============================================================================
// FIXTURES
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn validator_on(today: NaiveDate) -> AppointmentValidator {
    AppointmentValidator::new(Arc::new(FixedClock(today)))
}

/// Today for most scenarios: a month before the booked dates.
fn validator() -> AppointmentValidator {
    validator_on(date(2024, 12, 1))
}

async fn add_doctor(store: &InMemoryStore, email: &str, specialty: &str) -> Doctor {
    store
        .insert_doctor(NewDoctor {
            full_name: "Juan Pérez".to_string(),
            national_id: "12345678-9".to_string(),
            specialty: specialty.to_string(),
            email: email.to_string(),
            phone: None,
        })
        .await
        .unwrap()
}

async fn add_patient(store: &InMemoryStore, name: &str) -> Patient {
    store
        .insert_patient(NewPatient {
            full_name: name.to_string(),
            national_id: "98765432-1".to_string(),
            birth_date: date(1990, 5, 17),
            sex: Sex::Female,
            phone: None,
        })
        .await
        .unwrap()
}

async fn book(
    store: &InMemoryStore,
    doctor: &Doctor,
    patient: &Patient,
    specialty: &str,
    on: NaiveDate,
    time: NaiveTime,
) -> Uuid {
    store
        .insert_appointment(NewAppointment {
            doctor_id: doctor.id,
            patient_id: patient.id,
            specialty: specialty.to_string(),
            date: on,
            time,
            notes: None,
        })
        .await
        .unwrap()
        .id
}

fn draft(doctor: &Doctor, patient: &Patient, specialty: &str, on: NaiveDate, time: NaiveTime) -> AppointmentDraft {
    AppointmentDraft {
        doctor: Some(doctor.clone()),
        patient: Some(patient.clone()),
        specialty: Some(specialty.to_string()),
        date: Some(on),
        time: Some(time),
        notes: None,
    }
}

// =============================================================================
// DOCTOR DOUBLE-BOOKING
// =============================================================================

#[tokio::test]
async fn test_doctor_cannot_be_booked_twice_for_same_slot() {
    let store = InMemoryStore::new();
    let doctor = add_doctor(&store, "x@clinic.cl", "Cardiología").await;
    let patient_a = add_patient(&store, "Ana Reyes").await;
    let patient_b = add_patient(&store, "Beatriz Soto").await;
    book(&store, &doctor, &patient_a, "Cardiología", date(2025, 1, 1), at(10, 0)).await;

    let candidate = draft(&doctor, &patient_b, "Cardiología", date(2025, 1, 1), at(10, 0));
    let result = validator().validate(&candidate, None, &store).await;

    let errors = assert_matches!(result, Err(AppointmentError::Validation(errors)) => errors);
    assert_eq!(errors.get(Field::Time), &[FieldErrorKind::DoctorTimeConflict]);
    assert_eq!(errors.len(), 1);
}

#[tokio::test]
async fn test_editing_appointment_does_not_conflict_with_itself() {
    let store = InMemoryStore::new();
    let doctor = add_doctor(&store, "x@clinic.cl", "Cardiología").await;
    let patient = add_patient(&store, "Ana Reyes").await;
    let existing = book(&store, &doctor, &patient, "Cardiología", date(2025, 1, 1), at(10, 0)).await;

    let candidate = draft(&doctor, &patient, "Cardiología", date(2025, 1, 1), at(10, 0));
    let result = validator().validate(&candidate, Some(existing), &store).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_same_doctor_different_time_is_free() {
    let store = InMemoryStore::new();
    let doctor = add_doctor(&store, "x@clinic.cl", "Cardiología").await;
    let patient_a = add_patient(&store, "Ana Reyes").await;
    let patient_b = add_patient(&store, "Beatriz Soto").await;
    book(&store, &doctor, &patient_a, "Cardiología", date(2025, 1, 1), at(10, 0)).await;

    let candidate = draft(&doctor, &patient_b, "Cardiología", date(2025, 1, 1), at(10, 30));
    assert!(validator().validate(&candidate, None, &store).await.is_ok());
}

// =============================================================================
// PATIENT SAME-DAY SPECIALTY
// =============================================================================

#[tokio::test]
async fn test_patient_specialty_conflict_ignores_case() {
    let store = InMemoryStore::new();
    let cardio_1 = add_doctor(&store, "c1@clinic.cl", "Cardiología").await;
    let cardio_2 = add_doctor(&store, "c2@clinic.cl", "Cardiología").await;
    let patient = add_patient(&store, "Ana Reyes").await;
    book(&store, &cardio_1, &patient, "Cardiología", date(2025, 1, 1), at(9, 0)).await;

    let candidate = draft(&cardio_2, &patient, "cardiología", date(2025, 1, 1), at(16, 0));
    let result = validator().validate(&candidate, None, &store).await;

    let errors = assert_matches!(result, Err(AppointmentError::Validation(errors)) => errors);
    assert_eq!(errors.get(Field::Specialty), &[FieldErrorKind::PatientSpecialtyConflict]);
    assert!(errors.get(Field::Time).is_empty());
}

#[tokio::test]
async fn test_patient_may_see_other_specialty_same_day() {
    let store = InMemoryStore::new();
    let cardio = add_doctor(&store, "c@clinic.cl", "Cardiología").await;
    let neuro = add_doctor(&store, "n@clinic.cl", "Neurología").await;
    let patient = add_patient(&store, "Ana Reyes").await;
    book(&store, &cardio, &patient, "Cardiología", date(2025, 1, 1), at(9, 0)).await;

    let candidate = draft(&neuro, &patient, "Neurología", date(2025, 1, 1), at(11, 0));
    assert!(validator().validate(&candidate, None, &store).await.is_ok());
}

#[tokio::test]
async fn test_patient_may_repeat_specialty_on_another_day() {
    let store = InMemoryStore::new();
    let cardio = add_doctor(&store, "c@clinic.cl", "Cardiología").await;
    let patient = add_patient(&store, "Ana Reyes").await;
    book(&store, &cardio, &patient, "Cardiología", date(2025, 1, 1), at(9, 0)).await;

    let candidate = draft(&cardio, &patient, "Cardiología", date(2025, 1, 2), at(9, 0));
    assert!(validator().validate(&candidate, None, &store).await.is_ok());
}

// =============================================================================
// SPECIALTY MATCH
// =============================================================================

#[tokio::test]
async fn test_specialty_must_match_doctor() {
    let store = InMemoryStore::new();
    let doctor = add_doctor(&store, "x@clinic.cl", "Cardiología").await;
    let patient = add_patient(&store, "Ana Reyes").await;

    for specialty in ["Pediatria", "PEDIATRIA", "pediatria"] {
        let candidate = draft(&doctor, &patient, specialty, date(2025, 1, 1), at(10, 0));
        let result = validator().validate(&candidate, None, &store).await;

        let errors = assert_matches!(result, Err(AppointmentError::Validation(errors)) => errors);
        assert_eq!(
            errors.get(Field::Specialty),
            &[FieldErrorKind::SpecialtyMismatch { expected: "Cardiología".to_string() }]
        );
    }
}

#[tokio::test]
async fn test_specialty_match_ignores_case() {
    let store = InMemoryStore::new();
    let doctor = add_doctor(&store, "x@clinic.cl", "Cardiología").await;
    let patient = add_patient(&store, "Ana Reyes").await;

    let candidate = draft(&doctor, &patient, "CARDIOLOGÍA", date(2025, 1, 1), at(10, 0));
    assert!(validator().validate(&candidate, None, &store).await.is_ok());
}

// =============================================================================
// DATE
// =============================================================================

#[tokio::test]
async fn test_date_before_today_is_rejected() {
    let store = InMemoryStore::new();
    let doctor = add_doctor(&store, "x@clinic.cl", "Cardiología").await;
    let patient = add_patient(&store, "Ana Reyes").await;

    let candidate = draft(&doctor, &patient, "Cardiología", date(2025, 1, 1), at(10, 0));
    let result = validator_on(date(2025, 1, 2)).validate(&candidate, None, &store).await;

    let errors = assert_matches!(result, Err(AppointmentError::Validation(errors)) => errors);
    assert_eq!(errors.get(Field::Date), &[FieldErrorKind::PastDate]);
}

#[tokio::test]
async fn test_today_is_bookable() {
    let store = InMemoryStore::new();
    let doctor = add_doctor(&store, "x@clinic.cl", "Cardiología").await;
    let patient = add_patient(&store, "Ana Reyes").await;

    let candidate = draft(&doctor, &patient, "Cardiología", date(2025, 1, 1), at(10, 0));
    let result = validator_on(date(2025, 1, 1)).validate(&candidate, None, &store).await;

    assert!(result.is_ok());
}

// =============================================================================
// AGGREGATION, IDEMPOTENCE, PARTIAL DRAFTS
// =============================================================================

#[tokio::test]
async fn test_all_violations_are_reported_together() {
    let store = InMemoryStore::new();
    let cardio = add_doctor(&store, "c@clinic.cl", "Cardiología").await;
    let patient_a = add_patient(&store, "Ana Reyes").await;
    let patient_b = add_patient(&store, "Beatriz Soto").await;
    book(&store, &cardio, &patient_a, "Cardiología", date(2025, 1, 1), at(10, 0)).await;
    book(&store, &cardio, &patient_b, "Pediatría", date(2025, 1, 1), at(12, 0)).await;

    // Past date, doctor busy at 10:00, patient B already has Pediatría that
    // day, and the doctor is not a pediatrician.
    let candidate = draft(&cardio, &patient_b, "pediatría", date(2025, 1, 1), at(10, 0));
    let result = validator_on(date(2025, 3, 1)).validate(&candidate, None, &store).await;

    let errors = assert_matches!(result, Err(AppointmentError::Validation(errors)) => errors);
    assert_eq!(errors.get(Field::Date), &[FieldErrorKind::PastDate]);
    assert_eq!(errors.get(Field::Time), &[FieldErrorKind::DoctorTimeConflict]);
    assert_eq!(
        errors.get(Field::Specialty),
        &[
            FieldErrorKind::PatientSpecialtyConflict,
            FieldErrorKind::SpecialtyMismatch { expected: "Cardiología".to_string() },
        ]
    );
    assert_eq!(errors.len(), 4);
}

#[tokio::test]
async fn test_repeated_validation_gives_same_result() {
    let store = InMemoryStore::new();
    let doctor = add_doctor(&store, "x@clinic.cl", "Cardiología").await;
    let patient_a = add_patient(&store, "Ana Reyes").await;
    let patient_b = add_patient(&store, "Beatriz Soto").await;
    book(&store, &doctor, &patient_a, "Cardiología", date(2025, 1, 1), at(10, 0)).await;

    let validator = validator();
    let candidate = draft(&doctor, &patient_b, "Pediatría", date(2025, 1, 1), at(10, 0));

    let first = validator.validate(&candidate, None, &store).await.unwrap_err();
    let second = validator.validate(&candidate, None, &store).await.unwrap_err();

    assert_eq!(first.field_errors(), second.field_errors());
    assert!(first.field_errors().is_some());
}

#[tokio::test]
async fn test_incomplete_draft_skips_all_rules() {
    let store = InMemoryStore::new();
    let doctor = add_doctor(&store, "x@clinic.cl", "Cardiología").await;
    let patient_a = add_patient(&store, "Ana Reyes").await;
    let patient_b = add_patient(&store, "Beatriz Soto").await;
    book(&store, &doctor, &patient_a, "Cardiología", date(2025, 1, 1), at(10, 0)).await;

    // Complete, this draft breaks every rule.
    let full = draft(&doctor, &patient_b, "Pediatría", date(2025, 1, 1), at(10, 0));
    let late = validator_on(date(2025, 6, 1));
    assert!(late.validate(&full, None, &store).await.is_err());

    let partials = [
        AppointmentDraft { doctor: None, ..full.clone() },
        AppointmentDraft { patient: None, ..full.clone() },
        AppointmentDraft { specialty: None, ..full.clone() },
        AppointmentDraft { specialty: Some("   ".to_string()), ..full.clone() },
        AppointmentDraft { date: None, ..full.clone() },
        AppointmentDraft { time: None, ..full.clone() },
    ];

    for partial in &partials {
        assert!(late.validate(partial, None, &store).await.is_ok(), "{:?}", partial);
    }
}

#[tokio::test]
async fn test_validation_does_not_reserve_the_slot() {
    let store = InMemoryStore::new();
    let doctor = add_doctor(&store, "x@clinic.cl", "Cardiología").await;
    let patient_a = add_patient(&store, "Ana Reyes").await;
    let patient_b = add_patient(&store, "Beatriz Soto").await;
    let validator = validator();

    // Two requests for the same slot validated before either commits.
    let first = draft(&doctor, &patient_a, "Cardiología", date(2025, 1, 1), at(10, 0));
    let second = draft(&doctor, &patient_b, "Cardiología", date(2025, 1, 1), at(10, 0));
    assert!(validator.validate(&first, None, &store).await.is_ok());
    assert!(validator.validate(&second, None, &store).await.is_ok());

    book(&store, &doctor, &patient_a, "Cardiología", date(2025, 1, 1), at(10, 0)).await;
    book(&store, &doctor, &patient_b, "Cardiología", date(2025, 1, 1), at(10, 0)).await;

    let slot = store.find_doctor_slot(doctor.id, date(2025, 1, 1), at(10, 0)).await.unwrap();
    assert_eq!(slot.len(), 2);
}

// =============================================================================
// STORE FAILURES
// =============================================================================

/// Query port that counts calls and can be told to fail.
struct ScriptedStore {
    calls: AtomicUsize,
    fail: bool,
}

impl ScriptedStore {
    fn new(fail: bool) -> Self {
        Self { calls: AtomicUsize::new(0), fail }
    }

    fn answer(&self) -> StoreResult<HashSet<Uuid>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(StoreError::Backend("connection refused".to_string()))
        } else {
            Ok(HashSet::new())
        }
    }
}

#[async_trait]
impl AppointmentQuery for ScriptedStore {
    async fn find_doctor_slot(&self, _doctor_id: Uuid, _date: NaiveDate, _time: NaiveTime) -> StoreResult<HashSet<Uuid>> {
        self.answer()
    }

    async fn find_patient_specialty_day(&self, _patient_id: Uuid, _date: NaiveDate, _specialty: &str) -> StoreResult<HashSet<Uuid>> {
        self.answer()
    }

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Doctor> {
        Err(StoreError::not_found("Doctor", id))
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Patient> {
        Err(StoreError::not_found("Patient", id))
    }
}

fn detached_draft() -> AppointmentDraft {
    AppointmentDraft {
        doctor: Some(Doctor {
            id: Uuid::new_v4(),
            full_name: "Juan Pérez".to_string(),
            national_id: "12345678-9".to_string(),
            specialty: "Cardiología".to_string(),
            email: "x@clinic.cl".to_string(),
            phone: None,
        }),
        patient: Some(Patient {
            id: Uuid::new_v4(),
            full_name: "Ana Reyes".to_string(),
            national_id: "98765432-1".to_string(),
            birth_date: date(1990, 5, 17),
            sex: Sex::Female,
            phone: None,
        }),
        specialty: Some("Cardiología".to_string()),
        date: Some(date(2025, 1, 1)),
        time: Some(at(10, 0)),
        notes: None,
    }
}

#[tokio::test]
async fn test_store_failure_is_propagated() {
    let store = ScriptedStore::new(true);

    let result = validator().validate(&detached_draft(), None, &store).await;

    assert_matches!(result, Err(AppointmentError::Store(StoreError::Backend(_))));
}

#[tokio::test]
async fn test_each_validation_reads_the_store_twice() {
    let store = ScriptedStore::new(false);
    let validator = validator();

    validator.validate(&detached_draft(), None, &store).await.unwrap();
    validator.validate(&detached_draft(), None, &store).await.unwrap();

    assert_eq!(store.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_incomplete_draft_reads_nothing() {
    let store = ScriptedStore::new(true);
    let partial = AppointmentDraft { time: None, ..detached_draft() };

    assert!(validator().validate(&partial, None, &store).await.is_ok());
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}
