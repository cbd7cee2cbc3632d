// libs/shared/models/src/clinic.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// PERSISTED ENTITIES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub national_id: String,
    pub specialty: String,
    pub email: String,
    pub phone: Option<String>,
}

impl Doctor {
    /// Case-insensitive specialty comparison used by the booking rules.
    pub fn practices(&self, specialty: &str) -> bool {
        self.specialty.to_lowercase() == specialty.to_lowercase()
    }
}

impl fmt::Display for Doctor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name, self.specialty)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sex {
    #[serde(rename = "M", alias = "male")]
    Male,
    #[serde(rename = "F", alias = "female")]
    Female,
    #[serde(rename = "O", alias = "other")]
    Other,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "M"),
            Sex::Female => write!(f, "F"),
            Sex::Other => write!(f, "O"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub national_id: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub phone: Option<String>,
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.full_name, self.national_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub specialty: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

// ==============================================================================
// WRITE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDoctor {
    pub full_name: String,
    pub national_id: String,
    pub specialty: String,
    pub email: String,
    pub phone: Option<String>,
}

impl NewDoctor {
    pub fn into_doctor(self, id: Uuid) -> Doctor {
        Doctor {
            id,
            full_name: self.full_name,
            national_id: self.national_id,
            specialty: self.specialty,
            email: self.email,
            phone: self.phone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub full_name: String,
    pub national_id: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub phone: Option<String>,
}

impl NewPatient {
    pub fn into_patient(self, id: Uuid) -> Patient {
        Patient {
            id,
            full_name: self.full_name,
            national_id: self.national_id,
            birth_date: self.birth_date,
            sex: self.sex,
            phone: self.phone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub specialty: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

impl NewAppointment {
    pub fn into_appointment(self, id: Uuid) -> Appointment {
        Appointment {
            id,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            specialty: self.specialty,
            date: self.date,
            time: self.time,
            notes: self.notes,
        }
    }
}
