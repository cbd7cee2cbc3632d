// libs/shared/models/src/validation.rs
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Input fields that validation failures are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    NationalId,
    Specialty,
    Email,
    Phone,
    BirthDate,
    Sex,
    Doctor,
    Patient,
    Date,
    Time,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::FullName => "full_name",
            Field::NationalId => "national_id",
            Field::Specialty => "specialty",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::BirthDate => "birth_date",
            Field::Sex => "sex",
            Field::Doctor => "doctor",
            Field::Patient => "patient",
            Field::Date => "date",
            Field::Time => "time",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldErrorKind {
    #[error("The name must have at least two words (first and last name).")]
    TooFewWords,

    #[error("The word '{0}' is too short. Minimum 3 letters.")]
    WordTooShort(String),

    #[error("The national ID must include the separator (e.g. 12345678-9).")]
    MissingSeparator,

    #[error("Enter a valid email address.")]
    InvalidEmail,

    #[error("A doctor with this email already exists.")]
    DuplicateEmail,

    #[error("Ensure this value has at most {max} characters.")]
    TooLong { max: usize },

    #[error("This field is required.")]
    Required,

    #[error("Select a valid choice; that record does not exist.")]
    UnknownReference,

    #[error("Appointments cannot be booked in the past.")]
    PastDate,

    #[error("This doctor already has an appointment at that time.")]
    DoctorTimeConflict,

    #[error("The patient already has an appointment for this specialty on that day.")]
    PatientSpecialtyConflict,

    #[error("The specialty does not match. The doctor's specialty is: {expected}")]
    SpecialtyMismatch { expected: String },
}

impl FieldErrorKind {
    /// Machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            FieldErrorKind::TooFewWords => "too_few_words",
            FieldErrorKind::WordTooShort(_) => "word_too_short",
            FieldErrorKind::MissingSeparator => "missing_separator",
            FieldErrorKind::InvalidEmail => "invalid_email",
            FieldErrorKind::DuplicateEmail => "duplicate_email",
            FieldErrorKind::TooLong { .. } => "too_long",
            FieldErrorKind::Required => "required",
            FieldErrorKind::UnknownReference => "unknown_reference",
            FieldErrorKind::PastDate => "past_date",
            FieldErrorKind::DoctorTimeConflict => "doctor_time_conflict",
            FieldErrorKind::PatientSpecialtyConflict => "patient_specialty_conflict",
            FieldErrorKind::SpecialtyMismatch { .. } => "specialty_mismatch",
        }
    }
}

impl Serialize for FieldErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("FieldError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Field-keyed collection of validation failures.
///
/// Errors are kept in insertion order per field so that every failure found
/// in one pass can be shown to the user at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<Field, Vec<FieldErrorKind>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, kind: FieldErrorKind) {
        let errors = self.fields.entry(field).or_default();
        if !errors.contains(&kind) {
            errors.push(kind);
        }
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, kinds) in other.fields {
            for kind in kinds {
                self.add(field, kind);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    pub fn get(&self, field: Field) -> &[FieldErrorKind] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: Field, kind: &FieldErrorKind) -> bool {
        self.get(field).contains(kind)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.keys().copied()
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, kinds) in &self.fields {
            for kind in kinds {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, kind)?;
                first = false;
            }
        }
        Ok(())
    }
}
