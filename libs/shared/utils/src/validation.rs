// =====================================================================================
// INTAKE RULES - FIELD-LEVEL CHECKS SHARED BY DOCTOR AND PATIENT REGISTRATION
// =====================================================================================

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use shared_models::FieldErrorKind;

pub const MAX_FULL_NAME_LEN: usize = 200;
pub const MAX_NATIONAL_ID_LEN: usize = 12;
pub const MAX_SPECIALTY_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 20;

pub const NATIONAL_ID_SEPARATOR: char = '-';

const MIN_NAME_WORDS: usize = 2;
const MIN_WORD_LEN: usize = 3;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name must have at least two words")]
    TooFewWords,

    #[error("word '{0}' is shorter than three letters")]
    WordTooShort(String),
}

impl From<NameError> for FieldErrorKind {
    fn from(err: NameError) -> Self {
        match err {
            NameError::TooFewWords => FieldErrorKind::TooFewWords,
            NameError::WordTooShort(word) => FieldErrorKind::WordTooShort(word),
        }
    }
}

/// Full names need at least two words of at least three letters each.
///
/// Only the first offending word is reported. The input is returned unchanged
/// on success; no trimming or case folding is applied to the stored value.
pub fn validate_full_name(name: &str) -> Result<String, NameError> {
    let words: Vec<&str> = name.trim().split_whitespace().collect();

    if words.len() < MIN_NAME_WORDS {
        return Err(NameError::TooFewWords);
    }

    if let Some(short) = words.iter().find(|word| word.chars().count() < MIN_WORD_LEN) {
        return Err(NameError::WordTooShort(short.to_string()));
    }

    Ok(name.to_string())
}

/// Format check only: the identifier must carry the separator. No checksum.
pub fn validate_national_id(national_id: &str) -> Result<(), FieldErrorKind> {
    if !national_id.contains(NATIONAL_ID_SEPARATOR) {
        return Err(FieldErrorKind::MissingSeparator);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldErrorKind> {
    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err(FieldErrorKind::InvalidEmail);
    }
    Ok(())
}

pub fn validate_max_len(value: &str, max: usize) -> Result<(), FieldErrorKind> {
    if value.chars().count() > max {
        return Err(FieldErrorKind::TooLong { max });
    }
    Ok(())
}

/// Blank optional text is stored as absent.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
