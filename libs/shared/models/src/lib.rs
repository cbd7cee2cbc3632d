pub mod clinic;
pub mod error;
pub mod validation;

pub use clinic::*;
pub use validation::{Field, FieldErrorKind, ValidationErrors};
