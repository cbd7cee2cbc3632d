pub mod validation;

pub use validation::{validate_full_name, NameError};
