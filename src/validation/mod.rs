pub mod field;
pub mod form;

pub use field::{
    validate_city, validate_date_of_birth, validate_date_of_birth_at, validate_email,
    validate_name, validate_postal_code, FieldVerdict,
};
pub use form::{
    validate_form, validate_form_at, validate_into_input, Field, RegistrationForm,
    ValidationResult,
};
