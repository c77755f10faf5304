use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::field::{
    parse_birth_date, validate_city, validate_date_of_birth_at, validate_email, validate_name,
    validate_postal_code, FieldVerdict,
};
use crate::models::RegistrantInput;

/// Form fields, in display order
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    DateOfBirth,
    City,
    PostalCode,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::DateOfBirth,
        Field::City,
        Field::PostalCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::DateOfBirth => "dateOfBirth",
            Field::City => "city",
            Field::PostalCode => "postalCode",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw, unvalidated registration form
///
/// Deserializes from any JSON object. Missing keys, `null` and values that
/// are not strings all land as `None`, so a wrong-shaped value is reported
/// the same way as an absent one.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub postal_code: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl RegistrationForm {
    /// Builds a form from an arbitrary JSON value; non-objects yield an empty form
    pub fn from_json(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::FirstName => self.first_name.as_deref(),
            Field::LastName => self.last_name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::DateOfBirth => self.date_of_birth.as_deref(),
            Field::City => self.city.as_deref(),
            Field::PostalCode => self.postal_code.as_deref(),
        }
    }
}

/// Whole-form verdict: `is_valid` iff `errors` is empty
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: BTreeMap<Field, String>,
}

impl ValidationResult {
    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }
}

fn check(form: &RegistrationForm, field: Field, today: NaiveDate) -> FieldVerdict {
    let value = form.get(field);
    match field {
        Field::FirstName | Field::LastName => validate_name(value),
        Field::Email => validate_email(value),
        Field::DateOfBirth => validate_date_of_birth_at(value, today),
        Field::City => validate_city(value),
        Field::PostalCode => validate_postal_code(value),
    }
}

/// Validates every field of the form against the local calendar date
pub fn validate_form(form: &RegistrationForm) -> ValidationResult {
    validate_form_at(form, Local::now().date_naive())
}

/// Validates every field of the form as of `today`
///
/// All validators run; one failing field never hides another.
pub fn validate_form_at(form: &RegistrationForm, today: NaiveDate) -> ValidationResult {
    let errors: BTreeMap<Field, String> = Field::ALL
        .iter()
        .filter_map(|&field| {
            let verdict = check(form, field, today);
            (!verdict.valid).then_some((field, verdict.message))
        })
        .collect();

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Validates the form and, on success, produces the trimmed candidate
/// handed to the roster manager
pub fn validate_into_input(
    form: &RegistrationForm,
    today: NaiveDate,
) -> Result<RegistrantInput, ValidationResult> {
    let result = validate_form_at(form, today);
    if !result.is_valid {
        return Err(result);
    }

    let text = |field: Field| form.get(field).unwrap_or_default().trim().to_string();
    let date_of_birth = form
        .get(Field::DateOfBirth)
        .and_then(parse_birth_date)
        .ok_or_else(|| result.clone())?;

    Ok(RegistrantInput {
        first_name: text(Field::FirstName),
        last_name: text(Field::LastName),
        email: text(Field::Email),
        date_of_birth,
        city: text(Field::City),
        postal_code: text(Field::PostalCode),
    })
}
