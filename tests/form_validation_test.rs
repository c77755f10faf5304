use roster_sync::validation::field::{
    BIRTH_DATE_UNDERAGE, CITY_INVALID, EMAIL_INVALID, NAME_INVALID, NAME_TOO_SHORT,
    POSTAL_CODE_INVALID,
};
use roster_sync::validation::{
    validate_email, validate_form, validate_into_input, validate_postal_code, Field,
    RegistrationForm,
};
use serde_json::json;

mod common;

#[test]
fn test_valid_form_has_no_errors() {
    let result = validate_form(&common::valid_form());
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
}

#[test]
fn test_empty_form_reports_every_field() {
    let result = validate_form(&RegistrationForm::default());
    assert!(!result.is_valid);
    for field in Field::ALL {
        assert!(result.error(field).is_some(), "missing error for {}", field);
    }
}

#[test]
fn test_errors_are_keyed_by_field() {
    let mut form = common::valid_form();
    form.first_name = Some("J".to_string());
    form.last_name = Some("Dupont3".to_string());
    form.city = Some("Paris 15".to_string());
    form.postal_code = Some("7500".to_string());

    let result = validate_form(&form);
    assert_eq!(result.errors.len(), 4);
    assert_eq!(result.error(Field::FirstName), Some(NAME_TOO_SHORT));
    assert_eq!(result.error(Field::LastName), Some(NAME_INVALID));
    assert_eq!(result.error(Field::City), Some(CITY_INVALID));
    assert_eq!(result.error(Field::PostalCode), Some(POSTAL_CODE_INVALID));
}

#[test]
fn test_seventeen_year_old_is_rejected() {
    let mut form = common::valid_form();
    form.date_of_birth = Some(common::years_ago(17).format("%Y-%m-%d").to_string());
    let result = validate_form(&form);
    assert_eq!(result.error(Field::DateOfBirth), Some(BIRTH_DATE_UNDERAGE));
}

#[test]
fn test_eighteenth_birthday_is_accepted() {
    let mut form = common::valid_form();
    form.date_of_birth = Some(common::years_ago(18).format("%Y-%m-%d").to_string());
    assert!(validate_form(&form).is_valid);
}

#[test]
fn test_email_and_postal_code_shapes() {
    assert!(validate_email(Some("a.b+c@d.fr")).is_valid());
    assert_eq!(validate_email(Some("a b@c.fr")).message, EMAIL_INVALID);
    assert!(validate_postal_code(Some("01000")).is_valid());
    assert!(!validate_postal_code(Some("750011")).is_valid());
}

#[test]
fn test_form_from_loose_json() {
    let form = RegistrationForm::from_json(&json!({
        "firstName": "Éloïse",
        "lastName": "D'Arc-Lefèvre",
        "email": 42,
        "city": null
    }));
    assert_eq!(form.first_name.as_deref(), Some("Éloïse"));
    assert_eq!(form.email, None);

    let result = validate_form(&form);
    assert!(result.error(Field::FirstName).is_none());
    assert!(result.error(Field::LastName).is_none());
    assert!(result.error(Field::Email).is_some());
    assert!(result.error(Field::City).is_some());
}

#[test]
fn test_result_serializes_with_field_names() {
    let mut form = common::valid_form();
    form.postal_code = None;
    let value = serde_json::to_value(validate_form(&form)).unwrap();
    assert_eq!(value["isValid"], false);
    assert!(value["errors"]["postalCode"].is_string());
}

#[test]
fn test_into_input_trims_values() {
    let mut form = common::valid_form();
    form.city = Some("  Paris ".to_string());
    form.email = Some(" Jean.Dupont@Example.com ".to_string());

    let today = chrono::Local::now().date_naive();
    let input = validate_into_input(&form, today).unwrap();
    assert_eq!(input.city, "Paris");
    assert_eq!(input.email, "Jean.Dupont@Example.com");
    assert_eq!(input.date_of_birth, common::years_ago(25));
}
