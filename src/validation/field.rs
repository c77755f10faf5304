use chrono::{DateTime, Datelike, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub const MIN_TEXT_LEN: usize = 2;
pub const MAX_TEXT_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MIN_AGE_YEARS: i32 = 18;

pub const NAME_REQUIRED: &str = "Le nom/prénom est requis";
pub const NAME_TOO_SHORT: &str = "Le nom/prénom doit contenir au moins 2 caractères";
pub const NAME_TOO_LONG: &str = "Le nom/prénom ne doit pas dépasser 50 caractères";
pub const NAME_INVALID: &str =
    "Le nom/prénom ne peut contenir que des lettres, espaces et tirets";

pub const EMAIL_REQUIRED: &str = "L'email est requis";
pub const EMAIL_INVALID: &str = "L'email est invalide";
pub const EMAIL_TOO_LONG: &str = "L'email ne doit pas dépasser 100 caractères";

pub const BIRTH_DATE_REQUIRED: &str = "La date de naissance est requise";
pub const BIRTH_DATE_INVALID: &str = "La date est invalide";
pub const BIRTH_DATE_UNDERAGE: &str = "Vous devez avoir au moins 18 ans";

pub const POSTAL_CODE_REQUIRED: &str = "Le code postal est requis";
pub const POSTAL_CODE_INVALID: &str = "Le code postal doit contenir 5 chiffres";

pub const CITY_REQUIRED: &str = "La ville est requise";
pub const CITY_TOO_SHORT: &str = "La ville doit contenir au moins 2 caractères";
pub const CITY_TOO_LONG: &str = "La ville ne doit pas dépasser 50 caractères";
pub const CITY_INVALID: &str = "La ville ne peut contenir que des lettres, espaces et tirets";

lazy_static! {
    /// Latin letters including the Latin-1 accented range, spaces, hyphens, apostrophes
    static ref NAME_PATTERN: Regex = Regex::new(r"^[a-zA-ZÀ-ÿ\s\-']+$").unwrap();
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref POSTAL_CODE_PATTERN: Regex = Regex::new(r"^[0-9]{5}$").unwrap();
}

/// Verdict of a single field validator
///
/// `message` is empty when `valid` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldVerdict {
    pub valid: bool,
    pub message: String,
}

impl FieldVerdict {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn fail(message: &str) -> Self {
        Self {
            valid: false,
            message: message.to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Messages for the shared "letters, spaces, hyphens, apostrophes" rule
struct TextMessages {
    required: &'static str,
    too_short: &'static str,
    too_long: &'static str,
    invalid: &'static str,
}

const NAME_MESSAGES: TextMessages = TextMessages {
    required: NAME_REQUIRED,
    too_short: NAME_TOO_SHORT,
    too_long: NAME_TOO_LONG,
    invalid: NAME_INVALID,
};

const CITY_MESSAGES: TextMessages = TextMessages {
    required: CITY_REQUIRED,
    too_short: CITY_TOO_SHORT,
    too_long: CITY_TOO_LONG,
    invalid: CITY_INVALID,
};

/// Absent and empty values are both "required"
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn validate_text(value: Option<&str>, messages: &TextMessages) -> FieldVerdict {
    let Some(raw) = present(value) else {
        return FieldVerdict::fail(messages.required);
    };

    let trimmed = raw.trim();
    let len = trimmed.chars().count();

    if len < MIN_TEXT_LEN {
        return FieldVerdict::fail(messages.too_short);
    }
    if len > MAX_TEXT_LEN {
        return FieldVerdict::fail(messages.too_long);
    }
    if !NAME_PATTERN.is_match(trimmed) {
        return FieldVerdict::fail(messages.invalid);
    }

    FieldVerdict::ok()
}

/// Validates a first or last name
pub fn validate_name(value: Option<&str>) -> FieldVerdict {
    validate_text(value, &NAME_MESSAGES)
}

/// Validates a city name (same character class as names)
pub fn validate_city(value: Option<&str>) -> FieldVerdict {
    validate_text(value, &CITY_MESSAGES)
}

/// Validates an email address: `local@domain.tld` shape, at most 100 characters
pub fn validate_email(value: Option<&str>) -> FieldVerdict {
    let Some(raw) = present(value) else {
        return FieldVerdict::fail(EMAIL_REQUIRED);
    };

    let trimmed = raw.trim();

    if !EMAIL_PATTERN.is_match(trimmed) {
        return FieldVerdict::fail(EMAIL_INVALID);
    }
    if trimmed.chars().count() > MAX_EMAIL_LEN {
        return FieldVerdict::fail(EMAIL_TOO_LONG);
    }

    FieldVerdict::ok()
}

/// Validates a French postal code: exactly 5 ASCII digits
pub fn validate_postal_code(value: Option<&str>) -> FieldVerdict {
    let Some(raw) = present(value) else {
        return FieldVerdict::fail(POSTAL_CODE_REQUIRED);
    };

    if !POSTAL_CODE_PATTERN.is_match(raw.trim()) {
        return FieldVerdict::fail(POSTAL_CODE_INVALID);
    }

    FieldVerdict::ok()
}

/// Parses a birth date given as `YYYY-MM-DD` or as an RFC 3339 timestamp
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Full elapsed years between `birth` and `today`
///
/// Negative for birth dates in the future.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if today.month() < birth.month()
        || (today.month() == birth.month() && today.day() < birth.day())
    {
        age -= 1;
    }
    age
}

/// Validates a birth date against the local calendar date
pub fn validate_date_of_birth(value: Option<&str>) -> FieldVerdict {
    validate_date_of_birth_at(value, Local::now().date_naive())
}

/// Validates a birth date as of `today`: parseable and at least 18 years old
pub fn validate_date_of_birth_at(value: Option<&str>, today: NaiveDate) -> FieldVerdict {
    let Some(raw) = present(value) else {
        return FieldVerdict::fail(BIRTH_DATE_REQUIRED);
    };

    let Some(birth) = parse_birth_date(raw) else {
        return FieldVerdict::fail(BIRTH_DATE_INVALID);
    };

    if age_on(birth, today) < MIN_AGE_YEARS {
        return FieldVerdict::fail(BIRTH_DATE_UNDERAGE);
    }

    FieldVerdict::ok()
}
