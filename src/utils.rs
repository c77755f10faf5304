//! Utility functions shared by the roster modules

use chrono::{DateTime, Utc};

/// Formats a DateTime the way registration timestamps are stored and shown
///
/// RFC 3339 with millisecond precision and a literal `Z` suffix, matching
/// what browsers produce for `Date.prototype.toISOString`.
///
/// Example output: "2025-06-14T10:03:54.374Z"
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Gets the current time formatted as a registration timestamp
pub fn current_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Normalizes an email for uniqueness comparison
///
/// Surrounding whitespace is insignificant and comparison is case-insensitive,
/// so two addresses collide when their normalized forms are equal.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Case-insensitive email equality
pub fn emails_match(a: &str, b: &str) -> bool {
    normalize_email(a) == normalize_email(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp() {
        let dt = Utc.with_ymd_and_hms(2025, 6, 14, 10, 3, 54).unwrap();
        assert_eq!(format_timestamp(dt), "2025-06-14T10:03:54.000Z");
    }

    #[test]
    fn test_current_timestamp_shape() {
        let now = current_timestamp();
        assert_eq!(now.len(), 24);
        assert!(now.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&now).is_ok());
    }

    #[test]
    fn test_emails_match_ignores_case_and_padding() {
        assert!(emails_match("Jean@X.com", "jean@x.com"));
        assert!(emails_match("  jean@x.com ", "JEAN@X.COM"));
        assert!(!emails_match("jean@x.com", "jeanne@x.com"));
    }
}
