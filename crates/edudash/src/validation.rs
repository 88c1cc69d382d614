//! Field rules for student records.
//!
//! These mirror the rules the dashboard form applies. The service only runs
//! them when `validation.enforce` is set in the configuration.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::student::{StudentRecord, CLASS_OPTIONS};

/// Minimum length of first and last names, in characters.
pub const NAME_MIN_LEN: usize = 2;

/// Maximum length of first and last names, in characters.
pub const NAME_MAX_LEN: usize = 50;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^[+]?[0-9\s\-()]{7,}$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern is valid"))
}

/// Check a record against the form rules.
///
/// Returns every violated rule, not just the first.
///
/// # Errors
///
/// Returns [`Error::Validation`] listing each problem found.
pub fn validate_record(record: &StudentRecord) -> Result<()> {
    let mut problems = Vec::new();

    check_name("firstName", &record.first_name, &mut problems);
    check_name("lastName", &record.last_name, &mut problems);

    if record.email.trim().is_empty() {
        problems.push("email is required".to_string());
    } else if !email_regex().is_match(&record.email) {
        problems.push(format!("email '{}' is not a valid address", record.email));
    }

    check_phone("phone", record.phone.as_deref(), &mut problems);
    check_phone("parentPhone", record.parent_phone.as_deref(), &mut problems);

    if record.class.trim().is_empty() {
        problems.push("class is required".to_string());
    } else if !CLASS_OPTIONS.contains(&record.class.as_str()) {
        problems.push(format!("class '{}' is not a known class", record.class));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation { problems })
    }
}

// Blank means missing; the length bounds count the value as stored.
fn check_name(field: &str, value: &str, problems: &mut Vec<String>) {
    if value.trim().is_empty() {
        problems.push(format!("{field} is required"));
    } else if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&value.chars().count()) {
        problems.push(format!(
            "{field} must be {NAME_MIN_LEN}-{NAME_MAX_LEN} characters"
        ));
    }
}

// Optional: empty strings count as absent.
fn check_phone(field: &str, value: Option<&str>, problems: &mut Vec<String>) {
    match value.map(str::trim) {
        Some(phone) if !phone.is_empty() && !phone_regex().is_match(phone) => {
            problems.push(format!("{field} '{phone}' is not a valid phone number"));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::StudentDraft;
    use chrono::Utc;

    fn record(first: &str, last: &str, email: &str, class: &str) -> StudentRecord {
        StudentRecord::from_draft(
            StudentDraft {
                first_name: Some(first.to_string()),
                last_name: Some(last.to_string()),
                email: Some(email.to_string()),
                class: Some(class.to_string()),
                ..StudentDraft::default()
            },
            Utc::now(),
        )
    }

    fn problems(record: &StudentRecord) -> Vec<String> {
        match validate_record(record) {
            Err(Error::Validation { problems }) => problems,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_record_passes() {
        let r = record("Jo", "Lee", "jo@x.com", "Class 3");
        assert!(validate_record(&r).is_ok());
    }

    #[test]
    fn test_seed_records_pass() {
        for r in crate::student::seed_records(Utc::now()) {
            assert!(validate_record(&r).is_ok(), "seed {} invalid", r.full_name());
        }
    }

    #[test]
    fn test_short_name_rejected() {
        let r = record("J", "Lee", "jo@x.com", "Class 3");
        let found = problems(&r);
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("firstName"));
    }

    #[test]
    fn test_long_name_rejected() {
        let r = record("Jo", &"x".repeat(51), "jo@x.com", "Class 3");
        assert!(problems(&r)[0].contains("lastName"));
    }

    #[test]
    fn test_name_length_counts_stored_value() {
        let padded = record(" J", "Lee", "jo@x.com", "Class 3");
        assert!(validate_record(&padded).is_ok());

        let blank = record("   ", "Lee", "jo@x.com", "Class 3");
        assert_eq!(problems(&blank), vec!["firstName is required"]);

        let long = record("Jo", &format!("{} ", "x".repeat(50)), "jo@x.com", "Class 3");
        assert!(problems(&long)[0].contains("lastName must be 2-50"));
    }

    #[test]
    fn test_bad_email_rejected() {
        let r = record("Jo", "Lee", "jo.x.com", "Class 3");
        assert!(problems(&r)[0].contains("email"));
    }

    #[test]
    fn test_unknown_class_rejected() {
        let r = record("Jo", "Lee", "jo@x.com", "Class 11");
        assert!(problems(&r)[0].contains("Class 11"));
    }

    #[test]
    fn test_collects_every_problem() {
        let r = record("", "", "", "");
        assert_eq!(problems(&r).len(), 4);
    }

    #[test]
    fn test_optional_phone() {
        let mut r = record("Jo", "Lee", "jo@x.com", "Class 3");
        r.phone = Some(String::new());
        assert!(validate_record(&r).is_ok());

        r.phone = Some("+1 (555) 010-0100".to_string());
        assert!(validate_record(&r).is_ok());

        r.phone = Some("+44 20 7946 0958 ext 1234".to_string());
        assert!(problems(&r)[0].contains("phone"));

        r.phone = Some("0044 (0) 20 7946 0958 1234 5678".to_string());
        assert!(validate_record(&r).is_ok());

        r.phone = Some("555-01".to_string());
        assert!(problems(&r)[0].contains("phone"));

        r.phone = None;
        r.parent_phone = Some("call me".to_string());
        assert!(problems(&r)[0].contains("parentPhone"));
    }
}
