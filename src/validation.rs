//! Field-level validation helpers shared by the request payload types.
//! All checks run before any store access; failures surface as a 400 with a
//! `details` array of `{field, message}` violations.

use chrono::NaiveDate;

use crate::error::{ApiError, FieldViolation};

/// Trim a payload string, treating empty/whitespace-only values as absent
pub fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn char_len_in(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

pub fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return false;
    }
    parts[1].contains('.') && !parts[1].starts_with('.') && !parts[1].ends_with('.')
}

pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    digits >= 7
        && phone.chars().count() <= 20
        && phone.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
}

pub fn is_valid_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Path ids must be positive; non-numeric segments already fail Path
/// extraction upstream.
pub fn check_id(field: &'static str, id: i64) -> Result<(), ApiError> {
    if id < 1 {
        return Err(ApiError::validation(vec![FieldViolation::new(
            field,
            format!("Invalid {}", field.replace('_', " ")),
        )]));
    }
    Ok(())
}
