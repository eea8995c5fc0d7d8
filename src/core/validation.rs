//! Field-level validation run before every write.
//!
//! Each check names the field it guards so the caller can report
//! `Error::Validation { field, .. }` next to the right input.

use crate::core::money::{Money, Percent};
use crate::errors::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::unwrap_used)]
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?1?\d{9,15}$").unwrap());
#[allow(clippy::unwrap_used)]
static GSTIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z]{1}[1-9A-Z]{1}Z[0-9A-Z]{1}$").unwrap()
});
#[allow(clippy::unwrap_used)]
static PAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]{1}$").unwrap());
#[allow(clippy::unwrap_used)]
static IFSC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").unwrap());
#[allow(clippy::unwrap_used)]
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
#[allow(clippy::unwrap_used)]
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

/// Rejects empty or whitespace-only text.
pub fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "This field cannot be blank"));
    }
    Ok(())
}

/// Phone numbers: 9-15 digits, optional `+` and leading `1`.
pub fn phone(field: &'static str, value: &str) -> Result<()> {
    if !PHONE.is_match(value) {
        return Err(Error::validation(field, "Enter a valid phone number"));
    }
    Ok(())
}

/// Email addresses.
pub fn email(field: &'static str, value: &str) -> Result<()> {
    if !EMAIL.is_match(value) {
        return Err(Error::validation(field, "Enter a valid email address"));
    }
    Ok(())
}

/// `http://` or `https://` URLs.
pub fn url(field: &'static str, value: &str) -> Result<()> {
    if !URL.is_match(value) {
        return Err(Error::validation(field, "Enter a valid URL"));
    }
    Ok(())
}

/// 15-character GST identification number.
pub fn gstin(field: &'static str, value: &str) -> Result<()> {
    if !GSTIN.is_match(value) {
        return Err(Error::validation(field, "Enter valid GSTIN format"));
    }
    Ok(())
}

/// 10-character permanent account number.
pub fn pan(field: &'static str, value: &str) -> Result<()> {
    if !PAN.is_match(value) {
        return Err(Error::validation(field, "Enter valid PAN format"));
    }
    Ok(())
}

/// 11-character bank IFSC code.
pub fn ifsc(field: &'static str, value: &str) -> Result<()> {
    if !IFSC.is_match(value) {
        return Err(Error::validation(field, "Enter valid IFSC code"));
    }
    Ok(())
}

/// Runs `check` only when an optional field carries a non-empty value.
pub fn optional(
    field: &'static str,
    value: Option<&str>,
    check: fn(&'static str, &str) -> Result<()>,
) -> Result<()> {
    match value {
        Some(v) if !v.is_empty() => check(field, v),
        _ => Ok(()),
    }
}

/// Amount must be at least `min`.
pub fn min_amount(field: &'static str, value: Money, min: Money) -> Result<()> {
    if value < min {
        return Err(Error::validation(
            field,
            format!("Ensure this value is greater than or equal to {}", String::from(min)),
        ));
    }
    Ok(())
}

/// Rate must lie within `min..=max`.
pub fn percent_range(field: &'static str, value: Percent, min: Percent, max: Percent) -> Result<()> {
    if value < min || value > max {
        return Err(Error::validation(
            field,
            format!("Ensure this value is between {min} and {max}"),
        ));
    }
    Ok(())
}

/// Integer must lie within `min..=max`.
pub fn int_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(Error::validation(
            field,
            format!("Ensure this value is between {min} and {max}"),
        ));
    }
    Ok(())
}

/// Optional measurement must be zero or more.
pub fn non_negative(field: &'static str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(Error::validation(
            field,
            "Ensure this value is greater than or equal to 0",
        )),
        _ => Ok(()),
    }
}
