//! Field sanitizing and value rendering shared by both projectors

use crate::domain::{Code, ObservationValue};

/// Platform line separator terminating every header and row
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Field delimiter used by every table
pub const DELIMITER: char = ',';

/// Vital-sign LOINC codes routed to the vitals table
///
/// Height, weight, BMI, diastolic and systolic blood pressure, body temperature.
pub const VITAL_SIGN_CODES: [&str; 6] = [
    "8302-2", "29463-7", "39156-5", "8462-4", "8480-6", "8331-1",
];

/// Social-determinant LOINC codes routed to the social-determinant table
pub const SOCIAL_DETERMINANT_CODES: [&str; 8] = [
    "69453-9", "76690-7", "55277-8", "28245-9", "71802-3", "63513-6", "46240-8", "72106-8",
];

/// Replaces line breaks and delimiters with a single space, then trims
///
/// An absent input yields the empty string.
///
/// # Examples
///
/// ```
/// use tabula::core::transform::fields::clean;
///
/// assert_eq!(clean("Acute bronchitis, (disorder)\n"), "Acute bronchitis  (disorder)");
/// assert_eq!(clean(None), "");
/// ```
pub fn clean<'a>(text: impl Into<Option<&'a str>>) -> String {
    match text.into() {
        Some(text) => text
            .replace("\r\n", " ")
            .replace(['\r', '\n', DELIMITER], " ")
            .trim()
            .to_string(),
        None => String::new(),
    }
}

pub fn is_vital_sign(code: &str) -> bool {
    VITAL_SIGN_CODES.contains(&code)
}

pub fn is_social_determinant(code: &str) -> bool {
    SOCIAL_DETERMINANT_CODES.contains(&code)
}

/// Renders an observation value for the VALUE column
pub fn observation_value(value: &ObservationValue) -> String {
    match value {
        ObservationValue::Numeric(number) => format!("{number:.1}"),
        ObservationValue::Text(text) => clean(text.as_str()),
        ObservationValue::Coded(code) => clean(code.display.as_str()),
    }
}

/// Renders the TYPE column of the relational observation table
pub fn observation_type(value: &ObservationValue) -> &'static str {
    match value {
        ObservationValue::Numeric(_) => "numeric",
        ObservationValue::Text(_) | ObservationValue::Coded(_) => "text",
    }
}

/// Code and sanitized description of the first reason, or two empty fields
pub fn reason_fields(reason: Option<&Code>) -> [String; 2] {
    match reason {
        Some(reason) => [reason.code.clone(), clean(reason.display.as_str())],
        None => [String::new(), String::new()],
    }
}
