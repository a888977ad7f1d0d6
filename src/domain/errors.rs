//! Domain error types
//!
//! This module defines the error hierarchy for Tabula.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Tabula error type
///
/// This is the primary error type used throughout the application.
/// It separates fatal startup failures from per-patient failures so the
/// coordinator can decide whether to skip a patient or abort the run.
#[derive(Debug, Error)]
pub enum TabulaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Output directory or table file could not be prepared
    ///
    /// Raised before any patient is exported. The whole run cannot proceed
    /// without every table, so this is never recovered per table.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Input record graph violates the generator contract
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A projected row does not line up with its table header
    #[error("Schema mismatch in {table}: expected {expected} fields, got {actual}")]
    SchemaMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl TabulaError {
    /// Shorthand for a malformed-record error
    pub fn malformed(message: impl Into<String>) -> Self {
        TabulaError::MalformedRecord(message.into())
    }

    /// Whether this error means the table set itself is unusable
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TabulaError::Initialization(_) | TabulaError::Configuration(_)
        )
    }
}

/// Per-patient error details
///
/// Provides additional context for export failures
#[derive(Debug, Clone)]
pub struct ExportErrorDetail {
    /// Patient ID associated with the error, when it was known
    pub patient_id: Option<String>,

    /// Record source key (usually a file name)
    pub source: Option<String>,

    /// Error message
    pub message: String,
}

impl ExportErrorDetail {
    /// Creates a new export error detail
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            patient_id: None,
            source: None,
            message: message.into(),
        }
    }

    /// Sets the patient ID
    pub fn with_patient_id(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    /// Sets the record source key
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for TabulaError {
    fn from(err: std::io::Error) -> Self {
        TabulaError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TabulaError {
    fn from(err: serde_json::Error) -> Self {
        TabulaError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TabulaError {
    fn from(err: toml::de::Error) -> Self {
        TabulaError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabula_error_display() {
        let err = TabulaError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = TabulaError::SchemaMismatch {
            table: "conditions.csv".to_string(),
            expected: 6,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "Schema mismatch in conditions.csv: expected 6 fields, got 7"
        );
    }

    #[test]
    fn test_fatal_classification() {
        assert!(TabulaError::Initialization("no dir".to_string()).is_fatal());
        assert!(!TabulaError::Io("disk full".to_string()).is_fatal());
        assert!(!TabulaError::malformed("no codes").is_fatal());
    }

    #[test]
    fn test_export_error_detail_builder() {
        let detail = ExportErrorDetail::new("Test error")
            .with_patient_id("patient-123")
            .with_source("patient-123.json");

        assert_eq!(detail.patient_id, Some("patient-123".to_string()));
        assert_eq!(detail.source, Some("patient-123.json".to_string()));
        assert_eq!(detail.message, "Test error");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: TabulaError = io_err.into();
        assert!(matches!(err, TabulaError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: TabulaError = json_err.into();
        assert!(matches!(err, TabulaError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: TabulaError = toml_err.into();
        assert!(matches!(err, TabulaError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_tabula_error_implements_std_error() {
        let err = TabulaError::malformed("Test error");
        let _: &dyn std::error::Error = &err;
    }
}
