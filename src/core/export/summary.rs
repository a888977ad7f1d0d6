//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::core::tables::TableKind;
use crate::domain::{ExportErrorDetail, TabulaError};
use std::collections::BTreeMap;
use std::time::Duration;

/// Summary of an export operation
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Number of patient records offered by the source
    pub total_patients: usize,

    /// Number of patients whose traversal completed
    pub successful_exports: usize,

    /// Number of patients that could not be loaded or exported
    pub failed_exports: usize,

    /// Patients never started because of shutdown or fail-fast
    pub skipped_patients: usize,

    /// Data rows written per table
    pub rows_per_table: BTreeMap<TableKind, usize>,

    /// Whether the run stopped early on a shutdown signal
    pub interrupted: bool,

    /// Duration of the export
    pub duration: Duration,

    /// Errors encountered during export
    pub errors: Vec<ExportError>,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self {
            total_patients: 0,
            successful_exports: 0,
            failed_exports: 0,
            skipped_patients: 0,
            rows_per_table: BTreeMap::new(),
            interrupted: false,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Total data rows across all tables
    pub fn total_rows(&self) -> usize {
        self.rows_per_table.values().sum()
    }

    /// Check if the export was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.failed_exports == 0 && self.errors.is_empty() && !self.interrupted
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_patients == 0 {
            return 100.0;
        }
        (self.successful_exports as f64 / self.total_patients as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_patients = self.total_patients,
            successful = self.successful_exports,
            failed = self.failed_exports,
            skipped = self.skipped_patients,
            total_rows = self.total_rows(),
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        for (table, rows) in &self.rows_per_table {
            tracing::debug!(table = %table, rows = rows, "Table rows written");
        }

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    patient_id = error.detail.patient_id.as_deref().unwrap_or("-"),
                    source = error.detail.source.as_deref().unwrap_or("-"),
                    message = %error.detail.message,
                    "Export error"
                );
            }
        }
    }
}

impl Default for ExportSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorType {
    /// Record could not be read or deserialized
    Source,
    /// Record graph violates the generator contract
    MalformedRecord,
    /// Row and header disagree
    Schema,
    /// Writing to a table failed
    Storage,
    /// Configuration or startup error
    Configuration,
    /// Unknown error
    Unknown,
}

impl From<&TabulaError> for ExportErrorType {
    fn from(error: &TabulaError) -> Self {
        match error {
            TabulaError::MalformedRecord(_) => Self::MalformedRecord,
            TabulaError::SchemaMismatch { .. } => Self::Schema,
            TabulaError::Io(_) => Self::Storage,
            TabulaError::Serialization(_) => Self::Source,
            TabulaError::Configuration(_) | TabulaError::Initialization(_) => {
                Self::Configuration
            }
            _ => Self::Unknown,
        }
    }
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Message plus patient and source context
    pub detail: ExportErrorDetail,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            detail: ExportErrorDetail::new(message),
        }
    }

    /// Classify a crate error
    pub fn from_error(error: &TabulaError) -> Self {
        Self::new(ExportErrorType::from(error), error.to_string())
    }

    pub fn with_patient_id(mut self, patient_id: impl Into<String>) -> Self {
        self.detail = self.detail.with_patient_id(patient_id);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.detail = self.detail.with_source(source);
        self
    }
}
