//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output on stderr
//! - JSON log files with rotation
//! - Level selection from configuration or `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use tabula::logging::init_logging;
//! use tabula::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the completion of one patient's export
///
/// # Example
///
/// ```no_run
/// use tabula::log_patient_exported;
///
/// log_patient_exported!("b8f5c3a2", "b8f5c3a2.json");
/// ```
#[macro_export]
macro_rules! log_patient_exported {
    ($patient_id:expr, $source:expr) => {
        tracing::debug!(
            patient_id = %$patient_id,
            source = %$source,
            "Patient exported"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use tabula::log_error_with_context;
/// use tabula::domain::TabulaError;
///
/// let error = TabulaError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log export progress every `$every` finished patients
///
/// # Example
///
/// ```no_run
/// use tabula::log_export_progress;
///
/// log_export_progress!(100, 1000, 100);
/// ```
#[macro_export]
macro_rules! log_export_progress {
    ($finished:expr, $total:expr, $every:expr) => {
        if $every > 0 && $finished % $every == 0 {
            tracing::info!(
                finished = $finished,
                total = $total,
                progress_pct = ($finished as f64 / ($total as f64).max(1.0) * 100.0),
                "Export progress"
            );
        }
    };
}
