//! Domain models and types for Tabula.
//!
//! This module contains the patient record graph consumed by the exporter,
//! identifier types, and the error hierarchy.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Record graph** ([`Person`], [`Encounter`], [`Entry`], [`Observation`], ...)
//! - **Identifiers** ([`PatientId`], [`GeneratedId`])
//! - **Error types** ([`TabulaError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, TabulaError>`]:
//!
//! ```rust
//! use tabula::domain::{Coded, Entry, Result};
//!
//! fn example(entry: &Entry) -> Result<String> {
//!     // An entry without codes breaks the generator contract
//!     let code = entry.primary_code()?;
//!     Ok(code.code.clone())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{ExportErrorDetail, TabulaError};
pub use ids::{GeneratedId, PatientId};
pub use record::{
    attributes, CarePlan, Code, Coded, Encounter, Entry, HealthRecord, ImagingInstance,
    ImagingSeries, ImagingStudy, Medication, Observation, ObservationValue, Person, Procedure,
};
pub use result::Result;
