//! Export orchestration
//!
//! This module provides the core export logic for Tabula, including:
//! - Per-patient record traversal ([`RecordWalker`])
//! - Concurrent export coordination ([`ExportCoordinator`])
//! - Summary and reporting

pub mod coordinator;
pub mod summary;
pub mod walker;

pub use coordinator::ExportCoordinator;
pub use summary::{ExportError, ExportErrorType, ExportSummary};
pub use walker::{readings, RecordWalker, MAX_OBSERVATION_DEPTH};
