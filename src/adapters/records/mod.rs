//! Patient record sources
//!
//! This module defines the trait record sources implement to feed the
//! exporter, plus the bundled implementations.

pub mod json;
pub mod memory;

pub use json::JsonDirectorySource;
pub use memory::MemorySource;

use crate::domain::{Person, Result};

/// Source of serialized patient record graphs
///
/// Loading is synchronous; the export coordinator calls it from Tokio's
/// blocking pool alongside the traversal.
pub trait RecordSource: Send + Sync {
    /// Keys of every available record, in a stable order
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be enumerated.
    fn list(&self) -> Result<Vec<String>>;

    /// Loads the record stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or does not deserialize
    /// into a [`Person`].
    fn load(&self, key: &str) -> Result<Person>;
}
