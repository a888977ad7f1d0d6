//! Output tables
//!
//! [`Schema`] resolves the configured layout into file names and headers;
//! [`TableWriterSet`] owns one append-only sink per table.

pub mod schema;
pub mod sink;

pub use schema::{Schema, TableKind, TableSpec};
pub use sink::{MemoryBuffer, TableSink, TableWriterSet};
