//! External system integrations for Tabula.
//!
//! - [`records`] - Sources of patient record graphs
//!
//! # Design Pattern
//!
//! Sources sit behind the [`records::RecordSource`] trait so the coordinator
//! can be driven from a directory of JSON files or from memory in tests.
//!
//! ```rust,no_run
//! use tabula::adapters::records::{json::JsonDirectorySource, RecordSource};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = JsonDirectorySource::new("records");
//! for key in source.list()? {
//!     let person = source.load(&key)?;
//!     println!("{} has {} encounters", person.id, person.record.encounters.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod records;
