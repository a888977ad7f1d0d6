// Tabula - Patient Record to CSV Table Exporter
// Copyright (c) 2025 Tabula Contributors
// Licensed under the MIT License

//! # Tabula - Patient Record to CSV Table Exporter
//!
//! Tabula flattens simulated patient health records into comma-delimited
//! tables ready for bulk import into a relational database.
//!
//! ## Overview
//!
//! Each patient's record graph (demographics, encounters and the conditions,
//! allergies, observations, procedures, medications, immunizations, care plans
//! and imaging studies inside them) is walked once, and every entity becomes
//! one row in its table. Two layouts are supported:
//!
//! - **Relational** (default): ten tables keyed by patient and encounter IDs
//! - **Timeline**: twelve tables with MRN and jittered timestamp leading each
//!   row, and vital signs and social determinants split out of observations
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Table layouts, row projection, traversal and coordination
//! - [`adapters`] - Patient record sources
//! - [`domain`] - Record graph, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tabula::core::export::RecordWalker;
//! use tabula::core::tables::{Schema, TableWriterSet};
//!
//! # fn example(person: &tabula::domain::Person) -> Result<(), Box<dyn std::error::Error>> {
//! // Relational layout with decomposed addresses
//! let tables = TableWriterSet::create("output/csv", Schema::select(false, true))?;
//! let walker = RecordWalker::new(Arc::new(tables));
//!
//! let as_of = chrono::Utc::now().timestamp_millis();
//! let patient_id = walker.export(person, as_of)?;
//! println!("Exported {patient_id}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! A [`core::tables::TableWriterSet`] is shared by reference between
//! concurrent patient exports. Every table has its own lock, so rows from
//! different patients never interleave within a line, but a patient's rows
//! may interleave with another patient's across lines.
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`], carrying a [`domain::TabulaError`]:
//!
//! ```rust,no_run
//! use tabula::domain::TabulaError;
//!
//! fn example() -> Result<(), TabulaError> {
//!     let config = tabula::config::load_config("tabula.toml")?;
//!     println!("{}", config.output.directory);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
