//! Configuration management for Tabula.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Tabula uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TABULA_<SECTION>_<KEY>` overrides applied after parsing
//! - Default values for optional settings
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tabula::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tabula.toml")?;
//!
//! println!("Records: {}", config.input.directory);
//! println!("Tables: {}", config.output.directory);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`InputConfig`] - Directory of patient record files
//! - [`OutputConfig`] - Table directory, layout and address handling
//! - [`ExportConfig`] - Concurrency, fail-fast and export time
//! - [`LoggingConfig`] - Local log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [input]
//! directory = "${TABULA_RECORDS}"
//!
//! [output]
//! directory = "output/csv"
//! timeline_layout = false
//! parse_address = true
//!
//! [export]
//! parallel_patients = 8
//! fail_fast = false
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ExportConfig, InputConfig, LoggingConfig, OutputConfig, TabulaConfig,
};
