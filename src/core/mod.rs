//! Core business logic for Tabula.
//!
//! # Modules
//!
//! - [`export`] - Record traversal, export coordination and summary
//! - [`tables`] - Table layouts and the shared writer set
//! - [`transform`] - Row projection for the relational and timeline layouts
//!
//! # Export Workflow
//!
//! 1. **Select**: resolve `timeline_layout` and `parse_address` into a [`tables::Schema`]
//! 2. **Open**: create every table file and write its header
//! 3. **Walk**: for each patient, project the patient row, then every
//!    encounter and the entries it contains, in a fixed order
//! 4. **Flush**: flush all tables once the patient is done
//! 5. **Report**: collect the export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use tabula::config::load_config;
//! use tabula::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tabula.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = ExportCoordinator::new(config, shutdown_rx)?;
//!
//! let summary = coordinator.execute_export().await?;
//!
//! println!("Total: {}", summary.total_patients);
//! println!("Successful: {}", summary.successful_exports);
//! println!("Failed: {}", summary.failed_exports);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod tables;
pub mod transform;
