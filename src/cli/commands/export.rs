//! Export command implementation
//!
//! This module implements the `export` command, which turns a directory of
//! patient records into CSV tables.

use crate::config::{load_config, TabulaConfig};
use crate::core::export::{ExportCoordinator, ExportSummary};
use crate::core::tables::Schema;
use clap::Args;
use tokio::sync::watch;

/// Number of individual errors printed in the summary
const MAX_PRINTED_ERRORS: usize = 10;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Override the input directory of patient records
    #[arg(long)]
    pub input: Option<String>,

    /// Override the output directory for tables
    #[arg(long)]
    pub output: Option<String>,

    /// Write the timeline layout instead of the relational one
    #[arg(long)]
    pub timeline: bool,

    /// Split street addresses in the patients table
    #[arg(long)]
    pub parse_address: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        if !self.yes && !Self::confirm(&config)? {
            println!("Export cancelled.");
            return Ok(0);
        }

        tracing::info!("Creating export coordinator");
        let coordinator = match ExportCoordinator::new(config, shutdown_signal) {
            Ok(c) => c,
            Err(e) => {
                crate::log_error_with_context!(e, "Failed to create export coordinator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        println!("🚀 Starting export...");
        println!();

        let summary = match coordinator.execute_export().await {
            Ok(s) => s,
            Err(e) => {
                crate::log_error_with_context!(e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        Self::print_summary(&summary);
        Ok(exit_code(&summary))
    }

    /// Apply command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut TabulaConfig) {
        if let Some(input) = &self.input {
            tracing::info!(input = %input, "Overriding input directory from CLI");
            config.input.directory = input.clone();
        }
        if let Some(output) = &self.output {
            tracing::info!(output = %output, "Overriding output directory from CLI");
            config.output.directory = output.clone();
        }
        if self.timeline {
            tracing::info!("Enabling timeline layout from CLI");
            config.output.timeline_layout = true;
        }
        if self.parse_address {
            tracing::info!("Enabling address parsing from CLI");
            config.output.parse_address = true;
        }
    }

    fn confirm(config: &TabulaConfig) -> anyhow::Result<bool> {
        use std::io::{self, Write};

        let schema = Schema::select(config.output.timeline_layout, config.output.parse_address);
        println!("Export Configuration:");
        println!("  Input: {}", config.input.directory);
        println!("  Output: {}", config.output.directory);
        println!("  Layout: {}", schema.variant());
        println!("  Tables: {}", schema.tables().len());
        println!("  Parse address: {}", schema.decomposes_address());
        println!("  Parallel patients: {}", config.export.parallel_patients);
        println!();
        println!("Existing table files in the output directory will be overwritten.");
        print!("Proceed with export? [y/N]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().eq_ignore_ascii_case("y"))
    }

    fn print_summary(summary: &ExportSummary) {
        println!();
        println!("📊 Export Summary:");
        println!("  Total Patients: {}", summary.total_patients);
        println!("  Successful: {}", summary.successful_exports);
        println!("  Failed: {}", summary.failed_exports);
        println!("  Skipped: {}", summary.skipped_patients);
        println!("  Rows Written: {}", summary.total_rows());
        for (table, rows) in &summary.rows_per_table {
            println!("    {table}: {rows}");
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!("  Success Rate: {:.2}%", summary.success_rate());
        println!();

        if !summary.errors.is_empty() {
            println!("⚠️  Errors encountered:");
            for error in summary.errors.iter().take(MAX_PRINTED_ERRORS) {
                println!("  - {:?}: {}", error.error_type, error.detail.message);
                if let Some(source) = &error.detail.source {
                    println!("    Source: {source}");
                }
            }
            if summary.errors.len() > MAX_PRINTED_ERRORS {
                println!(
                    "  ... and {} more errors",
                    summary.errors.len() - MAX_PRINTED_ERRORS
                );
            }
            println!();
        }

        if summary.interrupted {
            println!("⚠️  Export interrupted. Tables hold every patient that finished.");
        } else if summary.is_successful() {
            println!("✅ Export completed successfully!");
        } else {
            println!("⚠️  Export completed with failures");
        }
    }
}

/// Process exit code for a finished export
pub fn exit_code(summary: &ExportSummary) -> i32 {
    if summary.interrupted {
        130 // SIGINT exit code (standard Unix convention)
    } else if summary.failed_exports > 0 || !summary.errors.is_empty() {
        1 // Partial success
    } else {
        0
    }
}
