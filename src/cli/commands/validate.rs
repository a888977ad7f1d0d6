//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Tabula configuration file.

use crate::config::load_config;
use crate::core::tables::Schema;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates; a loaded configuration is summarized along
    /// with the tables it would produce.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let schema = Schema::select(config.output.timeline_layout, config.output.parse_address);

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Input Directory: {}", config.input.directory);
        println!("  Output Directory: {}", config.output.directory);
        println!("  Layout: {}", schema.variant());
        println!("  Parse Address: {}", schema.decomposes_address());
        println!("  Parallel Patients: {}", config.export.parallel_patients);
        println!("  Fail Fast: {}", config.export.fail_fast);
        match config.export.as_of {
            Some(as_of) => println!("  As Of: {}", as_of.to_rfc3339()),
            None => println!("  As Of: start of export"),
        }
        println!("  Tables:");
        for table in schema.tables() {
            println!("    {} ({} columns)", table.file_name, table.column_count());
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[input]\ndirectory = \"records\"\n").unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_validate_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[input]\ndirectory = \"records\"\n[export]\nparallel_patients = 0\n")
            .unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
