//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "tabula.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Tabula configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point [input] directory at your patient record files");
                println!("  2. Choose the layout with [output] timeline_layout");
                println!("  3. Validate configuration: tabula validate-config");
                println!("  4. Run export: tabula export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate the sample configuration
    fn generate_config() -> String {
        r#"# Tabula Configuration File
# Exports patient record graphs to CSV tables

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[input]
# Directory holding one JSON record per patient (*.json)
directory = "records"

[output]
# Directory receiving the table files; existing tables are overwritten
directory = "output/csv"

# false: relational layout (10 tables)
# true:  timeline layout (12 tables, vital signs and social determinants split out)
timeline_layout = false

# Split street addresses into line 1, line 2, city, state, zip and country.
# Always on for the timeline layout.
parse_address = false

[export]
# Patients exported concurrently (1-256)
parallel_patients = 8

# Stop starting new patients after the first failure
fail_fast = false

# Export time (RFC 3339). Decides deceased status and ends open prescriptions.
# Defaults to the moment the export starts.
# as_of = "2024-01-01T00:00:00Z"

[logging]
local_enabled = true
local_path = "logs"

# Log rotation (daily, hourly, never)
local_rotation = "daily"
"#
        .to_string()
    }
}
