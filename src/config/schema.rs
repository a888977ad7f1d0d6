//! Configuration schema types
//!
//! This module defines the configuration structure for Tabula.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Main Tabula configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabulaConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Where patient records are read from
    pub input: InputConfig,

    /// Where tables are written and in which layout
    #[serde(default)]
    pub output: OutputConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TabulaConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.input.validate()?;
        self.output.validate()?;
        self.export.validate()?;
        self.logging.validate()?;

        if self.input.directory == self.output.directory {
            return Err(
                "input.directory and output.directory must be different directories".to_string(),
            );
        }
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Record input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding one `*.json` record per patient
    pub directory: String,
}

impl InputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("input.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Table output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the table files; created if missing
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Emit the timeline layout instead of the relational one
    #[serde(default)]
    pub timeline_layout: bool,

    /// Split street addresses in the relational patients table
    ///
    /// The timeline layout always splits addresses.
    #[serde(default)]
    pub parse_address: bool,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("output.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            timeline_layout: false,
            parse_address: false,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Maximum number of patients exported concurrently
    #[serde(default = "default_parallel_patients")]
    pub parallel_patients: usize,

    /// Stop scheduling patients after the first failure
    #[serde(default)]
    pub fail_fast: bool,

    /// Export time (RFC 3339); decides deceased status and ends open
    /// prescriptions. Defaults to the moment the export starts.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.parallel_patients == 0 || self.parallel_patients > 256 {
            return Err(format!(
                "export.parallel_patients must be between 1 and 256, got {}",
                self.parallel_patients
            ));
        }
        Ok(())
    }

    /// Configured export time, or now, as epoch milliseconds
    pub fn as_of_millis(&self) -> i64 {
        self.as_of.unwrap_or_else(Utc::now).timestamp_millis()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            parallel_patients: default_parallel_patients(),
            fail_fast: false,
            as_of: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_output_directory() -> String {
    "output/csv".to_string()
}

fn default_parallel_patients() -> usize {
    8
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> TabulaConfig {
        TabulaConfig {
            application: ApplicationConfig::default(),
            input: InputConfig {
                directory: "records".to_string(),
            },
            output: OutputConfig::default(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig {
            log_level: "info".to_string(),
        };

        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_config_validation() {
        let mut config = ExportConfig::default();
        assert!(config.validate().is_ok());

        config.parallel_patients = 0;
        assert!(config.validate().is_err());

        config.parallel_patients = 257;
        assert!(config.validate().is_err());

        config.parallel_patients = 256;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_as_of_millis() {
        let mut config = ExportConfig::default();
        let before = Utc::now().timestamp_millis();
        assert!(config.as_of_millis() >= before);

        config.as_of = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(config.as_of_millis(), 1_577_836_800_000);
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "never".to_string();
        config.local_path = String::new();
        assert!(config.validate().is_err());

        config.local_enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_input_and_output_must_differ() {
        let mut config = config();
        assert!(config.validate().is_ok());

        config.output.directory = "records".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("must be different"));
    }

    #[test]
    fn test_empty_input_directory() {
        let mut config = config();
        config.input.directory = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_values() {
        let config: TabulaConfig = toml::from_str("[input]\ndirectory = \"in\"\n").unwrap();

        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.output.directory, "output/csv");
        assert!(!config.output.timeline_layout);
        assert!(!config.output.parse_address);
        assert_eq!(config.export.parallel_patients, 8);
        assert!(!config.export.fail_fast);
        assert!(config.export.as_of.is_none());
        assert!(config.logging.local_enabled);
        assert_eq!(config.logging.local_rotation, "daily");
    }

    #[test]
    fn test_as_of_parses_rfc3339() {
        let config: TabulaConfig = toml::from_str(
            "[input]\ndirectory = \"in\"\n[export]\nas_of = \"2021-06-30T12:00:00Z\"\n",
        )
        .unwrap();
        assert_eq!(
            config.export.as_of,
            Some(Utc.with_ymd_and_hms(2021, 6, 30, 12, 0, 0).unwrap())
        );
    }
}
