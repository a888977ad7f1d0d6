//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TabulaConfig;
use crate::domain::errors::TabulaError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TabulaConfig
/// 4. Applies environment variable overrides (TABULA_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`TabulaError::Configuration`] if the file cannot be read or
/// parsed, a referenced variable is unset, an override does not parse, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use tabula::config::loader::load_config;
///
/// let config = load_config("tabula.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TabulaConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TabulaError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TabulaError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TabulaConfig = toml::from_str(&contents)
        .map_err(|e| TabulaError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        TabulaError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| TabulaError::Configuration(e.to_string()))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|name| name == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(TabulaError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using TABULA_* prefix
///
/// Environment variables follow the pattern: TABULA_<SECTION>_<KEY>
/// For example: TABULA_OUTPUT_DIRECTORY, TABULA_EXPORT_PARALLEL_PATIENTS
fn apply_env_overrides(config: &mut TabulaConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("TABULA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Input and output overrides
    if let Ok(val) = std::env::var("TABULA_INPUT_DIRECTORY") {
        config.input.directory = val;
    }
    if let Ok(val) = std::env::var("TABULA_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }
    if let Some(val) = parsed_var("TABULA_OUTPUT_TIMELINE_LAYOUT")? {
        config.output.timeline_layout = val;
    }
    if let Some(val) = parsed_var("TABULA_OUTPUT_PARSE_ADDRESS")? {
        config.output.parse_address = val;
    }

    // Export overrides
    if let Some(val) = parsed_var("TABULA_EXPORT_PARALLEL_PATIENTS")? {
        config.export.parallel_patients = val;
    }
    if let Some(val) = parsed_var("TABULA_EXPORT_FAIL_FAST")? {
        config.export.fail_fast = val;
    }
    if let Some(val) = parsed_var("TABULA_EXPORT_AS_OF")? {
        config.export.as_of = Some(val);
    }

    // Logging overrides
    if let Some(val) = parsed_var("TABULA_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("TABULA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("TABULA_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

/// Reads and parses an override, rejecting values that do not parse
fn parsed_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|e| {
            TabulaError::Configuration(format!("Invalid value '{}' for {}: {}", val, name, e))
        }),
        Err(_) => Ok(None),
    }
}
