//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::MeridianConfig;
use crate::domain::errors::MeridianError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MeridianConfig
/// 4. Applies environment variable overrides (MERIDIAN_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsing fails, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use meridian::config::load_config;
///
/// let config = load_config("meridian.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MeridianConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MeridianError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MeridianError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: MeridianConfig = toml::from_str(&contents)
        .map_err(|e| MeridianError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        MeridianError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MeridianError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the MERIDIAN_* prefix
///
/// Variables follow the pattern MERIDIAN_<SECTION>_<KEY>, for example
/// MERIDIAN_STORE_CHUNK_SIZE or MERIDIAN_LAKE_ROOT.
fn apply_env_overrides(config: &mut MeridianConfig) {
    if let Ok(val) = std::env::var("MERIDIAN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("MERIDIAN_STORE_CHUNK_SIZE") {
        if let Ok(size) = val.parse() {
            config.store.chunk_size = size;
        }
    }
    if let Ok(val) = std::env::var("MERIDIAN_STORE_TASK_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.store.task_timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("MERIDIAN_STORE_MAX_CONCURRENCY") {
        if let Ok(concurrency) = val.parse() {
            config.store.max_concurrency = concurrency;
        }
    }

    if let Ok(val) = std::env::var("MERIDIAN_LAKE_ROOT") {
        config.lake.root = val;
    }
    if let Ok(val) = std::env::var("MERIDIAN_LAKE_FIRE_AND_FORGET") {
        config.lake.fire_and_forget = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("MERIDIAN_LAKE_TASK_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.lake.task_timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("MERIDIAN_LAKE_MAX_CONCURRENCY") {
        if let Ok(concurrency) = val.parse() {
            config.lake.max_concurrency = concurrency;
        }
    }

    if let Ok(val) = std::env::var("MERIDIAN_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("MERIDIAN_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
