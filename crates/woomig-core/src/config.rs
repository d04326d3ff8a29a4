use std::path::PathBuf;

use crate::app_config::{AppConfig, WeightUnit};
use crate::ConfigError;

const MIN_OPTION_MAX_LEN: usize = 4;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_usize = |var: &str, default: &str, min: usize| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value < min {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be at least {min}, got {value}"),
            });
        }
        Ok(value)
    };

    let log_level = or_default("WOOMIG_LOG_LEVEL", "info");
    let tables_path = PathBuf::from(or_default("WOOMIG_TABLES_PATH", "./config/tables.yaml"));

    let child_delimiter = or_default("WOOMIG_CHILD_DELIMITER", "|~|");
    if child_delimiter.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "WOOMIG_CHILD_DELIMITER".to_string(),
            reason: "delimiter must be non-empty".to_string(),
        });
    }

    let weight_unit = or_default("WOOMIG_WEIGHT_UNIT", "lbs")
        .parse::<WeightUnit>()
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "WOOMIG_WEIGHT_UNIT".to_string(),
            reason,
        })?;

    let option_max_len = parse_usize("WOOMIG_OPTION_MAX_LEN", "40", MIN_OPTION_MAX_LEN)?;
    let handle_max_len = parse_usize("WOOMIG_HANDLE_MAX_LEN", "100", 1)?;

    Ok(AppConfig {
        log_level,
        tables_path,
        child_delimiter,
        weight_unit,
        option_max_len,
        handle_max_len,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
