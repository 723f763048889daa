use std::time::Duration;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_MAX_INPUT_BYTES: u64 = 16 * 1024 * 1024;
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("GEOCODE_ENV", "development"))?;
    let log_level = or_default("GEOCODE_LOG_LEVEL", "info");

    let timeout_ms = parse_u64("GEOCODE_PARSE_TIMEOUT_MS", "0")?;
    let parse_timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));

    let max_input_bytes = parse_u64(
        "GEOCODE_MAX_INPUT_BYTES",
        &DEFAULT_MAX_INPUT_BYTES.to_string(),
    )?;
    if max_input_bytes == 0 {
        return Err(invalid("GEOCODE_MAX_INPUT_BYTES", "must be greater than zero".to_string()));
    }

    let worker_threads = parse_usize(
        "GEOCODE_WORKER_THREADS",
        &DEFAULT_WORKER_THREADS.to_string(),
    )?;
    if worker_threads == 0 {
        return Err(invalid("GEOCODE_WORKER_THREADS", "must be greater than zero".to_string()));
    }

    Ok(AppConfig {
        env,
        log_level,
        parse_timeout,
        max_input_bytes,
        worker_threads,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GEOCODE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
