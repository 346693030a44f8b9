use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

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

/// Build application configuration using the provided env-var lookup function,
/// so tests can drive it from a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;
    use std::str::FromStr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    fn parse_num<T>(var: &str, raw: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    }

    let env = parse_environment(&or_default("ADINTEL_ENV", "development"))?;
    let log_level = or_default("ADINTEL_LOG_LEVEL", "info");
    let run_config_path = PathBuf::from(or_default("ADINTEL_RUN_CONFIG_PATH", "./config/run.yaml"));
    let output_dir = PathBuf::from(or_default("ADINTEL_OUTPUT_DIR", "./output"));
    let database_url = lookup("DATABASE_URL").ok().filter(|s| !s.is_empty());

    let db_max_connections = parse_num(
        "ADINTEL_DB_MAX_CONNECTIONS",
        &or_default("ADINTEL_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections = parse_num(
        "ADINTEL_DB_MIN_CONNECTIONS",
        &or_default("ADINTEL_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs = parse_num(
        "ADINTEL_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("ADINTEL_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;
    let provider_max_retries = parse_num(
        "ADINTEL_PROVIDER_MAX_RETRIES",
        &or_default("ADINTEL_PROVIDER_MAX_RETRIES", "0"),
    )?;
    let provider_retry_backoff_ms = parse_num(
        "ADINTEL_PROVIDER_RETRY_BACKOFF_MS",
        &or_default("ADINTEL_PROVIDER_RETRY_BACKOFF_MS", "1000"),
    )?;

    Ok(AppConfig {
        env,
        log_level,
        run_config_path,
        output_dir,
        database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        provider_max_retries,
        provider_retry_backoff_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ADINTEL_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
