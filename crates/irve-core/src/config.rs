use crate::app_config::{AppConfig, DEFAULT_CSV_URL, DEFAULT_RECORDS_API_URL};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    // An empty value counts as missing for both required and optional vars.
    let present = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let require = |var: &str| -> Result<String, ConfigError> {
        present(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        present(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let supabase_url = require("SUPABASE_URL")?;
    let service_role_key = require("SUPABASE_SERVICE_ROLE_KEY")?;

    let csv_url = or_default("IRVE_CSV_URL", DEFAULT_CSV_URL);
    let records_api_url = or_default("IRVE_RECORDS_API_URL", DEFAULT_RECORDS_API_URL);

    let batch_size = parse_usize("IRVE_BATCH_SIZE", "500")?;
    if batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "IRVE_BATCH_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let cooldown_ms = parse_u64("IRVE_COOLDOWN_MS", "200")?;
    let request_timeout_secs = parse_u64("IRVE_REQUEST_TIMEOUT_SECS", "60")?;
    let user_agent = or_default("IRVE_USER_AGENT", "irve-sync/0.1 (station-import)");
    let log_level = or_default("IRVE_LOG_LEVEL", "info");

    Ok(AppConfig {
        supabase_url,
        service_role_key,
        csv_url,
        records_api_url,
        batch_size,
        cooldown_ms,
        request_timeout_secs,
        user_agent,
        log_level,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
