use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://adwatch.db?mode=rwc";
pub const DEFAULT_ARCHIVE_URL: &str = "https://graph.facebook.com/v20.0/ads_archive";
pub const DEFAULT_USER_AGENT: &str = "adwatch/0.1 (ad-tracking)";

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
/// so parsing can be tested against a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = or_default("DATABASE_URL", DEFAULT_DATABASE_URL);
    let log_level = or_default("ADWATCH_LOG_LEVEL", "info");
    let access_token = lookup("ADWATCH_ACCESS_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty());
    let archive_url = or_default("ADWATCH_ARCHIVE_URL", DEFAULT_ARCHIVE_URL);
    let user_agent = or_default("ADWATCH_USER_AGENT", DEFAULT_USER_AGENT);

    let request_timeout_secs = parse_u64("ADWATCH_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADWATCH_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let db_max_connections = parse_u32("ADWATCH_DB_MAX_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ADWATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        log_level,
        access_token,
        archive_url,
        request_timeout_secs,
        user_agent,
        db_max_connections,
        db_acquire_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
