use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
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
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match optional(var) {
            None => Ok(default),
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false, got \"{raw}\""))
            }),
        }
    };

    let env = parse_environment(&or_default("ALPHALEADS_ENV", "development"))?;
    let bind_addr = parse_addr("ALPHALEADS_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("ALPHALEADS_LOG_LEVEL", "info");

    let database_url = optional("DATABASE_URL");
    let db_max_connections = parse_u32("ALPHALEADS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ALPHALEADS_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ALPHALEADS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let yelp_api_key = optional("YELP_API_KEY");
    let hunter_api_key = optional("HUNTER_IO_API_KEY");
    let clearbit_api_key = optional("CLEARBIT_API_KEY");

    let osm_enabled = parse_bool("ALPHALEADS_OSM_ENABLED", true)?;
    let osm_phone_enrichment = parse_bool("ALPHALEADS_OSM_PHONE_ENRICHMENT", true)?;
    let sec_enabled = parse_bool("ALPHALEADS_SEC_ENABLED", false)?;

    let user_agent = or_default("ALPHALEADS_USER_AGENT", "AlphaLeads/1.0 (lead-aggregation)");
    let source_cache_ttl_secs = parse_u64("ALPHALEADS_SOURCE_CACHE_TTL_SECS", "3600")?;
    let source_max_retries = parse_u32("ALPHALEADS_SOURCE_MAX_RETRIES", "1")?;
    let source_retry_backoff_ms = parse_u64("ALPHALEADS_SOURCE_RETRY_BACKOFF_MS", "500")?;

    let validation_enabled = parse_bool("ALPHALEADS_VALIDATION_ENABLED", true)?;
    let validation_batch_size = parse_usize("ALPHALEADS_VALIDATION_BATCH_SIZE", "3")?;
    if validation_batch_size == 0 {
        return Err(invalid(
            "ALPHALEADS_VALIDATION_BATCH_SIZE",
            "must be at least 1".to_string(),
        ));
    }
    let validation_batch_delay_ms = parse_u64("ALPHALEADS_VALIDATION_BATCH_DELAY_MS", "500")?;

    let rate_limit_max_requests = parse_usize("ALPHALEADS_RATE_LIMIT_MAX_REQUESTS", "100")?;
    let rate_limit_window_secs = parse_u64("ALPHALEADS_RATE_LIMIT_WINDOW_SECS", "900")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        yelp_api_key,
        hunter_api_key,
        clearbit_api_key,
        osm_enabled,
        osm_phone_enrichment,
        sec_enabled,
        user_agent,
        source_cache_ttl_secs,
        source_max_retries,
        source_retry_backoff_ms,
        validation_enabled,
        validation_batch_size,
        validation_batch_delay_ms,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ALPHALEADS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
