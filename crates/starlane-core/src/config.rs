use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any value is present but invalid.
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
/// Returns `ConfigError` if any value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values can fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use url::Url;

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

    let parse_url = |var: &str, default: &str| -> Result<Url, ConfigError> {
        let raw = or_default(var, default);
        let url = Url::parse(&raw).map_err(|e| invalid(var, e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid(var, format!("'{raw}' cannot be used as a base URL")));
        }
        Ok(url)
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

    let env = parse_environment(&or_default("STARLANE_ENV", "development"));
    let bind_addr = parse_addr("STARLANE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("STARLANE_LOG_LEVEL", "info");
    let static_dir = PathBuf::from(or_default("STARLANE_STATIC_DIR", "./public"));
    let edsm_base_url = parse_url("STARLANE_EDSM_BASE_URL", "https://www.edsm.net")?;
    let inara_base_url = parse_url("STARLANE_INARA_BASE_URL", "https://inara.cz")?;
    let user_agent = or_default("STARLANE_USER_AGENT", DEFAULT_USER_AGENT);

    let fetch_max_attempts = parse_u32("STARLANE_FETCH_MAX_ATTEMPTS", "3")?;
    if fetch_max_attempts == 0 {
        return Err(invalid(
            "STARLANE_FETCH_MAX_ATTEMPTS",
            "attempt budget must be at least 1".to_string(),
        ));
    }
    let fetch_timeout_ms = parse_u64("STARLANE_FETCH_TIMEOUT_MS", "15000")?;
    let fetch_backoff_step_ms = parse_u64("STARLANE_FETCH_BACKOFF_STEP_MS", "3000")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        static_dir,
        edsm_base_url,
        inara_base_url,
        user_agent,
        fetch_max_attempts,
        fetch_timeout_ms,
        fetch_backoff_step_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
