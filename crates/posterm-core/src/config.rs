use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::{AppConfig, Environment};
use crate::demo::DemoDataset;
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

fn invalid(var: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields an offline
/// terminal on the coffee demo menu.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e))
    };

    let positive_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        match parse_u32(var, default)? {
            0 => Err(invalid(var, "must be greater than zero")),
            n => Ok(n),
        }
    };

    let positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        match parse_u64(var, default)? {
            0 => Err(invalid(var, "must be greater than zero")),
            n => Ok(n),
        }
    };

    let env = parse_environment(&or_default("POSTERM_ENV", "development"))?;
    let log_level = or_default("POSTERM_LOG_LEVEL", "info");

    let backend_url = optional("POSTERM_BACKEND_URL")
        .map(|url| url.trim_end_matches('/').to_string());
    let sync_interval_ms = positive_u64("POSTERM_SYNC_INTERVAL_MS", "30000")?;
    let request_timeout_secs = positive_u64("POSTERM_REQUEST_TIMEOUT_SECS", "8")?;
    let sync_max_retries = parse_u32("POSTERM_SYNC_MAX_RETRIES", "0")?;
    let sync_backoff_base_ms = parse_u64("POSTERM_SYNC_BACKOFF_BASE_MS", "500")?;
    let user_agent = or_default("POSTERM_USER_AGENT", "posterm/0.1 (terminal)");

    let tax_rate = parse_tax_rate(&or_default("POSTERM_TAX_RATE", "0.15"))?;
    let currency = or_default("POSTERM_CURRENCY", "$");
    let business_name = or_default("POSTERM_BUSINESS_NAME", "POS TERMINAL");

    let screen_width = positive_u32("POSTERM_SCREEN_WIDTH", "320")?;
    let screen_height = positive_u32("POSTERM_SCREEN_HEIGHT", "452")?;

    let demo_dataset = DemoDataset::from_str(&or_default("POSTERM_DEMO_DATASET", "coffee"))?;
    let catalog_path = optional("POSTERM_CATALOG_PATH").map(PathBuf::from);

    let payment_simulation_ms = parse_u64("POSTERM_PAYMENT_SIMULATION_MS", "3000")?;
    let approval_dwell_ms = parse_u64("POSTERM_APPROVAL_DWELL_MS", "2500")?;

    let bind_addr = or_default("POSTERM_BIND_ADDR", "0.0.0.0:8080")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("POSTERM_BIND_ADDR", e))?;
    let simulator_dir = PathBuf::from(or_default("POSTERM_SIMULATOR_DIR", "./simulator"));

    Ok(AppConfig {
        env,
        log_level,
        backend_url,
        sync_interval_ms,
        request_timeout_secs,
        sync_max_retries,
        sync_backoff_base_ms,
        user_agent,
        tax_rate,
        currency,
        business_name,
        screen_width,
        screen_height,
        demo_dataset,
        catalog_path,
        payment_simulation_ms,
        approval_dwell_ms,
        bind_addr,
        simulator_dir,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(invalid(
            "POSTERM_ENV",
            format!("unknown environment '{other}'"),
        )),
    }
}

/// Tax rate as a fraction in `[0, 1)`.
fn parse_tax_rate(s: &str) -> Result<Decimal, ConfigError> {
    let rate = Decimal::from_str(s.trim()).map_err(|e| invalid("POSTERM_TAX_RATE", e))?;
    if rate.is_sign_negative() || rate >= Decimal::ONE {
        return Err(invalid(
            "POSTERM_TAX_RATE",
            format!("{rate} is outside [0, 1); use a fraction such as 0.15"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
