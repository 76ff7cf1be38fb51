use std::collections::HashMap;
use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Transport fee configuration. Fees are flat per-city amounts in COP;
/// city keys are matched after normalization (trim, uppercase, accent fold).
#[derive(Clone, Debug, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_transport_fee")]
    pub default_fee: i64,

    #[serde(default = "default_fee_table")]
    pub fees: HashMap<String, i64>,

    /// Cities the store delivers to. An order outside this list is rejected,
    /// independently of the fee lookup.
    #[serde(default = "default_serviceable_cities")]
    pub serviceable_cities: Vec<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            default_fee: default_transport_fee(),
            fees: default_fee_table(),
            serviceable_cities: default_serviceable_cities(),
        }
    }
}

fn default_transport_fee() -> i64 {
    20000
}

fn default_fee_table() -> HashMap<String, i64> {
    HashMap::from([
        ("BOGOTA".to_string(), 8000),
        ("CHIA".to_string(), 5000),
        ("CAJICA".to_string(), 8000),
        ("SOPO".to_string(), 8000),
    ])
}

fn default_serviceable_cities() -> Vec<String> {
    vec![
        "BOGOTA".to_string(),
        "CHIA".to_string(),
        "CAJICA".to_string(),
        "SOPO".to_string(),
    ]
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1))]
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Delivery fee table and service area
    #[serde(default)]
    pub transport: TransportConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Loads configuration from `config/default.toml`, an optional
/// environment-specific file, and `APP_*` environment variables
/// (e.g. `APP_DATABASE_URL`, `APP_PORT`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("APP_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let cfg: AppConfig = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{run_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .set_default("database_url", "sqlite://tienda.db?mode=rwc")?
        .build()?
        .try_deserialize()?;

    cfg.validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;

    Ok(cfg)
}

/// Initializes the global tracing subscriber. `RUST_LOG` overrides the
/// configured level when set.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transport_config_covers_service_area() {
        let cfg = TransportConfig::default();
        assert_eq!(cfg.fees.get("CHIA"), Some(&5000));
        assert_eq!(cfg.fees.get("BOGOTA"), Some(&8000));
        assert_eq!(cfg.default_fee, 20000);
        for city in &cfg.serviceable_cities {
            assert!(cfg.fees.contains_key(city));
        }
    }
}
