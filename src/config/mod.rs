//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `ATMT` prefix and nested
//! values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use atmt_payments::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment configuration (price, marker, receiving account, webhook key)
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `.env` if present, then environment variables such as:
    ///
    /// - `ATMT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ATMT__DATABASE__URL=...` -> `database.url = ...`
    /// - `ATMT__PAYMENT__PRICE=5000000` -> `payment.price = 5000000`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().prefix("ATMT").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "ATMT__DATABASE__URL",
        "ATMT__PAYMENT__WEBHOOK_API_KEY",
        "ATMT__PAYMENT__ACCOUNT_NUMBER",
        "ATMT__PAYMENT__ACCOUNT_NAME",
        "ATMT__PAYMENT__PRICE",
        "ATMT__PAYMENT__ENFORCE_SESSION_EXPIRY",
        "ATMT__SERVER__PORT",
        "ATMT__SERVER__ENVIRONMENT",
    ];

    fn set_minimal_env() {
        env::set_var("ATMT__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("ATMT__PAYMENT__WEBHOOK_API_KEY", "gateway-key");
        env::set_var("ATMT__PAYMENT__ACCOUNT_NUMBER", "28368866886");
        env::set_var("ATMT__PAYMENT__ACCOUNT_NAME", "NGUYEN HONG QUANG");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let result = load_with(&[]);

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(
            config.database.url.expose_secret(),
            "postgresql://test@localhost/test"
        );
        assert_eq!(config.payment.account_number, "28368866886");
        assert_eq!(config.payment.price, 5_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
    }

    #[test]
    fn test_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("ATMT__SERVER__PORT", "3000"),
            ("ATMT__SERVER__ENVIRONMENT", "production"),
            ("ATMT__PAYMENT__PRICE", "2000000"),
            ("ATMT__PAYMENT__ENFORCE_SESSION_EXPIRY", "false"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(config.payment.price, 2_000_000);
        assert!(!config.payment.enforce_session_expiry);
    }

    #[test]
    fn test_missing_webhook_key_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("ATMT__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("ATMT__PAYMENT__ACCOUNT_NUMBER", "28368866886");
        env::set_var("ATMT__PAYMENT__ACCOUNT_NAME", "NGUYEN HONG QUANG");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }
}
