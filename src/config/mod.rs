//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `VIP_GATE` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use vip_gate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Webhook server on {}", config.server.socket_addr());
//! ```

mod error;
mod jobs;
mod payment;
mod plans;
mod server;
mod storage;
mod telegram;

pub use error::{ConfigError, ValidationError};
pub use jobs::JobsConfig;
pub use payment::PaymentConfig;
pub use plans::PlansConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;
pub use telegram::TelegramConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the VIP Gate service.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, timeouts, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// Payment provider configuration (Mercado Pago)
    pub payment: PaymentConfig,

    /// Messaging platform configuration (Telegram)
    pub telegram: TelegramConfig,

    /// Plan pricing table
    #[serde(default)]
    pub plans: PlansConfig,

    /// Background job scheduling (sweep interval, cooldown gap)
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Persistence locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `VIP_GATE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `VIP_GATE__SERVER__PORT=3000` -> `server.port = 3000`
    /// - `VIP_GATE__PAYMENT__WEBHOOK_SECRET=...` -> `payment.webhook_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("VIP_GATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.payment.validate()?;
        self.telegram.validate()?;
        self.plans.validate()?;
        self.jobs.validate()?;
        Ok(())
    }
}
