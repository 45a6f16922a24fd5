//! Configuration sources for harness runs.
//!
//! Credentials and run settings are read through a [`ConfigProvider`] rather
//! than straight from `std::env`, so the same resolution logic runs against
//! the process environment in a live harness and against an in-memory map in
//! tests.
//!
//! ```rust,no_run
//! use exchange_harness::config::{EnvConfigProvider, HarnessSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = HarnessSettings::load(&EnvConfigProvider::new()).await?;
//! println!("rate limit interval: {:?}", settings.rate_limit_interval);
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod memory;
pub mod provider;
pub mod settings;

pub use env::EnvConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};
pub use settings::{HarnessSettings, keys};

use thiserror::Error;

/// Failure to read or interpret a configuration value.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Key not found: {key}")]
    NotFound { key: String },

    /// The value is present but unusable, e.g. an unparsable interval.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    /// A provider-specific failure.
    #[error("Provider error: {message}")]
    Provider { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_names_key() {
        let err = ConfigError::InvalidValue {
            key: "RATE_LIMIT_INTERVAL_MS".to_string(),
            message: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for RATE_LIMIT_INTERVAL_MS: invalid digit found in string"
        );
    }
}
