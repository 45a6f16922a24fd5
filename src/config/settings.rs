//! Run settings shared by every harness.

use std::time::Duration;

use url::Url;

use super::provider::{ConfigProvider, ConfigProviderExt};
use super::{ConfigError, ConfigResult};
use crate::auth::AuthFallback;

/// Configuration keys read by the harness.
pub mod keys {
    pub const HMAC_API_KEY: &str = "BINANCE_API_KEY";
    pub const HMAC_SECRET_KEY: &str = "BINANCE_SECRET_KEY";
    pub const RSA_API_KEY: &str = "BINANCE_RSA_API_KEY";
    pub const RSA_PRIVATE_KEY_PATH: &str = "BINANCE_RSA_PRIVATE_KEY_PATH";
    pub const ED25519_API_KEY: &str = "BINANCE_ED25519_API_KEY";
    pub const ED25519_PRIVATE_KEY_PATH: &str = "BINANCE_ED25519_PRIVATE_KEY_PATH";

    pub const TEST_ALL_AUTH_TYPES: &str = "TEST_ALL_AUTH_TYPES";
    pub const SERVER_URL: &str = "BINANCE_SERVER_URL";
    pub const VERBOSE: &str = "TEST_VERBOSE";
    pub const RATE_LIMIT_INTERVAL_MS: &str = "RATE_LIMIT_INTERVAL_MS";
    pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
    pub const AUTH_FALLBACK: &str = "AUTH_FALLBACK";
}

pub const DEFAULT_RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one harness run.
#[derive(Debug, Clone)]
pub struct HarnessSettings {
    /// Server replacing the SDK's default testnet URL.
    pub server_override: Option<Url>,
    pub verbose: bool,
    /// Build a configuration for every available scheme instead of the
    /// preferred one.
    pub test_all_auth_types: bool,
    pub rate_limit_interval: Duration,
    pub request_timeout: Duration,
    pub auth_fallback: AuthFallback,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            server_override: None,
            verbose: false,
            test_all_auth_types: false,
            rate_limit_interval: DEFAULT_RATE_LIMIT_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            auth_fallback: AuthFallback::default(),
        }
    }
}

impl HarnessSettings {
    /// Read settings from a provider, falling back to defaults for absent keys.
    pub async fn load<P: ConfigProvider + ?Sized>(provider: &P) -> ConfigResult<Self> {
        let defaults = Self::default();

        let server_override = match provider.get_non_empty(keys::SERVER_URL).await? {
            Some(raw) => Some(Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                key: keys::SERVER_URL.to_string(),
                message: e.to_string(),
            })?),
            None => None,
        };

        let rate_limit_interval = provider
            .get_parsed::<u64>(keys::RATE_LIMIT_INTERVAL_MS)
            .await?
            .map(Duration::from_millis)
            .unwrap_or(defaults.rate_limit_interval);

        let request_timeout = match provider.get_parsed::<u64>(keys::REQUEST_TIMEOUT_SECS).await? {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: keys::REQUEST_TIMEOUT_SECS.to_string(),
                    message: "timeout must be greater than zero".into(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.request_timeout,
        };

        let auth_fallback = provider
            .get_parsed::<AuthFallback>(keys::AUTH_FALLBACK)
            .await?
            .unwrap_or(defaults.auth_fallback);

        Ok(Self {
            server_override,
            verbose: provider.get_flag(keys::VERBOSE).await?,
            test_all_auth_types: provider.get_flag(keys::TEST_ALL_AUTH_TYPES).await?,
            rate_limit_interval,
            request_timeout,
            auth_fallback,
        })
    }

    pub fn with_rate_limit_interval(mut self, interval: Duration) -> Self {
        self.rate_limit_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_auth_fallback(mut self, fallback: AuthFallback) -> Self {
        self.auth_fallback = fallback;
        self
    }

    pub fn with_server_override(mut self, url: Url) -> Self {
        self.server_override = Some(url);
        self
    }
}
