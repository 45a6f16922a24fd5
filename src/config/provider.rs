//! Read-only configuration lookup.

use std::str::FromStr;

use super::{ConfigError, ConfigResult};

/// A source of string configuration values.
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Raw value for `key`, or `None` when unset.
    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;
}

/// Extension methods for typed configuration access
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a value, treating empty and whitespace-only strings as absent.
    fn get_non_empty(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<String>>> + Send
    where
        Self: Sync,
    {
        async move {
            Ok(self
                .get_raw(key)
                .await?
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()))
        }
    }

    /// Parse a boolean value.
    ///
    /// `true` only for "1" or "true" (case-insensitive); absent means `false`.
    fn get_flag(&self, key: &str) -> impl std::future::Future<Output = ConfigResult<bool>> + Send
    where
        Self: Sync,
    {
        async move {
            Ok(self
                .get_non_empty(key)
                .await?
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false))
        }
    }

    /// Parse a value with [`FromStr`].
    fn get_parsed<T>(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<T>>> + Send
    where
        Self: Sync,
        T: FromStr + Send,
        T::Err: std::fmt::Display,
    {
        async move {
            match self.get_non_empty(key).await? {
                Some(raw) => raw
                    .parse::<T>()
                    .map(Some)
                    .map_err(|e| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: e.to_string(),
                    }),
                None => Ok(None),
            }
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigProvider;

    #[tokio::test]
    async fn test_get_non_empty_filters_blank() {
        let provider = MemoryConfigProvider::new()
            .value("BLANK", "   ")
            .value("SET", " value ");
        assert_eq!(provider.get_non_empty("BLANK").await.unwrap(), None);
        assert_eq!(provider.get_non_empty("MISSING").await.unwrap(), None);
        assert_eq!(
            provider.get_non_empty("SET").await.unwrap(),
            Some("value".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_flag() {
        let provider = MemoryConfigProvider::new()
            .value("ONE", "1")
            .value("TRUE", "TRUE")
            .value("FALSE", "false")
            .value("ZERO", "0");

        assert!(provider.get_flag("ONE").await.unwrap());
        assert!(provider.get_flag("TRUE").await.unwrap());
        assert!(!provider.get_flag("FALSE").await.unwrap());
        assert!(!provider.get_flag("ZERO").await.unwrap());
        assert!(!provider.get_flag("MISSING").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_parsed_invalid() {
        let provider = MemoryConfigProvider::new().value("INTERVAL", "soon");
        let err = provider.get_parsed::<u64>("INTERVAL").await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "INTERVAL"));
    }
}
