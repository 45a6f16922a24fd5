//! Credential resolution from configuration providers.

use crate::auth::{AuthLevel, CredentialConfig};
use crate::config::{ConfigProvider, ConfigProviderExt, keys};
use crate::Result;

/// Configuration keys naming each scheme's inputs.
#[derive(Debug, Clone)]
pub struct CredentialVars {
    pub hmac_api_key: String,
    pub hmac_secret: String,
    pub rsa_api_key: String,
    pub rsa_key_path: String,
    pub ed25519_api_key: String,
    pub ed25519_key_path: String,
}

impl Default for CredentialVars {
    fn default() -> Self {
        Self {
            hmac_api_key: keys::HMAC_API_KEY.to_string(),
            hmac_secret: keys::HMAC_SECRET_KEY.to_string(),
            rsa_api_key: keys::RSA_API_KEY.to_string(),
            rsa_key_path: keys::RSA_PRIVATE_KEY_PATH.to_string(),
            ed25519_api_key: keys::ED25519_API_KEY.to_string(),
            ed25519_key_path: keys::ED25519_PRIVATE_KEY_PATH.to_string(),
        }
    }
}

/// Resolves the ordered list of runnable configurations.
///
/// Without `all_schemes` a single preferred scheme is chosen: Ed25519 when
/// available, HMAC otherwise. With it, HMAC, RSA and Ed25519 are each added
/// when their inputs are present. The public configuration is always last.
///
/// Key paths are carried as given; nothing is read from disk here.
pub struct CredentialResolver<'a, P: ConfigProvider + ?Sized> {
    provider: &'a P,
    vars: CredentialVars,
    all_schemes: bool,
    level: AuthLevel,
}

impl<'a, P: ConfigProvider + ?Sized> CredentialResolver<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            vars: CredentialVars::default(),
            all_schemes: false,
            level: AuthLevel::Trade,
        }
    }

    pub fn all_schemes(mut self, enabled: bool) -> Self {
        self.all_schemes = enabled;
        self
    }

    /// Level granted to every authenticated configuration.
    pub fn level(mut self, level: AuthLevel) -> Self {
        self.level = level;
        self
    }

    pub fn vars(mut self, vars: CredentialVars) -> Self {
        self.vars = vars;
        self
    }

    pub async fn resolve(&self) -> Result<Vec<CredentialConfig>> {
        let hmac = self.hmac().await?;
        let rsa = self.rsa().await?;
        let ed25519 = self.ed25519().await?;

        let mut configs = Vec::with_capacity(4);
        if self.all_schemes {
            configs.extend(hmac);
            configs.extend(rsa);
            configs.extend(ed25519);
        } else if let Some(config) = ed25519.or(hmac) {
            configs.push(config);
        }
        configs.push(CredentialConfig::public());

        tracing::debug!(
            provider = self.provider.name(),
            all_schemes = self.all_schemes,
            configs = ?configs.iter().map(|c| c.name()).collect::<Vec<_>>(),
            "Resolved credential configurations"
        );
        Ok(configs)
    }

    async fn pair(&self, first: &str, second: &str) -> Result<Option<(String, String)>> {
        let first_value = self.provider.get_non_empty(first).await?;
        let second_value = self.provider.get_non_empty(second).await?;
        match (first_value, second_value) {
            (Some(a), Some(b)) => Ok(Some((a, b))),
            (Some(_), None) => {
                tracing::debug!(missing = second, "Incomplete credential inputs, scheme skipped");
                Ok(None)
            }
            (None, Some(_)) => {
                tracing::debug!(missing = first, "Incomplete credential inputs, scheme skipped");
                Ok(None)
            }
            (None, None) => Ok(None),
        }
    }

    async fn hmac(&self) -> Result<Option<CredentialConfig>> {
        Ok(self
            .pair(&self.vars.hmac_api_key, &self.vars.hmac_secret)
            .await?
            .map(|(key, secret)| CredentialConfig::hmac(key, secret, self.level)))
    }

    async fn rsa(&self) -> Result<Option<CredentialConfig>> {
        Ok(self
            .pair(&self.vars.rsa_api_key, &self.vars.rsa_key_path)
            .await?
            .map(|(key, path)| CredentialConfig::rsa(key, path, self.level)))
    }

    async fn ed25519(&self) -> Result<Option<CredentialConfig>> {
        Ok(self
            .pair(&self.vars.ed25519_api_key, &self.vars.ed25519_key_path)
            .await?
            .map(|(key, path)| CredentialConfig::ed25519(key, path, self.level)))
    }
}
