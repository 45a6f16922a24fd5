//! Credential configuration types.

use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

use super::{AuthLevel, SignatureScheme};

pub const PUBLIC_CONFIG_NAME: &str = "Public Endpoints";

/// Secret material a scheme signs with.
#[derive(Clone)]
pub enum KeyMaterial {
    None,
    /// Shared HMAC secret.
    Secret(SecretString),
    /// Path to a private key file; parsed lazily by [`AuthContext::build`](super::AuthContext::build).
    KeyFile(PathBuf),
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::None => f.write_str("None"),
            KeyMaterial::Secret(_) => f.write_str("Secret([redacted])"),
            KeyMaterial::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
        }
    }
}

/// One runnable authentication configuration.
///
/// Built once at startup by the resolver and never mutated.
#[derive(Clone)]
pub struct CredentialConfig {
    name: String,
    scheme: SignatureScheme,
    api_key: Option<SecretString>,
    material: KeyMaterial,
    level: AuthLevel,
}

impl CredentialConfig {
    /// The no-auth configuration for public endpoints.
    pub fn public() -> Self {
        Self {
            name: PUBLIC_CONFIG_NAME.to_string(),
            scheme: SignatureScheme::None,
            api_key: None,
            material: KeyMaterial::None,
            level: AuthLevel::None,
        }
    }

    pub fn hmac(api_key: impl Into<String>, secret: impl Into<String>, level: AuthLevel) -> Self {
        Self {
            name: "HMAC Authentication".to_string(),
            scheme: SignatureScheme::Hmac,
            api_key: Some(SecretString::from(api_key.into())),
            material: KeyMaterial::Secret(SecretString::from(secret.into())),
            level,
        }
    }

    pub fn rsa(api_key: impl Into<String>, key_path: impl Into<PathBuf>, level: AuthLevel) -> Self {
        Self {
            name: "RSA Authentication".to_string(),
            scheme: SignatureScheme::Rsa,
            api_key: Some(SecretString::from(api_key.into())),
            material: KeyMaterial::KeyFile(key_path.into()),
            level,
        }
    }

    pub fn ed25519(
        api_key: impl Into<String>,
        key_path: impl Into<PathBuf>,
        level: AuthLevel,
    ) -> Self {
        Self {
            name: "Ed25519 Authentication".to_string(),
            scheme: SignatureScheme::Ed25519,
            api_key: Some(SecretString::from(api_key.into())),
            material: KeyMaterial::KeyFile(key_path.into()),
            level,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn level(&self) -> AuthLevel {
        self.level
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret())
    }

    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }

    pub fn key_path(&self) -> Option<&Path> {
        match &self.material {
            KeyMaterial::KeyFile(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_public(&self) -> bool {
        self.scheme == SignatureScheme::None
    }

    /// Whether this configuration may call an endpoint requiring `required`.
    pub fn permits(&self, required: AuthLevel) -> bool {
        self.level.permits(required)
    }
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("name", &self.name)
            .field("scheme", &self.scheme)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("material", &self.material)
            .field("level", &self.level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_config() {
        let config = CredentialConfig::public();
        assert!(config.is_public());
        assert_eq!(config.level(), AuthLevel::None);
        assert_eq!(config.name(), PUBLIC_CONFIG_NAME);
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = CredentialConfig::hmac("my-api-key", "my-secret", AuthLevel::Trade);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("my-api-key"));
        assert!(!debug.contains("my-secret"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn test_key_path() {
        let config = CredentialConfig::rsa("key", "/keys/rsa.pem", AuthLevel::Trade);
        assert_eq!(config.key_path(), Some(Path::new("/keys/rsa.pem")));
        assert_eq!(config.api_key(), Some("key"));
        assert!(config.permits(AuthLevel::UserData));
        assert!(!config.permits(AuthLevel::Margin));
    }
}
