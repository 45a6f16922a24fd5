//! Per-configuration authentication context.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use url::Url;
use url::form_urlencoded::byte_serialize;

use super::strategy::{AuthStrategy, Ed25519Strategy, HmacStrategy, RsaStrategy};
use super::{AuthLevel, CredentialConfig, KeyMaterial, PUBLIC_CONFIG_NAME, SignatureScheme};
use crate::{Error, Result};

pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// What to do when a configuration's signer cannot be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthFallback {
    /// Return the construction error to the caller.
    #[default]
    FailFast,
    /// Log a warning and continue with the API key but no signer.
    Unsigned,
}

impl AuthFallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFallback::FailFast => "fail-fast",
            AuthFallback::Unsigned => "unsigned",
        }
    }
}

impl fmt::Display for AuthFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthFallback {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Ok(AuthFallback::FailFast),
            "unsigned" => Ok(AuthFallback::Unsigned),
            other => Err(format!(
                "unknown auth fallback '{}', expected 'fail-fast' or 'unsigned'",
                other
            )),
        }
    }
}

/// Signing context bound to one [`CredentialConfig`].
///
/// Immutable once built; clones share the signer.
#[derive(Clone)]
pub struct AuthContext {
    config_name: String,
    level: AuthLevel,
    api_key: Option<SecretString>,
    signer: Option<Arc<dyn AuthStrategy>>,
}

impl AuthContext {
    /// Context for public endpoints: no key, no signer.
    pub fn public() -> Self {
        Self {
            config_name: PUBLIC_CONFIG_NAME.to_string(),
            level: AuthLevel::None,
            api_key: None,
            signer: None,
        }
    }

    /// Build with [`AuthFallback::FailFast`].
    pub fn build(config: &CredentialConfig) -> Result<Self> {
        Self::build_with(config, AuthFallback::FailFast)
    }

    pub fn build_with(config: &CredentialConfig, fallback: AuthFallback) -> Result<Self> {
        if config.is_public() {
            return Ok(Self::public().named(config.name()));
        }

        let api_key = config
            .api_key()
            .filter(|key| !key.trim().is_empty())
            .map(|key| SecretString::from(key.to_string()));

        let signer = api_key
            .as_ref()
            .ok_or_else(|| Error::auth(config.name(), "API key is empty"))
            .and_then(|_| build_signer(config));

        match signer {
            Ok(signer) => {
                tracing::debug!(
                    config = config.name(),
                    scheme = signer.name(),
                    "Built authentication context"
                );
                Ok(Self {
                    config_name: config.name().to_string(),
                    level: config.level(),
                    api_key,
                    signer: Some(signer),
                })
            }
            Err(err) => match fallback {
                AuthFallback::FailFast => Err(err),
                AuthFallback::Unsigned => {
                    tracing::warn!(
                        config = config.name(),
                        error = %err,
                        "Signer unavailable, requests will be sent unsigned"
                    );
                    Ok(Self {
                        config_name: config.name().to_string(),
                        level: config.level(),
                        api_key,
                        signer: None,
                    })
                }
            },
        }
    }

    fn named(mut self, name: &str) -> Self {
        self.config_name = name.to_string();
        self
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    pub fn level(&self) -> AuthLevel {
        self.level
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.signer
            .as_ref()
            .map(|s| s.scheme())
            .unwrap_or(SignatureScheme::None)
    }

    pub fn is_signed(&self) -> bool {
        self.signer.is_some()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret())
    }

    /// Signature of `payload`, or `None` for unsigned contexts.
    pub fn sign(&self, payload: &str) -> Option<String> {
        self.signer.as_ref().map(|s| s.sign(payload.as_bytes()))
    }

    /// Append `timestamp` and `signature` to a query string.
    ///
    /// Unsigned contexts only get the timestamp.
    pub fn sign_query(&self, query: &str, timestamp_ms: i64) -> String {
        let payload = if query.is_empty() {
            format!("timestamp={}", timestamp_ms)
        } else {
            format!("{}&timestamp={}", query, timestamp_ms)
        };

        match self.sign(&payload) {
            Some(signature) => {
                let encoded: String = byte_serialize(signature.as_bytes()).collect();
                format!("{}&signature={}", payload, encoded)
            }
            None => payload,
        }
    }

    /// `url` with its query replaced by the signed form.
    pub fn signed_url(&self, mut url: Url, timestamp_ms: i64) -> Url {
        let signed = self.sign_query(url.query().unwrap_or(""), timestamp_ms);
        url.set_query(Some(&signed));
        url
    }

    /// Attach the API key header when the context has one.
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key() {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

fn build_signer(config: &CredentialConfig) -> Result<Arc<dyn AuthStrategy>> {
    let wrap = |err: Error| Error::auth(config.name(), err.to_string());

    match (config.scheme(), config.material()) {
        (SignatureScheme::Hmac, KeyMaterial::Secret(secret)) => {
            if secret.expose_secret().trim().is_empty() {
                return Err(Error::auth(config.name(), "HMAC secret is empty"));
            }
            Ok(Arc::new(HmacStrategy::new(secret).map_err(wrap)?))
        }
        (SignatureScheme::Rsa, KeyMaterial::KeyFile(path)) => {
            Ok(Arc::new(RsaStrategy::from_file(path).map_err(wrap)?))
        }
        (SignatureScheme::Ed25519, KeyMaterial::KeyFile(path)) => {
            Ok(Arc::new(Ed25519Strategy::from_file(path).map_err(wrap)?))
        }
        (scheme, material) => Err(Error::auth(
            config.name(),
            format!("{} cannot sign with {:?}", scheme, material),
        )),
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("config_name", &self.config_name)
            .field("level", &self.level)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("signer", &self.signer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;

    const ED25519_SIGNATURE: &str =
        "QyHXhjbUBj+X5sjceHP3Vh64szmf0xXH2MkAISxWG5bzJHJQwCNJ+lFbmj92gzzYJOE3EUd85aNwWZeuTBJHBQ==";

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_public_context() {
        let ctx = AuthContext::build(&CredentialConfig::public()).unwrap();
        assert!(!ctx.is_signed());
        assert!(ctx.api_key().is_none());
        assert_eq!(ctx.scheme(), SignatureScheme::None);
        assert_eq!(ctx.sign_query("symbol=BTCUSDT", 5), "symbol=BTCUSDT&timestamp=5");
    }

    #[test]
    fn test_hmac_sign_query() {
        let config = CredentialConfig::hmac("key", "secret", AuthLevel::Trade);
        let ctx = AuthContext::build(&config).unwrap();
        let signed = ctx.sign_query("symbol=BTCUSDT", 1700000000000);

        let expected = HmacStrategy::new(&SecretString::from("secret".to_string()))
            .unwrap()
            .sign(b"symbol=BTCUSDT&timestamp=1700000000000");
        assert_eq!(
            signed,
            format!("symbol=BTCUSDT&timestamp=1700000000000&signature={}", expected)
        );
        assert_eq!(ctx.api_key(), Some("key"));
    }

    #[test]
    fn test_ed25519_signature_is_url_encoded() {
        let config = CredentialConfig::ed25519("key", fixture("ed25519.pem"), AuthLevel::Trade);
        let ctx = AuthContext::build(&config).unwrap();
        let signed = ctx.sign_query("symbol=BTCUSDT", 1700000000000);

        let encoded: String = byte_serialize(ED25519_SIGNATURE.as_bytes()).collect();
        assert!(signed.ends_with(&format!("&signature={}", encoded)));
        assert!(!signed.contains('+'));
    }

    #[test]
    fn test_signed_url_empty_query() {
        let config = CredentialConfig::hmac("key", "secret", AuthLevel::Trade);
        let ctx = AuthContext::build(&config).unwrap();
        let url = ctx.signed_url(Url::parse("https://testnet.example/api/v3/account").unwrap(), 42);
        let query = url.query().unwrap();
        assert!(query.starts_with("timestamp=42&signature="));
    }

    #[test]
    fn test_missing_key_file_fails_fast() {
        let config = CredentialConfig::rsa("key", "/nonexistent/rsa.pem", AuthLevel::Trade);
        let err = AuthContext::build(&config).unwrap_err();
        assert!(matches!(&err, Error::AuthConstruction { config, .. } if config == "RSA Authentication"));
    }

    #[test]
    fn test_wrong_key_type_fails() {
        let config = CredentialConfig::rsa("key", fixture("ed25519.pem"), AuthLevel::Trade);
        let err = AuthContext::build(&config).unwrap_err();
        assert!(err.to_string().contains("not an RSA private key"));
    }

    #[test]
    fn test_empty_secret_fails() {
        let config = CredentialConfig::hmac("key", "  ", AuthLevel::Trade);
        assert!(AuthContext::build(&config).is_err());
    }

    #[test]
    fn test_unsigned_fallback_keeps_api_key() {
        let config = CredentialConfig::ed25519("key", "/nonexistent/ed.pem", AuthLevel::Trade);
        let ctx = AuthContext::build_with(&config, AuthFallback::Unsigned).unwrap();
        assert!(!ctx.is_signed());
        assert_eq!(ctx.api_key(), Some("key"));
        assert_eq!(ctx.level(), AuthLevel::Trade);
        assert_eq!(ctx.config_name(), "Ed25519 Authentication");
    }

    #[test]
    fn test_fallback_parse() {
        assert_eq!("fail-fast".parse::<AuthFallback>().unwrap(), AuthFallback::FailFast);
        assert_eq!("UNSIGNED".parse::<AuthFallback>().unwrap(), AuthFallback::Unsigned);
        assert!("maybe".parse::<AuthFallback>().is_err());
        assert_eq!(AuthFallback::default().to_string(), "fail-fast");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = CredentialConfig::hmac("visible-key", "secret", AuthLevel::Trade);
        let ctx = AuthContext::build(&config).unwrap();
        let debug = format!("{:?}", ctx);
        assert!(!debug.contains("visible-key"));
        assert!(debug.contains("HmacStrategy"));
    }
}
