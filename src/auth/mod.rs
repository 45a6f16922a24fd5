//! Credential resolution and request authentication.
//!
//! Three signing schemes are supported:
//! - **HMAC**: HMAC-SHA256 over the query string with a shared secret
//! - **RSA**: RSASSA-PKCS1-v1_5/SHA-256 with a PKCS#1 or PKCS#8 PEM key
//! - **Ed25519**: Ed25519 with a PKCS#8 PEM or 64-byte raw hex key
//!
//! [`CredentialResolver`] turns configuration inputs into an ordered list of
//! [`CredentialConfig`]s; [`AuthContext::build`] turns one of them into the
//! signing context handed to the SDK client.

mod context;
mod credential;
mod keys;
mod level;
mod resolver;
mod strategy;

pub use context::{AuthContext, AuthFallback};
pub use credential::{CredentialConfig, KeyMaterial, PUBLIC_CONFIG_NAME};
pub use keys::{MIN_RSA_KEY_BITS, load_ed25519_private_key, load_rsa_private_key};
pub use level::{AuthLevel, SignatureScheme};
pub use resolver::{CredentialResolver, CredentialVars};
pub use strategy::{AuthStrategy, Ed25519Strategy, HmacStrategy, RsaStrategy};
