//! Ed25519 signing strategy.

use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::{Signer, SigningKey};

use super::AuthStrategy;
use crate::Result;
use crate::auth::{SignatureScheme, load_ed25519_private_key};

/// Base64 Ed25519 signature of the payload.
#[derive(Clone)]
pub struct Ed25519Strategy {
    key: SigningKey,
}

impl Ed25519Strategy {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(load_ed25519_private_key(path)?))
    }

    /// Hex encoded public key, safe to log.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.key.verifying_key().as_bytes())
    }
}

impl AuthStrategy for Ed25519Strategy {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Ed25519
    }

    fn sign(&self, payload: &[u8]) -> String {
        STANDARD.encode(self.key.sign(payload).to_bytes())
    }

    fn name(&self) -> &'static str {
        "ed25519"
    }
}

impl fmt::Debug for Ed25519Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Strategy")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}
