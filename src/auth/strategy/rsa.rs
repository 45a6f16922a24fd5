//! RSASSA-PKCS1-v1_5 / SHA-256 signing strategy.

use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::traits::PublicKeyParts;
use sha2::Sha256;

use super::AuthStrategy;
use crate::Result;
use crate::auth::{SignatureScheme, load_rsa_private_key};

/// Base64 RSA PKCS#1 v1.5 signature over the SHA-256 digest of the payload.
#[derive(Clone)]
pub struct RsaStrategy {
    key: SigningKey<Sha256>,
    bits: usize,
}

impl RsaStrategy {
    pub fn new(private_key: RsaPrivateKey) -> Self {
        let bits = private_key.size() * 8;
        Self {
            key: SigningKey::<Sha256>::new(private_key),
            bits,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(load_rsa_private_key(path)?))
    }

    pub fn key_bits(&self) -> usize {
        self.bits
    }
}

impl AuthStrategy for RsaStrategy {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Rsa
    }

    fn sign(&self, payload: &[u8]) -> String {
        let signature = self.key.sign(payload);
        STANDARD.encode(signature.to_bytes())
    }

    fn name(&self) -> &'static str {
        "rsa"
    }
}

impl fmt::Debug for RsaStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaStrategy")
            .field("bits", &self.bits)
            .field("key", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_known_signature() {
        let strategy = RsaStrategy::from_file(&fixture("rsa_pkcs8.pem")).unwrap();
        assert_eq!(strategy.key_bits(), 2048);
        assert_eq!(
            strategy.sign(b"symbol=BTCUSDT&timestamp=1700000000000"),
            "IpJZjKLojK2GLoAkWYbLp5fCjqHSEARgB7m0LPQtpIq4+Wc4Aew2Be/Bz6hRI4HrPuvNF54cC0CGA1k2voG24ozLUmejERikBJrocaQsr3tPJ5n0IBuZsA0qUh07CN+/MS5S/rMrLFmJwbTWuy/g+uslEQiTHLdhKE7GMojsZ0B48zBA9pm+6X8N5f/auzj8eyoJaZWto0Q5lnrsw+t1o5dEjmPsvLyUEMkKodjwGW5ZDIWMM7Eh/lW3FgQFd433Z8SL1zOgLTD7R+NGUZydFwCry5xs5zB0shQjluX2HpxUqOJgY0vyy6bVBB9tmVNO/Bj3EiPRWY3w4aeFK38lbQ=="
        );
    }

    #[test]
    fn test_pkcs1_key_signs_identically() {
        let pkcs8 = RsaStrategy::from_file(&fixture("rsa_pkcs8.pem")).unwrap();
        let pkcs1 = RsaStrategy::from_file(&fixture("rsa_pkcs1.pem")).unwrap();
        assert_eq!(pkcs8.sign(b"timestamp=1"), pkcs1.sign(b"timestamp=1"));
    }

    #[test]
    fn test_debug_hides_key() {
        let strategy = RsaStrategy::from_file(&fixture("rsa_pkcs8.pem")).unwrap();
        let debug = format!("{:?}", strategy);
        assert!(debug.contains("2048"));
        assert!(debug.contains("[redacted]"));
    }
}
