//! HMAC-SHA256 signing strategy.

use std::fmt;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::AuthStrategy;
use crate::auth::SignatureScheme;
use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 of the payload.
#[derive(Clone)]
pub struct HmacStrategy {
    mac: HmacSha256,
}

impl HmacStrategy {
    pub fn new(secret: &SecretString) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|e| Error::auth("HMAC", e.to_string()))?;
        Ok(Self { mac })
    }
}

impl AuthStrategy for HmacStrategy {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Hmac
    }

    fn sign(&self, payload: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn name(&self) -> &'static str {
        "hmac"
    }
}

impl fmt::Debug for HmacStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacStrategy")
            .field("secret", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
    const PAYLOAD: &str = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";

    #[test]
    fn test_known_signature() {
        let strategy = HmacStrategy::new(&SecretString::from(SECRET.to_string())).unwrap();
        assert_eq!(
            strategy.sign(PAYLOAD.as_bytes()),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_repeated_signing_is_stable() {
        let strategy = HmacStrategy::new(&SecretString::from(SECRET.to_string())).unwrap();
        let first = strategy.sign(b"a=1");
        assert_eq!(first, strategy.sign(b"a=1"));
        assert_ne!(first, strategy.sign(b"a=2"));
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let strategy = HmacStrategy::new(&SecretString::from(SECRET.to_string())).unwrap();
        let debug = format!("{:?}", strategy);
        assert!(!debug.contains(SECRET));
        assert_eq!(strategy.name(), "hmac");
    }
}
