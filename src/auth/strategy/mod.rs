//! Signing strategies for exchange requests.

mod ed25519;
mod hmac;
mod rsa;
mod traits;

pub use ed25519::Ed25519Strategy;
pub use hmac::HmacStrategy;
pub use rsa::RsaStrategy;
pub use traits::AuthStrategy;
