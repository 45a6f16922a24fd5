//! Request signing strategy trait.

use std::fmt::Debug;

use crate::auth::SignatureScheme;

/// Signing strategy interface.
///
/// Implementations hold fully parsed key material; signing never fails.
pub trait AuthStrategy: Send + Sync + Debug {
    fn scheme(&self) -> SignatureScheme;

    /// Signs `payload` and returns the textual signature the exchange expects.
    fn sign(&self, payload: &[u8]) -> String;

    /// Returns the strategy name for logging/debugging.
    fn name(&self) -> &'static str;
}
