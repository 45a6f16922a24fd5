//! Authorization levels and signature schemes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Capability required by an endpoint or granted by a configuration.
///
/// Levels are totally ordered; an endpoint runs under a configuration only
/// when `config.level >= endpoint.required_level`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthLevel {
    #[default]
    None,
    UserData,
    UserStream,
    Trade,
    Margin,
}

impl AuthLevel {
    pub const ALL: [AuthLevel; 5] = [
        AuthLevel::None,
        AuthLevel::UserData,
        AuthLevel::UserStream,
        AuthLevel::Trade,
        AuthLevel::Margin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthLevel::None => "NONE",
            AuthLevel::UserData => "USER_DATA",
            AuthLevel::UserStream => "USER_STREAM",
            AuthLevel::Trade => "TRADE",
            AuthLevel::Margin => "MARGIN",
        }
    }

    /// Whether a configuration at this level may call an endpoint requiring `required`.
    pub fn permits(&self, required: AuthLevel) -> bool {
        *self >= required
    }
}

impl fmt::Display for AuthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuthLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown auth level '{}'", s))
    }
}

/// Request signing scheme of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureScheme {
    Hmac,
    Rsa,
    Ed25519,
    None,
}

impl SignatureScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureScheme::Hmac => "HMAC",
            SignatureScheme::Rsa => "RSA",
            SignatureScheme::Ed25519 => "Ed25519",
            SignatureScheme::None => "NONE",
        }
    }

    pub fn requires_key_file(&self) -> bool {
        matches!(self, SignatureScheme::Rsa | SignatureScheme::Ed25519)
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
