//! API key protection
//!
//! The indexing API key is held in a [`secrecy::Secret`] so it is zeroed on
//! drop, redacted in `Debug` output, and only readable through
//! `expose_secret()` at the point where a request header is built.
//!
//! ```rust
//! use catalog_sync::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("0123456789abcdef".to_string());
//! assert_eq!(key.expose_secret().as_ref(), "0123456789abcdef");
//! assert!(!format!("{key:?}").contains("0123456789abcdef"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String payload of a secret, zeroized on drop
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl SecretValue {
    /// Whether the secret is an empty string
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Secret string used for credentials in configuration
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string into a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_round_trip_through_config() {
        #[derive(Serialize, Deserialize)]
        struct Credentials {
            api_key: SecretString,
        }

        let parsed: Credentials = toml::from_str("api_key = \"abc123\"").unwrap();
        assert_eq!(parsed.api_key.expose_secret(), "abc123");
        assert!(!parsed.api_key.expose_secret().is_empty());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-key".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("sensitive-key"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_blank_secret_is_empty() {
        let secret = secret_string("   ".to_string());
        assert!(secret.expose_secret().is_empty());
    }
}
