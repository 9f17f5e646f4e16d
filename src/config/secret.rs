//! Secure credential handling using the secrecy crate
//!
//! Credentials loaded from configuration are wrapped in `Secret` so they are
//! zeroed on drop and redacted from Debug output. Call `expose_secret()` at
//! the single point where the value is actually sent over the wire.

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the traits `Secret` requires
#[derive(Clone, Debug, Zeroize)]
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

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl serde::Serialize for SecretValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for SecretValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A string credential that is zeroized on drop
pub type SecretString = Secret<SecretValue>;

/// Wrap a plain string into a [`SecretString`]
pub fn secret_from(value: impl Into<String>) -> SecretString {
    Secret::new(SecretValue(value.into()))
}
