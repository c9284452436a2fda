//! Current actor identity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Address-like unique key of an actor.
///
/// Addresses are hex strings compared case-insensitively, so they are stored
/// lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("Address cannot be empty".to_string()));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(Error::InvalidInput(format!(
                "Address must not contain whitespace: {trimmed}"
            )));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// The current authenticated actor.
///
/// Compared by value: a new `Identity` that equals the previous one is not an
/// identity change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub address: Address,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub authenticated: bool,
}

impl Identity {
    /// Create an authenticated identity for the given address.
    #[must_use]
    pub const fn authenticated(address: Address) -> Self {
        Self {
            address,
            name: None,
            authenticated: true,
        }
    }

    /// Create an identity that has not passed authentication.
    #[must_use]
    pub const fn anonymous(address: Address) -> Self {
        Self {
            address,
            name: None,
            authenticated: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_lowercased_and_trimmed() {
        let address = Address::new("  0xAbCdEf  ").unwrap();
        assert_eq!(address.as_str(), "0xabcdef");
    }

    #[test]
    fn address_rejects_empty_and_inner_whitespace() {
        assert!(Address::new("   ").is_err());
        assert!(Address::new("0xab cd").is_err());
    }

    #[test]
    fn identity_compares_by_value() {
        let a = Identity::authenticated("0xAB".parse().unwrap());
        let b = Identity::authenticated("0xab".parse().unwrap());
        assert_eq!(a, b);
        assert_ne!(a, b.with_name("Ada"));
    }

    #[test]
    fn address_deserializes_through_validation() {
        let parsed: Address = serde_json::from_str("\"0xDEAD\"").unwrap();
        assert_eq!(parsed.as_str(), "0xdead");
        assert!(serde_json::from_str::<Address>("\"  \"").is_err());
    }
}
