//! Account identity type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Identity of a ledger participant, administrator or custody vault.
///
/// The ledger never interprets the identity beyond equality; it is the key
/// under which positions and tiers are stored.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Longest identity accepted by [`AccountId::parse`].
    pub const MAX_LEN: usize = 128;

    /// Wrap a raw identity string without validation.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse and validate an identity.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TypesError::InvalidAccount("identity is empty".into()));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(TypesError::InvalidAccount(format!(
                "identity longer than {} bytes",
                Self::MAX_LEN
            )));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(TypesError::InvalidAccount(format!(
                "identity contains whitespace: {trimmed:?}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Return the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes used as a storage key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
