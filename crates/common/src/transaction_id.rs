//! Transaction identifier
//!
//! Transactions are named by the client that triggers them, so the identifier
//! is an opaque string. The only constraint is that it is non-empty; uniqueness
//! is enforced by the coordinator's registry.

use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Client-chosen transaction identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(String);

impl TransactionId {
    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self> {
        Self::try_from(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TransactionId {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self> {
        if value.trim().is_empty() {
            return Err(CommonError::EmptyTransactionId);
        }
        Ok(Self(value))
    }
}

impl FromStr for TransactionId {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<TransactionId> for String {
    fn from(id: TransactionId) -> Self {
        id.0
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
