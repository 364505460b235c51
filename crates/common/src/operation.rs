//! Resource operations applied by participants
//!
//! An operation names a single resource and a signed delta, written as
//! `<resource>=<delta>`, e.g. `x=-10`. Committing it adds the delta to the
//! resource's balance.

use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed `name=delta` mutation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    /// Resource the operation targets
    pub resource: String,
    /// Signed amount added to the resource on commit
    pub delta: i64,
}

impl Operation {
    pub fn new(resource: impl Into<String>, delta: i64) -> Self {
        Self {
            resource: resource.into(),
            delta,
        }
    }

    /// Parse from the textual `name=delta` form
    pub fn parse(s: &str) -> Result<Self> {
        let (name, delta) = s
            .split_once('=')
            .ok_or_else(|| CommonError::InvalidOperation(format!("missing '=' in {:?}", s)))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(CommonError::InvalidOperation(format!(
                "missing resource name in {:?}",
                s
            )));
        }

        let delta = delta.trim().parse::<i64>().map_err(|e| {
            CommonError::InvalidOperation(format!("bad delta in {:?}: {}", s, e))
        })?;

        Ok(Self::new(name, delta))
    }

    /// Balance after applying this operation, or `None` on overflow
    pub fn apply_to(&self, balance: i64) -> Option<i64> {
        balance.checked_add(self.delta)
    }
}

impl FromStr for Operation {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.resource, self.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_debit() {
        let op = Operation::parse("x=-10").unwrap();
        assert_eq!(op.resource, "x");
        assert_eq!(op.delta, -10);
        assert_eq!(op.apply_to(100), Some(90));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let op: Operation = " balance = 25 ".parse().unwrap();
        assert_eq!(op, Operation::new("balance", 25));
        assert_eq!(op.to_string(), "balance=25");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Operation::parse("x"),
            Err(CommonError::InvalidOperation(_))
        ));
        assert!(matches!(
            Operation::parse("=5"),
            Err(CommonError::InvalidOperation(_))
        ));
        assert!(matches!(
            Operation::parse("x=ten"),
            Err(CommonError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_apply_overflow() {
        let op = Operation::new("x", 1);
        assert_eq!(op.apply_to(i64::MAX), None);
    }
}
