//! Participant configuration

use std::collections::BTreeMap;

/// Initial balance of the default resource `x`
pub const DEFAULT_BALANCE: i64 = 100;

/// Configuration for a participant node
#[derive(Debug, Clone)]
pub struct ParticipantConfig {
    /// Participant identifier, also used to address it
    pub node_id: String,
    /// Resources and their balances at startup
    pub resources: BTreeMap<String, i64>,
}

impl ParticipantConfig {
    /// Creates a configuration holding `x = 100`.
    pub fn new(node_id: impl Into<String>) -> Self {
        let mut resources = BTreeMap::new();
        resources.insert("x".to_string(), DEFAULT_BALANCE);

        Self {
            node_id: node_id.into(),
            resources,
        }
    }

    /// Replaces the initial resources.
    pub fn with_resources(mut self, resources: impl IntoIterator<Item = (String, i64)>) -> Self {
        self.resources = resources.into_iter().collect();
        self
    }

    /// Adds or overrides one initial resource.
    pub fn with_resource(mut self, name: impl Into<String>, balance: i64) -> Self {
        self.resources.insert(name.into(), balance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resource() {
        let config = ParticipantConfig::new("B");
        assert_eq!(config.resources.get("x"), Some(&100));
    }

    #[test]
    fn test_replace_resources() {
        let config = ParticipantConfig::new("B").with_resources([("y".to_string(), 5)]);
        assert_eq!(config.resources.len(), 1);
        assert_eq!(config.resources.get("y"), Some(&5));
    }
}
