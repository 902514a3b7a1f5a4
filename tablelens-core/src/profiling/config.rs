//! Profiler configuration.

use serde::{Deserialize, Serialize};

/// How the profiler treats rows whose keys differ from the first row's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaDriftPolicy {
    /// Missing keys count as null and extra keys are ignored
    #[default]
    Tolerate,
    /// The first drifting row fails the profile
    Reject,
}

/// Full-scan profiler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilerConfig {
    /// Schema drift handling
    pub drift_policy: SchemaDriftPolicy,
}

impl ProfilerConfig {
    /// Creates a new profiler config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the schema drift policy.
    pub fn with_drift_policy(mut self, policy: SchemaDriftPolicy) -> Self {
        self.drift_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerates_drift() {
        assert_eq!(ProfilerConfig::default().drift_policy, SchemaDriftPolicy::Tolerate);
    }

    #[test]
    fn test_builder() {
        let config = ProfilerConfig::new().with_drift_policy(SchemaDriftPolicy::Reject);
        assert_eq!(config.drift_policy, SchemaDriftPolicy::Reject);
    }

    #[test]
    fn test_policy_serializes_lowercase() {
        let json = serde_json::to_string(&SchemaDriftPolicy::Reject).unwrap();
        assert_eq!(json, "\"reject\"");
    }
}
