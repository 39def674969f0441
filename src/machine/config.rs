//! Machine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("max_chained_transitions must be at least 1")]
    ZeroChainLimit,
}

/// Tunables shared by every machine flavor.
///
/// Missing fields fall back to their defaults when deserializing.
///
/// # Example
///
/// ```rust
/// use statecraft::machine::MachineConfig;
///
/// let config = MachineConfig::from_json(r#"{ "strict_transitions": true }"#).unwrap();
/// assert!(config.strict_transitions);
/// assert_eq!(config.history_limit, Some(64));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Maximum number of history entries kept, `None` for unbounded
    pub history_limit: Option<usize>,

    /// Maximum number of queued requests executed after a single call
    pub max_chained_transitions: usize,

    /// Reject transition table edges whose endpoints are not registered
    pub strict_transitions: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            history_limit: Some(64),
            max_chained_transitions: 16,
            strict_transitions: false,
        }
    }
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chained_transitions == 0 {
            return Err(ConfigError::ZeroChainLimit);
        }
        Ok(())
    }

    pub fn history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn max_chained_transitions(mut self, max: usize) -> Self {
        self.max_chained_transitions = max;
        self
    }

    pub fn strict_transitions(mut self, strict: bool) -> Self {
        self.strict_transitions = strict;
        self
    }
}
