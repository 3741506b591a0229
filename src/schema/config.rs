/// Generator configuration, loadable from RON.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// What to do when the current prefix has never been followed by anything.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum UnseenPrefixPolicy {
    /// End the text.
    #[default]
    Terminate,
    /// With `probability`, restart the chain from a random opening prefix
    /// instead of ending; otherwise end.
    Reroll { probability: f64 },
}

impl UnseenPrefixPolicy {
    /// The re-roll odds the bot used to run with: restart on 8 of 11 draws.
    pub fn historical_reroll() -> Self {
        Self::Reroll {
            probability: 8.0 / 11.0,
        }
    }
}

/// Construction parameters for a [`Generator`](crate::core::generator::Generator).
///
/// Missing fields take their defaults, so `()` is a valid RON config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Tokens per chain state. Smaller is more random, larger more faithful.
    pub prefix_len: usize,
    /// Character budget for one generated text.
    pub char_limit: usize,
    /// Merge spellings that differ only in case or punctuation.
    pub canonical: bool,
    pub unseen_prefix: UnseenPrefixPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            prefix_len: 1,
            char_limit: 140,
            canonical: false,
            unseen_prefix: UnseenPrefixPolicy::Terminate,
        }
    }
}

impl GeneratorConfig {
    pub fn new(prefix_len: usize, char_limit: usize) -> Self {
        Self {
            prefix_len,
            char_limit,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix_len == 0 {
            return Err(ConfigError::Invalid(
                "prefix length must be at least 1".to_string(),
            ));
        }
        if self.char_limit == 0 {
            return Err(ConfigError::Invalid(
                "character limit must be at least 1".to_string(),
            ));
        }
        if let UnseenPrefixPolicy::Reroll { probability } = self.unseen_prefix {
            if !(0.0..=1.0).contains(&probability) {
                return Err(ConfigError::Invalid(format!(
                    "reroll probability must be within [0, 1], got {}",
                    probability
                )));
            }
        }
        Ok(())
    }

    /// Load and validate a config from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<GeneratorConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse and validate a config from a RON string.
    pub fn parse_ron(input: &str) -> Result<GeneratorConfig, ConfigError> {
        let config: GeneratorConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }
}
