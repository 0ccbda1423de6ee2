// crates/feed-reader/src/config.rs
//! Reader configuration
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change:
//!
//! ```toml
//! max_document_size = 1048576
//! lenient_dates = true
//! ```

use crate::error::{FeedError, FeedResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default limit on the size of an imported document (16 MiB)
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Options applied when importing feeds and resolving their fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Documents larger than this many bytes are rejected before parsing
    pub max_document_size: usize,

    /// Try every date profile after the one the feed format dictates
    pub lenient_dates: bool,

    /// Resolve relative link URLs against the entry base
    pub resolve_relative_urls: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            lenient_dates: false,
            resolve_relative_urls: true,
        }
    }
}

impl ReaderConfig {
    /// Parses and validates a config from TOML
    pub fn from_toml_str(content: &str) -> FeedResult<Self> {
        let config: ReaderConfig =
            toml::from_str(content).map_err(|e| FeedError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a config file
    pub fn load(path: impl AsRef<Path>) -> FeedResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| FeedError::Config(format!("{}: {}", path.display(), e)))?;
        log::debug!("Loaded reader config from {}", path.display());
        Ok(config)
    }

    /// Serializes the config to TOML
    pub fn to_toml_string(&self) -> FeedResult<String> {
        toml::to_string(self).map_err(|e| FeedError::Config(e.to_string()))
    }

    /// Checks that all values are usable
    pub fn validate(&self) -> FeedResult<()> {
        if self.max_document_size == 0 {
            return Err(FeedError::Config(
                "max_document_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.max_document_size, DEFAULT_MAX_DOCUMENT_SIZE);
        assert!(!config.lenient_dates);
        assert!(config.resolve_relative_urls);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ReaderConfig::from_toml_str("lenient_dates = true").expect("Should parse");
        assert!(config.lenient_dates);
        assert_eq!(config.max_document_size, DEFAULT_MAX_DOCUMENT_SIZE);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = ReaderConfig::from_toml_str("").expect("Should parse");
        assert_eq!(config, ReaderConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let result = ReaderConfig::from_toml_str("this is not valid TOML {{{");
        assert!(matches!(result, Err(FeedError::Config(_))));
    }

    #[test]
    fn test_zero_size_rejected() {
        let result = ReaderConfig::from_toml_str("max_document_size = 0");
        assert!(matches!(result, Err(FeedError::Config(ref msg)) if msg.contains("max_document_size")));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ReaderConfig {
            max_document_size: 1024,
            lenient_dates: true,
            resolve_relative_urls: false,
        };
        let text = config.to_toml_string().expect("Should serialize");
        assert_eq!(ReaderConfig::from_toml_str(&text).expect("Should parse"), config);
    }
}
