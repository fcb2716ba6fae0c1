//! Gateway Configuration
//!
//! Settings for assembling a [`Gateway`](crate::gateway::Gateway): resolver
//! registration strictness, schema validation of resolver keys, and the
//! default page size.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "RELGRAPH_CONFIG_IO",
            ConfigError::Parse(_) => "RELGRAPH_CONFIG_PARSE",
            ConfigError::Invalid(_) => "RELGRAPH_CONFIG_INVALID",
        }
    }
}

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Manual registration of an existing resolver key is an error (default: false)
    #[serde(default)]
    pub strict_registration: bool,

    /// Check resolver keys against the schema on assembly (default: true)
    #[serde(default = "default_validate_resolvers")]
    pub validate_resolvers: bool,

    /// Page limit applied when the caller gives none (default: none)
    #[serde(default)]
    pub default_page_limit: Option<u64>,
}

fn default_validate_resolvers() -> bool {
    true
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            strict_registration: false,
            validate_resolvers: default_validate_resolvers(),
            default_page_limit: None,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: GatewayConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Strict configuration: duplicate manual keys are rejected
    pub fn strict() -> Self {
        Self {
            strict_registration: true,
            ..Default::default()
        }
    }

    pub fn with_default_page_limit(mut self, limit: u64) -> Self {
        self.default_page_limit = Some(limit);
        self
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.default_page_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "default_page_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(!config.strict_registration);
        assert!(config.validate_resolvers);
        assert_eq!(config.default_page_limit, None);
    }

    #[test]
    fn test_load_applies_defaults() {
        let file = write_config(r#"{"strict_registration": true}"#);
        let config = GatewayConfig::load(file.path()).unwrap();

        assert!(config.strict_registration);
        assert!(config.validate_resolvers);
        assert_eq!(config.default_page_limit, None);
    }

    #[test]
    fn test_load_full() {
        let file = write_config(
            r#"{"strict_registration": false, "validate_resolvers": false, "default_page_limit": 50}"#,
        );
        let config = GatewayConfig::load(file.path()).unwrap();
        assert_eq!(config, GatewayConfig {
            strict_registration: false,
            validate_resolvers: false,
            default_page_limit: Some(50),
        });
    }

    #[test]
    fn test_load_errors() {
        let file = write_config("{not json");
        assert_eq!(GatewayConfig::load(file.path()).unwrap_err().code(), "RELGRAPH_CONFIG_PARSE");

        let file = write_config(r#"{"default_page_limit": 0}"#);
        assert_eq!(GatewayConfig::load(file.path()).unwrap_err().code(), "RELGRAPH_CONFIG_INVALID");

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(GatewayConfig::load(&missing).unwrap_err().code(), "RELGRAPH_CONFIG_IO");
    }
}
