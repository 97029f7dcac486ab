use crate::core::errors::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Assembly limits and logging settings for dispatch trees.
///
/// Every limit is optional and unset by default, so a default config
/// accepts trees of any width and depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Maximum number of events a leaf accepts
    pub max_events_per_leaf: Option<usize>,
    /// Maximum number of children a serial or parallel node accepts
    pub max_children_per_node: Option<usize>,
    /// Maximum height of any subtree, a lone leaf has height 1
    pub max_tree_depth: Option<usize>,
    /// Max level for the fmt subscriber installed by `init_tracing`
    pub log_level: String,
    /// Include file and line in log records
    pub log_source_location: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_events_per_leaf: None,
            max_children_per_node: None,
            max_tree_depth: None,
            log_level: "info".to_string(),
            log_source_location: true,
        }
    }
}

impl FlowConfig {
    /// Create a new builder for FlowConfig
    pub fn builder() -> FlowConfigBuilder {
        FlowConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("max_events_per_leaf", self.max_events_per_leaf),
            ("max_children_per_node", self.max_children_per_node),
            ("max_tree_depth", self.max_tree_depth),
        ];
        for (field, limit) in limits {
            if limit == Some(0) {
                return Err(FlowError::configuration_field(
                    format!("{} must be greater than 0", field),
                    field,
                ));
            }
        }
        self.level()?;
        Ok(())
    }

    /// Parse `log_level` into a tracing level
    pub fn level(&self) -> Result<tracing::Level> {
        tracing::Level::from_str(&self.log_level).map_err(|_| {
            FlowError::configuration_field(
                format!("unknown log level '{}'", self.log_level),
                "log_level",
            )
        })
    }

    /// Configuration for local development: verbose logging
    pub fn development() -> Self {
        Self {
            log_level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Configuration for production: tighter limits, quieter logs
    pub fn production() -> Self {
        Self {
            max_events_per_leaf: Some(256),
            max_children_per_node: Some(256),
            max_tree_depth: Some(32),
            log_level: "info".to_string(),
            log_source_location: false,
        }
    }

    /// Load and validate a YAML configuration document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FlowError::io(format!("read {}", path.display()), e))?;
        Self::from_yaml_str(&contents)
    }
}

/// Builder for FlowConfig
pub struct FlowConfigBuilder {
    config: FlowConfig,
}

impl FlowConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: FlowConfig::default(),
        }
    }

    pub fn max_events_per_leaf(mut self, max: usize) -> Self {
        self.config.max_events_per_leaf = Some(max);
        self
    }

    pub fn max_children_per_node(mut self, max: usize) -> Self {
        self.config.max_children_per_node = Some(max);
        self
    }

    pub fn max_tree_depth(mut self, max: usize) -> Self {
        self.config.max_tree_depth = Some(max);
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    pub fn log_source_location(mut self, enabled: bool) -> Self {
        self.config.log_source_location = enabled;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<FlowConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for FlowConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FlowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_children_per_node, None);
        assert_eq!(config.max_tree_depth, None);
        assert_eq!(config.level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(FlowConfig::development().validate().is_ok());
        assert!(FlowConfig::production().validate().is_ok());
        assert_eq!(
            FlowConfig::development().level().unwrap(),
            tracing::Level::DEBUG
        );
    }

    #[test]
    fn test_validation_errors() {
        let config = FlowConfig {
            max_children_per_node: Some(0),
            ..Default::default()
        };
        match config.validate() {
            Err(FlowError::Configuration { field, .. }) => {
                assert_eq!(field.as_deref(), Some("max_children_per_node"))
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }

        let config = FlowConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        match config.validate() {
            Err(FlowError::Configuration { field, .. }) => {
                assert_eq!(field.as_deref(), Some("log_level"))
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_builder() {
        let config = FlowConfig::builder()
            .max_events_per_leaf(3)
            .max_children_per_node(2)
            .max_tree_depth(4)
            .log_level("warn")
            .build()
            .unwrap();
        assert_eq!(config.max_events_per_leaf, Some(3));
        assert_eq!(config.max_children_per_node, Some(2));
        assert_eq!(config.max_tree_depth, Some(4));

        assert!(FlowConfig::builder().max_tree_depth(0).build().is_err());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = FlowConfig::from_yaml_str("max_children_per_node: 8\nlog_level: debug\n").unwrap();
        assert_eq!(config.max_children_per_node, Some(8));
        assert_eq!(config.max_events_per_leaf, None);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(FlowConfig::from_json_str(r#"{"max_events_per_leaf": 0}"#).is_err());
        assert!(FlowConfig::from_json_str(r#"{"max_tree_depth": 5}"#).is_ok());
    }
}
