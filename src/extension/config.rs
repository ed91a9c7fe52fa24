//! Configuration file parsing.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::binder::data_binder::DataBinder;
use crate::binder::error::{BindError, Result};
use crate::date_format::DEFAULT_PATTERN;

/// Store settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Pattern used to read and write dates in the store.
    pub date_format: String,
}

impl Default for BinderConfig {
    fn default() -> Self {
        BinderConfig {
            date_format: DEFAULT_PATTERN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Used when a filter tag leaves its load order unset.
    pub default_load_order: i32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            default_load_order: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Used when a service tag leaves its error message unset.
    pub default_error_message: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            default_error_message: "Error executing service".to_string(),
        }
    }
}

/// Complete configuration. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TwineConfig {
    pub binder: BinderConfig,
    pub filters: FilterConfig,
    pub services: ServiceConfig,
}

impl TwineConfig {
    /// Load configuration from a TOML file.
    ///
    /// Expected format:
    /// ```toml
    /// [binder]
    /// date_format = "M/d/yy h:mm a"
    ///
    /// [filters]
    /// default_load_order = 100
    ///
    /// [services]
    /// default_error_message = "Error executing service"
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BindError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BindError::Config(e.to_string()))
    }

    /// A fresh, empty store using the configured date format.
    pub fn new_binder(&self) -> Result<DataBinder> {
        DataBinder::with_date_pattern(&self.binder.date_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::data_binder::Binder;

    #[test]
    fn test_parse_empty_config() {
        let config = TwineConfig::parse("").unwrap();
        assert_eq!(config, TwineConfig::default());
        assert_eq!(config.binder.date_format, "M/d/yy h:mm a");
        assert_eq!(config.filters.default_load_order, 100);
        assert_eq!(config.services.default_error_message, "Error executing service");
    }

    #[test]
    fn test_parse_partial_config() {
        let config = TwineConfig::parse(
            r#"
            [binder]
            date_format = "yyyy-MM-dd"

            [filters]
            default_load_order = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.binder.date_format, "yyyy-MM-dd");
        assert_eq!(config.filters.default_load_order, 5);
        assert_eq!(config.services, ServiceConfig::default());

        let binder = config.new_binder().unwrap();
        assert_eq!(binder.date_format().pattern(), "yyyy-MM-dd");
    }

    #[test]
    fn test_malformed_config() {
        match TwineConfig::parse("[filters]\ndefault_load_order = \"soon\"") {
            Err(BindError::Config(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_format_fails_binder_creation() {
        let config = TwineConfig::parse("[binder]\ndate_format = \"yyyy-QQ\"").unwrap();
        assert!(config.new_binder().is_err());
    }
}
