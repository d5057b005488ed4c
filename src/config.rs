//! YAML configuration file support.
//!
//! Both stages can be configured from one file and loaded at runtime:
//!
//! ```yaml
//! # metricate configuration
//! version: "1.0"
//! name: "reader view"
//!
//! convert:
//!   version: 1
//!   locale: "de-DE"
//!
//! annotate:
//!   version: 1
//!   wrapper_tag: "span"
//!   marker_class: "uconv"
//!   min_text_len: 3
//!   debounce_ms: 150
//! ```
//!
//! Every section and every field is optional; omitted values take the
//! library defaults.

use std::fs;
use std::path::Path;

use annotate::AnnotateConfig;
use convert::ConvertConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for the conversion engine and annotation driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MetricateConfig {
    /// Configuration format version
    #[serde(default = "default_format_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Number presentation for emitted metric values
    #[serde(default)]
    pub convert: ConvertConfig,

    /// Wrapper element, marker class, minimum text length and debounce
    #[serde(default)]
    pub annotate: AnnotateConfig,
}

impl MetricateConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: MetricateConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.convert
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("convert: {err}")))?;
        self.annotate
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("annotate: {err}")))?;
        Ok(())
    }
}

impl Default for MetricateConfig {
    fn default() -> Self {
        Self {
            version: default_format_version(),
            name: None,
            convert: ConvertConfig::default(),
            annotate: AnnotateConfig::default(),
        }
    }
}

fn default_format_version() -> String {
    "1.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "reader view"
convert:
  locale: "de-DE"
annotate:
  marker_class: "metric"
  debounce_ms: 300
"#;

        let config = MetricateConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, Some("reader view".to_string()));
        assert_eq!(config.convert.locale, "de-DE");
        assert_eq!(config.convert.version, 1);
        assert_eq!(config.annotate.marker_class, "metric");
        assert_eq!(config.annotate.debounce_ms, 300);
        assert_eq!(config.annotate.wrapper_tag, "span");
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1.0"
convert:
  version: 1
  locale: "fr"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = MetricateConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.convert.locale, "fr");
        assert_eq!(config.annotate, AnnotateConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let result = MetricateConfig::from_file("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigLoadError::FileRead(_))));
    }

    #[test]
    fn test_default_config() {
        let config = MetricateConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.name.is_none());
        assert!(config.validate().is_ok());
        assert_eq!(MetricateConfig::from_yaml("{}").unwrap(), config);
    }

    #[test]
    fn test_unsupported_version() {
        let result = MetricateConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(
            result,
            Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }

    #[test]
    fn test_stage_validation() {
        let yaml = r#"
version: "1.0"
annotate:
  wrapper_tag: "script"
"#;
        let err = MetricateConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("annotate"));
        assert!(err.to_string().contains("script"));

        let yaml = r#"
convert:
  locale: ""
"#;
        let err = MetricateConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("locale"));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = MetricateConfig::from_yaml("convert: [unclosed");
        assert!(matches!(result, Err(ConfigLoadError::YamlParse(_))));
    }

    #[test]
    fn test_full_yaml_roundtrip() {
        let config = MetricateConfig {
            name: Some("roundtrip".into()),
            convert: ConvertConfig::for_locale("en-IN"),
            ..MetricateConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(MetricateConfig::from_yaml(&yaml).unwrap(), config);
    }
}
