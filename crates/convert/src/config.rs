use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Configuration for [`ConversionEngine`](crate::ConversionEngine).
///
/// The locale is an opaque identifier such as `en-US`, `de`, or `fr_CA`; it only
/// affects how emitted numbers are presented (decimal mark and digit grouping).
/// Recognition of source text is locale independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Semantic version of the conversion behaviour. Only `1` exists today.
    pub version: u32,

    /// Locale used for number formatting. Unknown locales format like `en`.
    pub locale: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            version: 1,
            locale: "en-US".to_string(),
        }
    }
}

impl ConvertConfig {
    /// Default configuration with a different locale.
    pub fn for_locale(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            ..Self::default()
        }
    }

    /// Reject configurations the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.version != 1 {
            return Err(ConvertError::invalid_config(format!(
                "unsupported convert version {}",
                self.version
            )));
        }
        let locale = self.locale.trim();
        if locale.is_empty() {
            return Err(ConvertError::invalid_config("locale must not be empty"));
        }
        if !locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConvertError::invalid_config(format!(
                "locale `{}` contains characters outside [A-Za-z0-9_-]",
                self.locale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ConvertConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_version_and_bad_locales() {
        let cfg = ConvertConfig {
            version: 2,
            ..ConvertConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConvertError::InvalidConfig(_))));

        assert!(ConvertConfig::for_locale("  ").validate().is_err());
        assert!(ConvertConfig::for_locale("en US").validate().is_err());
        assert!(ConvertConfig::for_locale("pt_BR").validate().is_ok());
    }
}
