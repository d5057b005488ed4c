//! Driver and watcher configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AnnotateError;
use crate::filter::RAW_TEXT_TAGS;

/// Configuration for [`AnnotationDriver`](crate::AnnotationDriver) and
/// [`MutationWatcher`](crate::MutationWatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// Semantic version of the annotation behaviour. Only `1` exists today.
    pub version: u32,

    /// Element that replaces an annotated text node.
    pub wrapper_tag: String,

    /// Class carried by every wrapper, for styling and identification.
    pub marker_class: String,

    /// Text nodes shorter than this many characters are never scanned.
    pub min_text_len: usize,

    /// Quiet period after the last qualifying mutation before a rescan.
    pub debounce_ms: u64,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            version: 1,
            wrapper_tag: "span".to_string(),
            marker_class: "uconv".to_string(),
            min_text_len: 3,
            debounce_ms: 150,
        }
    }
}

impl AnnotateConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<(), AnnotateError> {
        if self.version != 1 {
            return Err(AnnotateError::invalid_config(format!(
                "unsupported annotate version {}",
                self.version
            )));
        }
        let tag = self.wrapper_tag.as_str();
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(AnnotateError::invalid_config(format!(
                "wrapper_tag `{tag}` is not a valid element name"
            )));
        }
        if RAW_TEXT_TAGS.contains(&tag.to_ascii_lowercase().as_str()) {
            return Err(AnnotateError::invalid_config(format!(
                "wrapper_tag `{tag}` is a raw-text element"
            )));
        }
        if self.marker_class.is_empty() || self.marker_class.chars().any(char::is_whitespace) {
            return Err(AnnotateError::invalid_config(
                "marker_class must be a single non-empty class name",
            ));
        }
        if self.min_text_len == 0 {
            return Err(AnnotateError::invalid_config("min_text_len must be > 0"));
        }
        Ok(())
    }
}
