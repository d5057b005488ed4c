//! Eligibility of text nodes for scanning.

use serde::Serialize;

use crate::dom::NodeRef;
use crate::processed::ProcessedSet;

/// Containers whose text is code, markup or verbatim output.
pub const RAW_TEXT_TAGS: [&str; 7] = ["script", "style", "noscript", "code", "pre", "kbd", "samp"];

/// Form controls; their text is user input or widget chrome.
pub const FORM_CONTROL_TAGS: [&str; 4] = ["input", "textarea", "select", "button"];

/// Outcome of [`TreeFilter::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Eligible,
    /// Not a text node, or shorter than the configured minimum.
    TooShort,
    /// No parent element.
    Detached,
    /// Direct container is a raw-text element.
    RawText,
    Editable,
    FormControl,
    AlreadyProcessed,
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible)
    }
}

#[derive(Debug, Clone)]
pub struct TreeFilter {
    min_text_len: usize,
}

impl TreeFilter {
    pub fn new(min_text_len: usize) -> Self {
        Self { min_text_len }
    }

    pub fn evaluate(&self, node: &NodeRef, processed: &ProcessedSet) -> Verdict {
        let Some(text) = node.text() else {
            return Verdict::TooShort;
        };
        if text.chars().count() < self.min_text_len {
            return Verdict::TooShort;
        }
        let Some(container) = node.parent() else {
            return Verdict::Detached;
        };
        if container
            .tag()
            .is_some_and(|tag| RAW_TEXT_TAGS.contains(&tag))
        {
            return Verdict::RawText;
        }
        if container.is_content_editable() {
            return Verdict::Editable;
        }
        if container.closest(&FORM_CONTROL_TAGS).is_some() {
            return Verdict::FormControl;
        }
        if processed.contains(node) {
            return Verdict::AlreadyProcessed;
        }
        Verdict::Eligible
    }
}

impl Default for TreeFilter {
    fn default() -> Self {
        Self::new(3)
    }
}
