//! The text transform: every recognizer, in order, over one string.

use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::ConvertConfig;
use crate::error::ConvertError;
use crate::format::NumberFormat;
use crate::guard::is_annotated_at;
use crate::number::FRACTION_GLYPHS;
use crate::patterns::{Recognizer, UnitPatternSet};
use crate::rules::render;
use crate::types::UnitMatch;


/// One annotation inserted by the engine.
///
/// `unit_match` offsets refer to the text as seen by the pass that produced
/// the annotation, which already contains the annotations of earlier passes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub unit_match: UnitMatch,
    /// Metric text placed inside the parentheses, e.g. `8.05 km`.
    pub rendered: String,
}

/// Converted text plus what was inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub text: String,
    pub annotations: Vec<Annotation>,
}

impl Conversion {
    pub fn changed(&self) -> bool {
        !self.annotations.is_empty()
    }
}

/// Applies the unit recognizers to plain strings.
///
/// The engine is immutable after construction and cheap to clone; all
/// recognizers are compiled once per process.
#[derive(Debug, Clone)]
pub struct ConversionEngine {
    config: ConvertConfig,
    format: NumberFormat,
    patterns: &'static UnitPatternSet,
}

impl Default for ConversionEngine {
    fn default() -> Self {
        let config = ConvertConfig::default();
        Self {
            format: NumberFormat::for_locale(&config.locale),
            config,
            patterns: UnitPatternSet::standard(),
        }
    }
}

impl ConversionEngine {
    pub fn new(config: ConvertConfig) -> Result<Self, ConvertError> {
        config.validate()?;
        Ok(Self {
            format: NumberFormat::for_locale(config.locale.trim()),
            config,
            patterns: UnitPatternSet::standard(),
        })
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn number_format(&self) -> &NumberFormat {
        &self.format
    }

    /// Annotate every recognized measurement in `text`.
    pub fn convert(&self, text: &str) -> String {
        self.convert_detailed(text).text
    }

    /// Like [`convert`](Self::convert), also returning the annotations.
    pub fn convert_detailed(&self, text: &str) -> Conversion {
        let mut annotations = Vec::new();
        if !may_contain_measurement(text) {
            return Conversion {
                text: text.to_string(),
                annotations,
            };
        }

        let mut current = Cow::Borrowed(text);
        for recognizer in self.patterns.iter() {
            if let Some(next) = self.apply(recognizer, &current, &mut annotations) {
                current = Cow::Owned(next);
            }
        }

        Conversion {
            text: current.into_owned(),
            annotations,
        }
    }

    /// One recognizer pass. `None` when nothing was inserted.
    fn apply(
        &self,
        recognizer: &Recognizer,
        input: &str,
        annotations: &mut Vec<Annotation>,
    ) -> Option<String> {
        let candidates = recognizer.scan(input);
        if candidates.is_empty() {
            return None;
        }

        let mut out = String::with_capacity(input.len() + candidates.len() * 16);
        let mut copied = 0;
        for candidate in candidates {
            if is_annotated_at(input, candidate.end) {
                trace!(
                    kind = ?candidate.kind,
                    literal = candidate.literal,
                    "already_annotated"
                );
                continue;
            }

            let unit_match = match candidate.parse() {
                Ok(unit_match) => unit_match,
                Err(err) => {
                    debug!(
                        kind = ?candidate.kind,
                        literal = candidate.literal,
                        error = %err,
                        "magnitude_parse_failure"
                    );
                    continue;
                }
            };
            let Some(rendered) = render(&unit_match, &self.format) else {
                trace!(literal = candidate.literal, "conversion_not_applicable");
                continue;
            };

            out.push_str(&input[copied..candidate.end]);
            out.push_str(" (");
            out.push_str(&rendered);
            out.push(')');
            copied = candidate.end;
            annotations.push(Annotation {
                unit_match,
                rendered,
            });
        }

        if copied == 0 {
            return None;
        }
        out.push_str(&input[copied..]);
        Some(out)
    }
}

/// Every recognizer needs an ASCII digit or a fraction glyph.
fn may_contain_measurement(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_ascii_digit() || FRACTION_GLYPHS.contains(c))
}

/// Convert `text` with the default `en-US` presentation.
pub fn convert_text(text: &str) -> String {
    ConversionEngine::default().convert(text)
}
