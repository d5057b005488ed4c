//! Detection of measurements that already carry a metric annotation.

use once_cell::sync::Lazy;
use regex::Regex;

// Opening paren, any text without a closing one, a digit, then a metric unit
// right before the paren closes. Covers the engine's own output in every
// locale profile as well as hand-written "(about 8 km)".
static EXISTING_CONVERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\([^)]*?[0-9]\s*(?:km/h|km|cm|mm|ml|kg|m|g|°C|L/100km|L)\s*\)")
        .expect("existing conversion regex")
});

/// True when `rest` (the text right after a match) starts with a
/// parenthesised metric value.
pub fn followed_by_conversion(rest: &str) -> bool {
    EXISTING_CONVERSION.is_match(rest)
}

/// True when the match ending at byte offset `end` of `text` is already
/// annotated.
pub fn is_annotated_at(text: &str, end: usize) -> bool {
    text.get(end..).is_some_and(followed_by_conversion)
}
