//! The fixed registry of unit recognizers.
//!
//! Each recognizer is a regular expression plus a few context checks the
//! `regex` crate cannot express (it has no look-behind): a match must not
//! start inside a word or a number, a bare-quote inch must not run into a
//! following word, and single-unit feet/inch matches stand aside for the
//! dimension and feet-and-inches recognizers.
//!
//! Alternations list longer unit words first (`ounces|ounce`, `miles|mile|mi`)
//! because the engine is leftmost-first: the first alternative that matches
//! wins, and a shorter one would leave a dangling `s` behind.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::MagnitudeError;
use crate::number::{fraction_pattern, FRACTION_GLYPHS};
use crate::types::{Magnitude, UnitFamily, UnitMatch};

/// Identity of one recognizer, in the order the engine applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerKind {
    Miles,
    MilesPerHour,
    Feet,
    Inches,
    FluidOunces,
    Ounces,
    Pounds,
    Fahrenheit,
    /// `5 ft 10 in`, `5' 10"`.
    FeetInches,
    /// `12 x 8 in`, `3 × 2 × 1 ft`.
    Dimensions,
    /// `8 lb 4 oz`.
    PoundOunce,
    /// `6 feet 2 inches`.
    FootInch,
    MilesPerGallon,
}

impl RecognizerKind {
    /// Application order. Later passes see the output of earlier ones.
    pub const ORDER: [RecognizerKind; 13] = [
        RecognizerKind::Miles,
        RecognizerKind::MilesPerHour,
        RecognizerKind::Feet,
        RecognizerKind::Inches,
        RecognizerKind::FluidOunces,
        RecognizerKind::Ounces,
        RecognizerKind::Pounds,
        RecognizerKind::Fahrenheit,
        RecognizerKind::FeetInches,
        RecognizerKind::Dimensions,
        RecognizerKind::PoundOunce,
        RecognizerKind::FootInch,
        RecognizerKind::MilesPerGallon,
    ];

    pub fn family(&self) -> UnitFamily {
        match self {
            RecognizerKind::Miles => UnitFamily::Miles,
            RecognizerKind::MilesPerHour => UnitFamily::MilesPerHour,
            RecognizerKind::Feet => UnitFamily::Feet,
            RecognizerKind::Inches => UnitFamily::Inches,
            RecognizerKind::FluidOunces => UnitFamily::FluidOunces,
            RecognizerKind::Ounces => UnitFamily::Ounces,
            RecognizerKind::Pounds => UnitFamily::Pounds,
            RecognizerKind::Fahrenheit => UnitFamily::Fahrenheit,
            RecognizerKind::FeetInches | RecognizerKind::FootInch => UnitFamily::FeetAndInches,
            RecognizerKind::Dimensions => UnitFamily::Dimensions,
            RecognizerKind::PoundOunce => UnitFamily::PoundsAndOunces,
            RecognizerKind::MilesPerGallon => UnitFamily::MilesPerGallon,
        }
    }

    fn pattern(&self) -> String {
        let n = number_pattern();
        let single = |unit: &str| {
            format!(
                r"(?P<approx>~\s*)?(?P<a>{n})(?:\s*[-–—]\s*(?P<b>{n}))?\s*(?P<unit>{unit})"
            )
        };
        match self {
            RecognizerKind::Miles => single(r"(?:miles|mile|mi)\b"),
            RecognizerKind::MilesPerHour => single(r"mph\b"),
            RecognizerKind::Feet => single(r"(?:feet|ft)\b"),
            RecognizerKind::Inches => single(r#"(?:inches|inch|in)\b|″|""#),
            RecognizerKind::FluidOunces => {
                single(r"fl\.?\s*oz\b\.?|fluid\s+ounces\b|fluid\s+ounce\b")
            }
            RecognizerKind::Ounces => single(r"(?:ounces|ounce|oz)\b"),
            RecognizerKind::Pounds => single(r"(?:lbs|lb|pounds|pound)\b"),
            RecognizerKind::Fahrenheit => {
                format!(r"(?P<approx>~\s*)?(?P<a>-?(?:{n}))\s*°\s*(?P<unit>F)\b")
            }
            RecognizerKind::FeetInches => format!(
                r#"(?P<a>{n})\s*(?:'|′|feet\b|ft\b)\s*(?P<b>{n})\s*(?:"|″|inches\b|inch\b|in\b)"#
            ),
            RecognizerKind::Dimensions => format!(
                r"(?P<a>{n})\s*[×x]\s*(?P<b>{n})(?:\s*[×x]\s*(?P<c>{n}))?\s*(?P<unit>(?:inches|inch|in|feet|ft|cm|mm)\b)"
            ),
            RecognizerKind::PoundOunce => format!(
                r"(?P<a>{n})\s*(?:lbs|lb|pounds|pound)\s+(?P<b>{n})\s*(?:ounces|ounce|oz)\b"
            ),
            RecognizerKind::FootInch => {
                format!(r"(?P<a>{n})\s*(?:feet|ft)\s+(?P<b>{n})\s*(?:inches|inch|in)\b")
            }
            RecognizerKind::MilesPerGallon => format!(r"(?P<a>{n})\s*(?P<unit>mpg)\b"),
        }
    }
}

/// Integer or decimal with an optional trailing fraction, or a bare fraction.
fn number_pattern() -> String {
    let frac = fraction_pattern();
    format!(r"[0-9]+(?:[.,][0-9]+)?(?:\s*(?:{frac}))?|(?:{frac})")
}

/// A recognizer hit that passed every context check but has not been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'t> {
    pub kind: RecognizerKind,
    pub start: usize,
    pub end: usize,
    pub literal: &'t str,
    pub approximate: bool,
    /// Captured numeric tokens, in source order.
    pub numbers: Vec<&'t str>,
    pub unit: &'t str,
}

impl Candidate<'_> {
    /// Parse every captured number. Any failure rejects the whole match.
    pub fn parse(&self) -> Result<UnitMatch, MagnitudeError> {
        let magnitudes = self
            .numbers
            .iter()
            .map(|token| Magnitude::parse(token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(UnitMatch {
            literal: self.literal.to_string(),
            family: self.kind.family(),
            magnitudes,
            unit: self.unit.to_string(),
            approximate: self.approximate,
            start: self.start,
            end: self.end,
        })
    }
}

#[derive(Debug)]
pub struct Recognizer {
    kind: RecognizerKind,
    regex: Regex,
}

impl Recognizer {
    fn new(kind: RecognizerKind) -> Self {
        let regex = Regex::new(&kind.pattern()).expect("unit recognizer regex");
        Self { kind, regex }
    }

    pub fn kind(&self) -> RecognizerKind {
        self.kind
    }

    /// Non-overlapping candidates in `text`, left to right.
    pub fn scan<'t>(&self, text: &'t str) -> Vec<Candidate<'t>> {
        let mut found = Vec::new();
        let mut at = 0;
        while at < text.len() {
            let Some(caps) = self.regex.captures_at(text, at) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            let (start, end) = (whole.start(), whole.end());
            if end > start && self.accepts(text, start, end) {
                found.push(self.candidate(&caps, start, end, whole.as_str()));
                at = end;
            } else {
                at = next_boundary(text, start);
            }
        }
        found
    }

    fn candidate<'t>(
        &self,
        caps: &Captures<'t>,
        start: usize,
        end: usize,
        literal: &'t str,
    ) -> Candidate<'t> {
        let numbers = ["a", "b", "c"]
            .iter()
            .filter_map(|name| caps.name(name).map(|m| m.as_str()))
            .collect();
        Candidate {
            kind: self.kind,
            start,
            end,
            literal,
            approximate: caps.name("approx").is_some(),
            numbers,
            unit: caps.name("unit").map_or("", |m| m.as_str()),
        }
    }

    fn accepts(&self, text: &str, start: usize, end: usize) -> bool {
        let before = &text[..start];
        let after = &text[end..];

        let mut rev = before.chars().rev();
        match rev.next() {
            Some(c) if c.is_alphanumeric() || c == '_' => return false,
            Some('.' | ',') if rev.next().is_some_and(|c| c.is_ascii_digit()) => return false,
            _ => {}
        }

        let last = text[start..end].chars().next_back();
        let next = after.chars().next();
        if let (Some(last), Some(next)) = (last, next) {
            if !last.is_alphanumeric() && next.is_alphanumeric() {
                return false;
            }
        }

        match self.kind {
            RecognizerKind::Inches => !follows_feet_prime(before) && !is_dimension_tail(before),
            RecognizerKind::Feet => !is_dimension_tail(before),
            _ => true,
        }
    }
}

fn next_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map_or(text.len(), |c| from + c.len_utf8())
}

fn is_number_tail(c: char) -> bool {
    c.is_ascii_digit() || FRACTION_GLYPHS.contains(c)
}

/// `12 x |8 in`: the magnitude is the last axis of a dimension.
fn is_dimension_tail(before: &str) -> bool {
    let Some(rest) = before.trim_end().strip_suffix(['x', '×']) else {
        return false;
    };
    rest.trim_end().chars().next_back().is_some_and(is_number_tail)
}

/// `5' |10"`: the inch part of a feet-and-inches expression.
fn follows_feet_prime(before: &str) -> bool {
    let Some(rest) = before.trim_end().strip_suffix(['\'', '′']) else {
        return false;
    };
    rest.chars().next_back().is_some_and(is_number_tail)
}

/// The recognizers in application order.
#[derive(Debug)]
pub struct UnitPatternSet {
    recognizers: Vec<Recognizer>,
}

static STANDARD: Lazy<UnitPatternSet> = Lazy::new(|| UnitPatternSet {
    recognizers: RecognizerKind::ORDER
        .iter()
        .map(|kind| Recognizer::new(*kind))
        .collect(),
});

impl UnitPatternSet {
    /// The process-wide registry, compiled on first use.
    pub fn standard() -> &'static UnitPatternSet {
        &STANDARD
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recognizer> {
        self.recognizers.iter()
    }

    pub fn get(&self, kind: RecognizerKind) -> Option<&Recognizer> {
        self.recognizers.iter().find(|r| r.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(kind: RecognizerKind, text: &str) -> Vec<Candidate<'_>> {
        UnitPatternSet::standard()
            .get(kind)
            .expect("registered recognizer")
            .scan(text)
    }

    fn literals(kind: RecognizerKind, text: &str) -> Vec<String> {
        scan(kind, text)
            .into_iter()
            .map(|c| c.literal.to_string())
            .collect()
    }

    #[test]
    fn registry_follows_application_order() {
        let set = UnitPatternSet::standard();
        assert_eq!(set.len(), 13);
        let kinds: Vec<_> = set.iter().map(Recognizer::kind).collect();
        assert_eq!(kinds, RecognizerKind::ORDER.to_vec());
    }

    #[test]
    fn longest_unit_word_wins() {
        let hits = scan(RecognizerKind::Ounces, "Weight: 4.3 ounces");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].literal, "4.3 ounces");
        assert_eq!(hits[0].unit, "ounces");

        assert_eq!(literals(RecognizerKind::Miles, "ran 3 miles"), ["3 miles"]);
        assert_eq!(literals(RecognizerKind::Pounds, "2 lbs."), ["2 lbs"]);
    }

    #[test]
    fn ranges_and_approximation() {
        let hits = scan(RecognizerKind::Miles, "Distance: ~5–10 miles");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].approximate);
        assert_eq!(hits[0].numbers, ["5", "10"]);
        assert_eq!(hits[0].literal, "~5–10 miles");
    }

    #[test]
    fn fractions_are_single_magnitudes() {
        let hits = scan(RecognizerKind::Pounds, "2½ pounds and 1 1/2 lb and ¾ lb");
        let numbers: Vec<_> = hits.iter().map(|c| c.numbers[0]).collect();
        assert_eq!(numbers, ["2½", "1 1/2", "¾"]);
    }

    #[test]
    fn matches_never_start_inside_words_or_numbers() {
        assert!(scan(RecognizerKind::Miles, "The 5-mile race").is_empty());
        assert!(scan(RecognizerKind::MilesPerHour, "A 20-mph wind").is_empty());
        assert!(scan(RecognizerKind::Miles, "route A5 mi").is_empty());
        assert!(scan(RecognizerKind::Feet, "v1.5 ft").is_empty());
        assert!(scan(RecognizerKind::Miles, "5 min walk").is_empty());
        assert!(scan(RecognizerKind::Inches, "5 inside").is_empty());
    }

    #[test]
    fn fluid_ounces_are_claimed_before_ounces() {
        assert_eq!(
            literals(RecognizerKind::FluidOunces, "22 fl. oz. bottle"),
            ["22 fl. oz."]
        );
        assert_eq!(
            literals(RecognizerKind::FluidOunces, "32 fluid ounces"),
            ["32 fluid ounces"]
        );
        assert!(scan(RecognizerKind::Ounces, "8 fl oz").is_empty());
    }

    #[test]
    fn bare_quote_inches() {
        assert_eq!(literals(RecognizerKind::Inches, r#"a 10" screen"#), [r#"10""#]);
        assert!(scan(RecognizerKind::Inches, r#"say 10"x"#).is_empty());
    }

    #[test]
    fn inch_and_feet_passes_defer_to_compounds() {
        assert!(scan(RecognizerKind::Inches, r#"He is 5' 10" tall"#).is_empty());
        assert!(scan(RecognizerKind::Inches, "a 12 x 8 in frame").is_empty());
        assert!(scan(RecognizerKind::Feet, "a 3 × 2 ft rug").is_empty());

        let hits = scan(RecognizerKind::FeetInches, r#"He is 5' 10" tall"#);
        assert_eq!(hits[0].numbers, ["5", "10"]);
    }

    #[test]
    fn fahrenheit_keeps_its_sign() {
        let hits = scan(RecognizerKind::Fahrenheit, "Temperature: -10°F");
        assert_eq!(hits[0].literal, "-10°F");
        assert_eq!(hits[0].numbers, ["-10"]);

        let hits = scan(RecognizerKind::Fahrenheit, "5-10°F");
        assert_eq!(hits[0].numbers, ["10"]);
    }

    #[test]
    fn dimensions_capture_two_or_three_axes() {
        let hits = scan(RecognizerKind::Dimensions, "Box: 12 x 8 x 4 in, mat 3×2 ft");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].numbers, ["12", "8", "4"]);
        assert_eq!(hits[0].unit, "in");
        assert_eq!(hits[1].numbers, ["3", "2"]);
        assert_eq!(hits[1].unit, "ft");
    }

    #[test]
    fn candidates_parse_into_unit_matches() {
        let hits = scan(RecognizerKind::PoundOunce, "Baby: 8 lb 4 oz");
        let unit_match = hits[0].parse().unwrap();
        assert_eq!(unit_match.family, UnitFamily::PoundsAndOunces);
        assert_eq!(unit_match.magnitudes.len(), 2);
        assert_eq!(unit_match.start, 6);
        assert_eq!(unit_match.end, 15);

        let bad = scan(RecognizerKind::Miles, "3/0 miles");
        assert_eq!(bad.len(), 1);
        assert!(bad[0].parse().is_err());
    }
}
