//! Numeric token parsing.
//!
//! Tokens arrive exactly as the unit recognizers captured them: `5`, `2.5`,
//! `4,3`, `½`, `3/4`, `2 ½`, `1 1/2`, or a signed `-10`. Vulgar fraction glyphs
//! map to fixed approximations rather than exact rationals.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MagnitudeError;

/// Every vulgar fraction glyph the recognizers accept.
pub const FRACTION_GLYPHS: &str = "¼½¾⅐⅑⅒⅓⅔⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞";

const GLYPH_VALUES: [(char, f64); 18] = [
    ('¼', 0.25),
    ('½', 0.5),
    ('¾', 0.75),
    ('⅐', 0.1428),
    ('⅑', 0.111),
    ('⅒', 0.1),
    ('⅓', 0.333),
    ('⅔', 0.667),
    ('⅕', 0.2),
    ('⅖', 0.4),
    ('⅗', 0.6),
    ('⅘', 0.8),
    ('⅙', 0.167),
    ('⅚', 0.8333),
    ('⅛', 0.125),
    ('⅜', 0.375),
    ('⅝', 0.625),
    ('⅞', 0.875),
];

/// Fraction alternation shared with the unit recognizers.
pub(crate) fn fraction_pattern() -> String {
    format!(r"[{FRACTION_GLYPHS}]|[0-9]+/[0-9]+")
}

static MIXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^([0-9]+(?:\.[0-9]+)?)\s*({})$",
        fraction_pattern()
    ))
    .expect("mixed number regex")
});

static FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^(?:{})$", fraction_pattern())).expect("fraction regex"));

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .expect("leading float regex")
});

/// Value of a single fraction token: one glyph, or `a/b` with `b != 0`.
pub fn parse_fraction(token: &str) -> Result<f64, MagnitudeError> {
    let token = token.trim();
    let mut chars = token.chars();
    if let (Some(glyph), None) = (chars.next(), chars.next()) {
        if let Some(&(_, value)) = GLYPH_VALUES.iter().find(|(c, _)| *c == glyph) {
            return Ok(value);
        }
    }

    let invalid = || MagnitudeError::InvalidFraction(token.to_string());
    let (num, den) = token.split_once('/').ok_or_else(invalid)?;
    if num.is_empty()
        || den.is_empty()
        || !num.bytes().all(|b| b.is_ascii_digit())
        || !den.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    let num: f64 = num.parse().map_err(|_| invalid())?;
    let den: f64 = den.parse().map_err(|_| invalid())?;
    if den == 0.0 {
        return Err(invalid());
    }
    finite(num / den, token)
}

/// Parse a captured numeric token into a finite value.
///
/// Rules are tried in order: whole number followed by a fraction (`2½`,
/// `1 1/2`), a bare fraction, then the longest leading real number. The first
/// comma is read as a decimal mark, so `4,3` is `4.3` and `1,000` is `1.0`;
/// recognizers never hand this function a grouped thousands literal for
/// that reason.
pub fn parse_magnitude(token: &str) -> Result<f64, MagnitudeError> {
    let normalized = token.replacen(',', ".", 1);
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return Err(MagnitudeError::Empty);
    }

    if let Some(caps) = MIXED.captures(normalized) {
        let whole: f64 = caps[1]
            .parse()
            .map_err(|_| MagnitudeError::NotANumber(token.to_string()))?;
        let fraction = parse_fraction(&caps[2])?;
        return finite(whole + fraction, token);
    }

    if FRACTION.is_match(normalized) {
        return parse_fraction(normalized);
    }

    let prefix = LEADING_FLOAT
        .find(normalized)
        .ok_or_else(|| MagnitudeError::NotANumber(token.to_string()))?;
    let value: f64 = prefix
        .as_str()
        .parse()
        .map_err(|_| MagnitudeError::NotANumber(token.to_string()))?;
    finite(value, token)
}

fn finite(value: f64, token: &str) -> Result<f64, MagnitudeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MagnitudeError::NonFinite(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    #[test]
    fn integers_and_decimals() {
        assert_eq!(parse_magnitude("5"), Ok(5.0));
        assert_eq!(parse_magnitude("2.5"), Ok(2.5));
        assert_eq!(parse_magnitude("0"), Ok(0.0));
        assert_eq!(parse_magnitude("-5"), Ok(-5.0));
        assert_eq!(parse_magnitude(" 5 "), Ok(5.0));
    }

    #[test]
    fn first_comma_is_a_decimal_mark() {
        assert_eq!(parse_magnitude("4,3"), Ok(4.3));
        assert_eq!(parse_magnitude("1,000"), Ok(1.0));
    }

    #[test]
    fn glyphs_and_mixed_numbers() {
        assert_eq!(parse_magnitude("½"), Ok(0.5));
        assert_eq!(parse_magnitude("2½"), Ok(2.5));
        assert_eq!(parse_magnitude("3 ¼"), Ok(3.25));
        assert!(close(parse_magnitude("5 ⅓").unwrap(), 5.333));
        assert!(close(parse_magnitude("⅚").unwrap(), 0.8333));
    }

    #[test]
    fn slash_fractions() {
        assert_eq!(parse_magnitude("3/4"), Ok(0.75));
        assert_eq!(parse_magnitude("1 1/2"), Ok(1.5));
        assert_eq!(parse_fraction("1/16"), Ok(0.0625));
    }

    #[test]
    fn zero_denominator_is_a_failure() {
        assert_eq!(
            parse_fraction("3/0"),
            Err(MagnitudeError::InvalidFraction("3/0".into()))
        );
        assert!(parse_magnitude("2 1/0").is_err());
        assert!(parse_magnitude("1/0").is_err());
    }

    #[test]
    fn malformed_tokens_fail() {
        assert_eq!(parse_magnitude(""), Err(MagnitudeError::Empty));
        assert!(matches!(
            parse_magnitude("abc"),
            Err(MagnitudeError::NotANumber(_))
        ));
        assert!(matches!(
            parse_magnitude("Infinity"),
            Err(MagnitudeError::NotANumber(_))
        ));
        assert!(matches!(
            parse_magnitude("1e999"),
            Err(MagnitudeError::NonFinite(_))
        ));
        assert!(parse_fraction("/4").is_err());
        assert!(parse_fraction("x").is_err());
    }

    #[test]
    fn trailing_text_is_ignored() {
        assert_eq!(parse_magnitude("5 miles"), Ok(5.0));
        assert_eq!(parse_magnitude("2.5kg"), Ok(2.5));
    }

    proptest! {
        #[test]
        fn never_yields_non_finite(token in "\\PC{0,24}") {
            if let Ok(value) = parse_magnitude(&token) {
                prop_assert!(value.is_finite());
            }
        }

        #[test]
        fn decimal_literals_round_trip(whole in 0u32..100_000, frac in 0u32..100) {
            let token = format!("{whole}.{frac:02}");
            let expected: f64 = token.parse().unwrap();
            prop_assert_eq!(parse_magnitude(&token), Ok(expected));
        }
    }
}
