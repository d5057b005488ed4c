//! Locale-aware presentation of converted values.
//!
//! Values are rounded half away from zero on their shortest round-trip
//! decimal representation, so `4.3 * 28.3495` (stored as `121.90284999999999`)
//! renders as `121.9` and `1.7780000000000002` as `1.78`.

/// How integer digits are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grouping {
    /// Groups of three: `1,234,567`.
    Thousands,
    /// Last three, then groups of two: `12,34,567`.
    Indian,
}

/// Decimal mark, grouping separator and grouping style for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    locale: String,
    decimal: char,
    group: char,
    grouping: Grouping,
    /// Integer digits beyond the first group needed before grouping applies.
    min_grouping_digits: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::for_locale("en-US")
    }
}

impl NumberFormat {
    /// Resolve a locale identifier (`de`, `de-CH`, `pt_BR`, `zh-Hant-TW`).
    pub fn for_locale(locale: &str) -> Self {
        let (language, region) = split_locale(locale);
        let (decimal, group, grouping, min_grouping_digits) =
            profile(&language, region.as_deref());
        Self {
            locale: locale.to_string(),
            decimal,
            group,
            grouping,
            min_grouping_digits,
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal
    }

    pub fn group_separator(&self) -> char {
        self.group
    }

    /// Render `value` with at most `max_fraction_digits` fraction digits.
    pub fn format(&self, value: f64, max_fraction_digits: usize) -> String {
        if !value.is_finite() {
            return value.to_string();
        }

        let (int_digits, frac_digits) = round_half_away(value.abs(), max_fraction_digits);
        let is_zero = int_digits.bytes().all(|b| b == b'0') && frac_digits.is_empty();

        let mut out = String::with_capacity(int_digits.len() + frac_digits.len() + 4);
        if value.is_sign_negative() && !is_zero {
            out.push('-');
        }
        out.push_str(&self.group_integer(&int_digits));
        if !frac_digits.is_empty() {
            out.push(self.decimal);
            out.push_str(&frac_digits);
        }
        out
    }

    fn group_integer(&self, digits: &str) -> String {
        if digits.len() < 3 + self.min_grouping_digits {
            return digits.to_string();
        }

        let bytes = digits.as_bytes();
        let mut groups: Vec<&[u8]> = Vec::new();
        let mut end = bytes.len();
        let mut size = 3;
        while end > 0 {
            let start = end.saturating_sub(size);
            groups.push(&bytes[start..end]);
            end = start;
            if self.grouping == Grouping::Indian {
                size = 2;
            }
        }

        let mut out = String::with_capacity(digits.len() + groups.len() * 3);
        for (idx, group) in groups.iter().rev().enumerate() {
            if idx > 0 {
                out.push(self.group);
            }
            // groups are slices of an ASCII digit string
            out.extend(group.iter().map(|&b| b as char));
        }
        out
    }
}

/// Split `value` (non-negative, finite) into integer and fraction digit
/// strings, rounded to `max_digits` and with trailing zeros stripped.
fn round_half_away(value: f64, max_digits: usize) -> (String, String) {
    let repr = format!("{value}");
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let kept = frac_part.len().min(max_digits);
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(kept))
        .map(|b| b - b'0')
        .collect();
    let mut int_len = int_part.len();

    let round_up = frac_part
        .as_bytes()
        .get(max_digits)
        .is_some_and(|&b| b >= b'5');
    if round_up {
        let mut idx = digits.len();
        loop {
            if idx == 0 {
                digits.insert(0, 1);
                int_len += 1;
                break;
            }
            idx -= 1;
            if digits[idx] == 9 {
                digits[idx] = 0;
            } else {
                digits[idx] += 1;
                break;
            }
        }
    }

    let to_string = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let int_digits = to_string(&digits[..int_len]);
    let frac_digits = to_string(&digits[int_len..]);
    let frac_digits = frac_digits.trim_end_matches('0').to_string();
    (int_digits, frac_digits)
}

fn split_locale(locale: &str) -> (String, Option<String>) {
    let lower = locale.trim().to_ascii_lowercase();
    let mut parts = lower.split(['-', '_']).filter(|p| !p.is_empty());
    let language = parts.next().unwrap_or("en").to_string();
    let region = parts
        .find(|p| {
            (p.len() == 2 && p.bytes().all(|b| b.is_ascii_alphabetic()))
                || (p.len() == 3 && p.bytes().all(|b| b.is_ascii_digit()))
        })
        .map(str::to_string);
    (language, region)
}

const NNBSP: char = '\u{202F}';
const NBSP: char = '\u{00A0}';

fn profile(language: &str, region: Option<&str>) -> (char, char, Grouping, usize) {
    use Grouping::{Indian, Thousands};

    match (language, region) {
        ("de", Some("ch")) | ("it", Some("ch")) => ('.', '’', Thousands, 1),
        ("de", Some("at")) => (',', NBSP, Thousands, 1),
        ("en", Some("in")) | ("hi", _) => ('.', ',', Indian, 1),
        ("es", _) => (',', '.', Thousands, 2),
        ("pl", _) => (',', NBSP, Thousands, 2),
        ("fr", _) => (',', NNBSP, Thousands, 1),
        (
            "de" | "it" | "nl" | "pt" | "id" | "tr" | "da" | "el" | "ro" | "hr" | "sl" | "sr"
            | "vi",
            _,
        ) => (',', '.', Thousands, 1),
        (
            "ru" | "uk" | "cs" | "sk" | "sv" | "fi" | "nb" | "no" | "hu" | "bg" | "lt" | "lv"
            | "et",
            _,
        ) => (',', NBSP, Thousands, 1),
        _ => ('.', ',', Thousands, 1),
    }
}
