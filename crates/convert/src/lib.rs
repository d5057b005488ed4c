//! Imperial to metric measurement annotation for plain text.
//!
//! `convert` finds measurements written in imperial units (miles, mph, feet,
//! inches, fluid ounces, ounces, pounds, °F, miles per gallon, plus the
//! feet-and-inches, pound-and-ounce and dimension compounds) and appends a
//! parenthetical metric equivalent right after each one:
//!
//! ```
//! use convert::convert_text;
//!
//! assert_eq!(
//!     convert_text("Temperature: -10°F"),
//!     "Temperature: -10°F (-23.3 °C)"
//! );
//! ```
//!
//! The transform is pure and total. Text without a recognizable unit comes
//! back byte-for-byte, a match whose number cannot be parsed is left as it
//! was, and running the engine over its own output changes nothing.
//!
//! # Pipeline
//!
//! ```text
//! text ──► UnitPatternSet (13 passes, fixed order)
//!              │  candidate literal + captured number tokens
//!              ▼
//!          guard (already followed by "(… km)"?) ──► skip
//!              │
//!              ▼
//!          number::parse_magnitude ──► failure ──► skip
//!              │
//!              ▼
//!          rules::render + NumberFormat ──► "literal (value unit)"
//! ```
//!
//! Number presentation follows the locale given in [`ConvertConfig`]:
//!
//! ```
//! use convert::{ConversionEngine, ConvertConfig};
//!
//! let engine = ConversionEngine::new(ConvertConfig::for_locale("de-DE")).unwrap();
//! assert_eq!(engine.convert("Noch 1000 miles"), "Noch 1000 miles (1.609,34 km)");
//! ```

mod config;
mod engine;
mod error;
mod format;
mod guard;
mod number;
mod patterns;
mod rules;
mod types;

pub use config::ConvertConfig;
pub use engine::{convert_text, Annotation, Conversion, ConversionEngine};
pub use error::{ConvertError, MagnitudeError};
pub use format::NumberFormat;
pub use guard::{followed_by_conversion, is_annotated_at};
pub use number::{parse_fraction, parse_magnitude, FRACTION_GLYPHS};
pub use patterns::{Candidate, Recognizer, RecognizerKind, UnitPatternSet};
pub use rules::{
    convert_value, render, ConversionFactor, CONVERSION_FACTORS, FT_TO_M, FLOZ_TO_ML, IN_TO_CM,
    LB_TO_KG, MI_TO_KM, MPG_TO_L_PER_100KM, MPH_TO_KMH, OZ_TO_G, OZ_TO_KG,
};
pub use types::{Magnitude, UnitFamily, UnitMatch};
