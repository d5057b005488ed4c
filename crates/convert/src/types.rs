use std::fmt;

use serde::Serialize;

use crate::error::MagnitudeError;
use crate::number::parse_magnitude;

/// A unit category recognized in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitFamily {
    Miles,
    MilesPerHour,
    Feet,
    Inches,
    FluidOunces,
    Ounces,
    Pounds,
    Fahrenheit,
    FeetAndInches,
    PoundsAndOunces,
    MilesPerGallon,
    Dimensions,
}

impl UnitFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitFamily::Miles => "miles",
            UnitFamily::MilesPerHour => "miles_per_hour",
            UnitFamily::Feet => "feet",
            UnitFamily::Inches => "inches",
            UnitFamily::FluidOunces => "fluid_ounces",
            UnitFamily::Ounces => "ounces",
            UnitFamily::Pounds => "pounds",
            UnitFamily::Fahrenheit => "fahrenheit",
            UnitFamily::FeetAndInches => "feet_and_inches",
            UnitFamily::PoundsAndOunces => "pounds_and_ounces",
            UnitFamily::MilesPerGallon => "miles_per_gallon",
            UnitFamily::Dimensions => "dimensions",
        }
    }

    /// Maximum fraction digits of the emitted metric value.
    pub fn precision(&self) -> usize {
        match self {
            UnitFamily::Fahrenheit => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for UnitFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed number together with the literal it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Magnitude {
    pub value: f64,
    pub literal: String,
}

impl Magnitude {
    pub fn parse(literal: &str) -> Result<Self, MagnitudeError> {
        Ok(Self {
            value: parse_magnitude(literal)?,
            literal: literal.to_string(),
        })
    }
}

/// One recognized measurement.
///
/// `magnitudes` holds one value for a plain match, two for a range or a
/// two-unit compound (larger unit first), and two or three for a dimension.
/// Offsets are byte offsets into the text the recognizer scanned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitMatch {
    pub literal: String,
    pub family: UnitFamily,
    pub magnitudes: Vec<Magnitude>,
    /// Unit word as written, empty for compounds.
    pub unit: String,
    pub approximate: bool,
    pub start: usize,
    pub end: usize,
}

impl UnitMatch {
    pub fn first(&self) -> Option<&Magnitude> {
        self.magnitudes.first()
    }

    pub fn second(&self) -> Option<&Magnitude> {
        self.magnitudes.get(1)
    }
}
