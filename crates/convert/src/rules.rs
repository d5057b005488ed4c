//! Conversion factors and rendering of the metric annotation body.

use crate::format::NumberFormat;
use crate::types::{UnitFamily, UnitMatch};

pub const MI_TO_KM: f64 = 1.60934;
pub const MPH_TO_KMH: f64 = 1.60934;
pub const FT_TO_M: f64 = 0.3048;
pub const IN_TO_CM: f64 = 2.54;
pub const FLOZ_TO_ML: f64 = 29.5735;
pub const OZ_TO_G: f64 = 28.3495;
pub const LB_TO_KG: f64 = 0.453592;
pub const OZ_TO_KG: f64 = 0.0283495;
/// Litres per 100 km at 1 mpg; divide by the mpg figure.
pub const MPG_TO_L_PER_100KM: f64 = 235.215;

const INCHES_PER_FOOT: f64 = 12.0;
const OUNCES_PER_POUND: f64 = 16.0;

/// Multiplicative factor and target unit of a linear family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionFactor {
    pub family: UnitFamily,
    pub factor: f64,
    pub target_unit: &'static str,
}

pub const CONVERSION_FACTORS: [ConversionFactor; 7] = [
    ConversionFactor {
        family: UnitFamily::Miles,
        factor: MI_TO_KM,
        target_unit: "km",
    },
    ConversionFactor {
        family: UnitFamily::MilesPerHour,
        factor: MPH_TO_KMH,
        target_unit: "km/h",
    },
    ConversionFactor {
        family: UnitFamily::Feet,
        factor: FT_TO_M,
        target_unit: "m",
    },
    ConversionFactor {
        family: UnitFamily::Inches,
        factor: IN_TO_CM,
        target_unit: "cm",
    },
    ConversionFactor {
        family: UnitFamily::FluidOunces,
        factor: FLOZ_TO_ML,
        target_unit: "ml",
    },
    ConversionFactor {
        family: UnitFamily::Ounces,
        factor: OZ_TO_G,
        target_unit: "g",
    },
    ConversionFactor {
        family: UnitFamily::Pounds,
        factor: LB_TO_KG,
        target_unit: "kg",
    },
];

fn linear_factor(family: UnitFamily) -> Option<&'static ConversionFactor> {
    CONVERSION_FACTORS.iter().find(|f| f.family == family)
}

/// Convert a single value of a single-unit family.
///
/// Returns `None` for compound families and for a zero mpg figure.
pub fn convert_value(family: UnitFamily, value: f64) -> Option<f64> {
    match family {
        UnitFamily::Fahrenheit => Some((value - 32.0) * 5.0 / 9.0),
        UnitFamily::MilesPerGallon => {
            if value == 0.0 {
                None
            } else {
                Some(MPG_TO_L_PER_100KM / value)
            }
        }
        other => linear_factor(other).map(|f| value * f.factor),
    }
}

/// Body of the annotation for `unit_match`, without the parentheses.
///
/// `None` leaves the match untouched: a zero mpg, a metric dimension, or a
/// match that lacks the magnitudes its family needs.
pub fn render(unit_match: &UnitMatch, fmt: &NumberFormat) -> Option<String> {
    let family = unit_match.family;
    let digits = family.precision();
    let first = unit_match.first()?.value;

    match family {
        UnitFamily::Fahrenheit => {
            let celsius = convert_value(family, first)?;
            Some(format!("{} °C", fmt.format(celsius, digits)))
        }
        UnitFamily::MilesPerGallon => {
            let litres = convert_value(family, first)?;
            Some(format!("{} L/100km", fmt.format(litres, digits)))
        }
        UnitFamily::FeetAndInches => {
            let inches = unit_match.second()?.value;
            let metres = (first * INCHES_PER_FOOT + inches) * IN_TO_CM / 100.0;
            Some(compound(fmt, metres, "m", 100.0, "cm", digits))
        }
        UnitFamily::PoundsAndOunces => {
            let ounces = unit_match.second()?.value;
            let kilos = (first * OUNCES_PER_POUND + ounces) * OZ_TO_KG;
            Some(compound(fmt, kilos, "kg", 1000.0, "g", digits))
        }
        UnitFamily::Dimensions => {
            let per_axis = dimension_factor(&unit_match.unit)?;
            let axes: Vec<String> = unit_match
                .magnitudes
                .iter()
                .map(|m| fmt.format(m.value * per_axis, digits))
                .collect();
            Some(format!("{} cm", axes.join(" × ")))
        }
        linear => {
            let factor = linear_factor(linear)?;
            let low = fmt.format(first * factor.factor, digits);
            match unit_match.second() {
                Some(high) => Some(format!(
                    "{low}–{} {}",
                    fmt.format(high.value * factor.factor, digits),
                    factor.target_unit
                )),
                None => Some(format!("{low} {}", factor.target_unit)),
            }
        }
    }
}

/// Report in `unit` from 1.0 upwards, otherwise in `small_unit`.
fn compound(
    fmt: &NumberFormat,
    value: f64,
    unit: &str,
    scale: f64,
    small_unit: &str,
    digits: usize,
) -> String {
    if value >= 1.0 {
        format!("{} {unit}", fmt.format(value, digits))
    } else {
        format!("{} {small_unit}", fmt.format(value * scale, digits))
    }
}

fn dimension_factor(unit: &str) -> Option<f64> {
    match unit.to_ascii_lowercase().as_str() {
        "in" | "inch" | "inches" => Some(IN_TO_CM),
        "ft" | "feet" => Some(FT_TO_M * 100.0),
        _ => None,
    }
}
