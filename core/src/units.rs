use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three families a unit can belong to. Units only convert within their family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementFamily {
    Weight,
    Volume,
    Count,
}

impl MeasurementFamily {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Volume => "volume",
            Self::Count => "count",
        }
    }

    /// Units belonging to this family, in picker order.
    #[must_use]
    pub fn units(self) -> impl Iterator<Item = Unit> {
        Unit::ALL.iter().copied().filter(move |u| u.family() == self)
    }
}

impl fmt::Display for MeasurementFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Gram,
    Kilogram,
    Milligram,
    Ounce,
    Pound,
    Milliliter,
    Liter,
    Cup,
    Tablespoon,
    Teaspoon,
    FluidOunce,
    Pint,
    Quart,
    Gallon,
    Piece,
    Dozen,
    Bunch,
    Head,
    Clove,
    Can,
    Jar,
    Bottle,
    Package,
    Box,
    Bag,
    Container,
}

/// Milliliters in one US cup. Also the divisor used when presenting volume totals in cups.
pub const ML_PER_CUP: f64 = 236.588;

impl Unit {
    pub const ALL: [Unit; 26] = [
        Unit::Gram,
        Unit::Kilogram,
        Unit::Milligram,
        Unit::Ounce,
        Unit::Pound,
        Unit::Milliliter,
        Unit::Liter,
        Unit::Cup,
        Unit::Tablespoon,
        Unit::Teaspoon,
        Unit::FluidOunce,
        Unit::Pint,
        Unit::Quart,
        Unit::Gallon,
        Unit::Piece,
        Unit::Dozen,
        Unit::Bunch,
        Unit::Head,
        Unit::Clove,
        Unit::Can,
        Unit::Jar,
        Unit::Bottle,
        Unit::Package,
        Unit::Box,
        Unit::Bag,
        Unit::Container,
    ];

    /// Canonical stored name, e.g. `fluid-ounce`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gram => "gram",
            Self::Kilogram => "kilogram",
            Self::Milligram => "milligram",
            Self::Ounce => "ounce",
            Self::Pound => "pound",
            Self::Milliliter => "milliliter",
            Self::Liter => "liter",
            Self::Cup => "cup",
            Self::Tablespoon => "tablespoon",
            Self::Teaspoon => "teaspoon",
            Self::FluidOunce => "fluid-ounce",
            Self::Pint => "pint",
            Self::Quart => "quart",
            Self::Gallon => "gallon",
            Self::Piece => "piece",
            Self::Dozen => "dozen",
            Self::Bunch => "bunch",
            Self::Head => "head",
            Self::Clove => "clove",
            Self::Can => "can",
            Self::Jar => "jar",
            Self::Bottle => "bottle",
            Self::Package => "package",
            Self::Box => "box",
            Self::Bag => "bag",
            Self::Container => "container",
        }
    }

    /// Short label shown next to the name in unit pickers.
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Gram => "g",
            Self::Kilogram => "kg",
            Self::Milligram => "mg",
            Self::Ounce => "oz",
            Self::Pound => "lb",
            Self::Milliliter => "ml",
            Self::Liter => "L",
            Self::Tablespoon => "tbsp",
            Self::Teaspoon => "tsp",
            Self::FluidOunce => "fl oz",
            Self::Pint => "pt",
            Self::Quart => "qt",
            Self::Gallon => "gal",
            Self::Piece => "pc",
            Self::Dozen => "doz",
            Self::Package => "pkg",
            other => other.as_str(),
        }
    }

    #[must_use]
    pub fn family(self) -> MeasurementFamily {
        match self {
            Self::Gram | Self::Kilogram | Self::Milligram | Self::Ounce | Self::Pound => {
                MeasurementFamily::Weight
            }
            Self::Milliliter
            | Self::Liter
            | Self::Cup
            | Self::Tablespoon
            | Self::Teaspoon
            | Self::FluidOunce
            | Self::Pint
            | Self::Quart
            | Self::Gallon => MeasurementFamily::Volume,
            _ => MeasurementFamily::Count,
        }
    }

    /// Multiplier to the family's base unit: grams, milliliters, or single items.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Gram | Self::Milliliter => 1.0,
            Self::Kilogram | Self::Liter => 1000.0,
            Self::Milligram => 0.001,
            Self::Ounce => 28.3495,
            Self::Pound => 453.592,
            Self::Cup => ML_PER_CUP,
            Self::Tablespoon => 14.7868,
            Self::Teaspoon => 4.92892,
            Self::FluidOunce => 29.5735,
            Self::Pint => 473.176,
            Self::Quart => 946.353,
            Self::Gallon => 3785.41,
            Self::Dozen => 12.0,
            _ => 1.0,
        }
    }

    /// Picker label, e.g. `Gram (g)`.
    #[must_use]
    pub fn label(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        let title: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{} ({})", title.replace('-', " "), self.abbreviation())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .iter()
            .copied()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown unit '{s}'. Must be one of: {}",
                    Unit::ALL.map(Unit::as_str).join(", ")
                )
            })
    }
}

/// Family of a stored unit name, `None` when the name is not in the table.
#[must_use]
pub fn family_of(unit: &str) -> Option<MeasurementFamily> {
    unit.parse::<Unit>().ok().map(Unit::family)
}

/// Conversion factor of a stored unit name. Unrecognized names count as base-unit equivalent.
#[must_use]
pub fn conversion_factor(unit: &str) -> f64 {
    unit.parse::<Unit>().map_or(1.0, Unit::factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_roundtrips_through_name() {
        for unit in Unit::ALL {
            assert_eq!(unit.as_str().parse::<Unit>().unwrap(), unit);
        }
    }

    #[test]
    fn test_unit_names_are_case_sensitive() {
        assert!("Gram".parse::<Unit>().is_err());
        assert!("g".parse::<Unit>().is_err());
    }

    #[test]
    fn test_families() {
        assert_eq!(Unit::Pound.family(), MeasurementFamily::Weight);
        assert_eq!(Unit::FluidOunce.family(), MeasurementFamily::Volume);
        assert_eq!(Unit::Dozen.family(), MeasurementFamily::Count);
        assert_eq!(family_of("clove"), Some(MeasurementFamily::Count));
        assert_eq!(family_of("handful"), None);
    }

    #[test]
    fn test_family_unit_counts() {
        assert_eq!(MeasurementFamily::Weight.units().count(), 5);
        assert_eq!(MeasurementFamily::Volume.units().count(), 9);
        assert_eq!(MeasurementFamily::Count.units().count(), 12);
    }

    #[test]
    fn test_conversion_factors() {
        assert!((conversion_factor("kilogram") - 1000.0).abs() < f64::EPSILON);
        assert!((conversion_factor("cup") - 236.588).abs() < f64::EPSILON);
        assert!((conversion_factor("dozen") - 12.0).abs() < f64::EPSILON);
        assert!((conversion_factor("can") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_unit_factor_defaults_to_one() {
        assert!((conversion_factor("pinch") - 1.0).abs() < f64::EPSILON);
        assert!((conversion_factor("") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Unit::Gram.label(), "Gram (g)");
        assert_eq!(Unit::FluidOunce.label(), "Fluid ounce (fl oz)");
        assert_eq!(Unit::Bunch.label(), "Bunch (bunch)");
    }
}
