use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rate units a product line may carry.
///
/// The nine named variants are the supported vocabulary. Anything else is
/// kept verbatim in `Other` so the line survives and can be flagged later.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RateUnit {
    SeedsPerAcre,
    LbsPerAcre,
    FlOzPerAcre,
    OzPerAcre,
    PtPerAcre,
    QtPerAcre,
    OzDryPerAcre,
    TonsPerAcre,
    /// Percent of the spray carrier volume, not a per-acre amount.
    PercentOfCarrier,
    Other(String),
}

impl RateUnit {
    pub const KNOWN: [RateUnit; 9] = [
        RateUnit::SeedsPerAcre,
        RateUnit::LbsPerAcre,
        RateUnit::FlOzPerAcre,
        RateUnit::OzPerAcre,
        RateUnit::PtPerAcre,
        RateUnit::QtPerAcre,
        RateUnit::OzDryPerAcre,
        RateUnit::TonsPerAcre,
        RateUnit::PercentOfCarrier,
    ];

    /// Parse a unit label as typed by users or stored by older records.
    ///
    /// Case, whitespace, dots and a trailing "/acre" are ignored.
    pub fn parse(label: &str) -> Self {
        let squashed: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '.')
            .collect::<String>()
            .to_ascii_lowercase();

        let mut key = squashed.as_str();
        for suffix in ["/acre", "peracre", "/ac", "/a"] {
            if let Some(stripped) = key.strip_suffix(suffix) {
                key = stripped;
                break;
            }
        }

        match key {
            "seeds" | "seed" => RateUnit::SeedsPerAcre,
            "lbs" | "lb" | "pounds" => RateUnit::LbsPerAcre,
            "floz" | "fluidoz" | "fluidounces" => RateUnit::FlOzPerAcre,
            "oz" | "ounces" => RateUnit::OzPerAcre,
            "pt" | "pint" | "pints" => RateUnit::PtPerAcre,
            "qt" | "quart" | "quarts" => RateUnit::QtPerAcre,
            "ozdry" | "dryoz" | "oz(dry)" => RateUnit::OzDryPerAcre,
            "tons" | "ton" => RateUnit::TonsPerAcre,
            "%" | "%ofcarrier" | "%v/v" | "percent" => RateUnit::PercentOfCarrier,
            _ => RateUnit::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RateUnit::SeedsPerAcre => "seeds/acre",
            RateUnit::LbsPerAcre => "lbs/acre",
            RateUnit::FlOzPerAcre => "fl oz/acre",
            RateUnit::OzPerAcre => "oz/acre",
            RateUnit::PtPerAcre => "pt/acre",
            RateUnit::QtPerAcre => "qt/acre",
            RateUnit::OzDryPerAcre => "oz dry/acre",
            RateUnit::TonsPerAcre => "tons/acre",
            RateUnit::PercentOfCarrier => "% of carrier",
            RateUnit::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RateUnit::Other(_))
    }
}

impl FromStr for RateUnit {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RateUnit::parse(s))
    }
}

impl From<String> for RateUnit {
    fn from(label: String) -> Self {
        RateUnit::parse(&label)
    }
}

impl From<RateUnit> for String {
    fn from(unit: RateUnit) -> Self {
        unit.label().to_string()
    }
}

impl fmt::Display for RateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Units of absolute and standardized amounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Seeds,
    /// Seed units (bags), seeds divided by seeds-per-unit.
    Units,
    Lbs,
    Bushels,
    Tons,
    FlOz,
    Oz,
    Pints,
    Quarts,
    Gallons,
    OzDry,
}

impl Unit {
    pub fn label(self) -> &'static str {
        match self {
            Unit::Seeds => "seeds",
            Unit::Units => "units",
            Unit::Lbs => "lbs",
            Unit::Bushels => "bushels",
            Unit::Tons => "tons",
            Unit::FlOz => "fl oz",
            Unit::Oz => "oz",
            Unit::Pints => "pt",
            Unit::Quarts => "qt",
            Unit::Gallons => "gallons",
            Unit::OzDry => "oz dry",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
