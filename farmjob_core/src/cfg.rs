use serde::{Deserialize, Serialize};

use crate::model::Crop;

/// Conversion factors used to turn absolute amounts into standardized units.
///
/// Every field has a default, so a partial JSON/TOML document only needs to
/// name the factors it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionCfg {
    pub rice_seeds_per_unit: f64,
    pub soybean_seeds_per_unit: f64,
    pub default_seeds_per_unit: f64,

    pub rice_lbs_per_bushel: f64,
    pub soybean_lbs_per_bushel: f64,
    pub default_lbs_per_bushel: f64,

    pub lbs_per_ton: f64,
    pub fl_oz_per_gallon: f64,
    pub pints_per_gallon: f64,
    pub quarts_per_gallon: f64,
    pub dry_oz_per_lb: f64,
}

impl Default for ConversionCfg {
    fn default() -> Self {
        Self {
            rice_seeds_per_unit: 900_000.0,
            soybean_seeds_per_unit: 140_000.0,
            default_seeds_per_unit: 1_000_000.0,
            rice_lbs_per_bushel: 45.0,
            soybean_lbs_per_bushel: 60.0,
            default_lbs_per_bushel: 50.0,
            lbs_per_ton: 2000.0,
            fl_oz_per_gallon: 128.0,
            pints_per_gallon: 8.0,
            quarts_per_gallon: 4.0,
            dry_oz_per_lb: 16.0,
        }
    }
}

impl ConversionCfg {
    /// Seeds in one seed unit (bag) for the line's crop.
    pub fn seeds_per_unit(&self, crop: Option<&Crop>) -> f64 {
        match crop {
            Some(Crop::Rice) => self.rice_seeds_per_unit,
            Some(Crop::Soybean) => self.soybean_seeds_per_unit,
            _ => self.default_seeds_per_unit,
        }
    }

    pub fn lbs_per_bushel(&self, crop: Option<&Crop>) -> f64 {
        match crop {
            Some(Crop::Rice) => self.rice_lbs_per_bushel,
            Some(Crop::Soybean) => self.soybean_lbs_per_bushel,
            _ => self.default_lbs_per_bushel,
        }
    }
}
