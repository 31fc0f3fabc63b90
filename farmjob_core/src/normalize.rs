//! Per-acre rates to absolute and standardized quantities.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cfg::ConversionCfg;
use crate::model::{ProductKind, ProductLine};
use crate::shares::{split_amount, Split};
use crate::units::{RateUnit, Unit};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub value: f64,
    pub unit: Unit,
}

impl Amount {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }
}

/// Why a line could not be standardized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeFlag {
    UnsupportedConversion { unit: String },
    MissingCarrierVolume,
}

/// Result of normalizing one product line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalized {
    Standard { absolute: Amount, standardized: Amount },
    /// Unit outside the supported vocabulary; amount kept in the raw unit.
    Unsupported { absolute_amount: f64, unit: String },
    /// Percent-of-carrier line without a usable carrier volume.
    MissingCarrierVolume,
}

impl Normalized {
    pub fn standardized(&self) -> Option<Amount> {
        match self {
            Normalized::Standard { standardized, .. } => Some(*standardized),
            _ => None,
        }
    }

    pub fn absolute(&self) -> Option<Amount> {
        match self {
            Normalized::Standard { absolute, .. } => Some(*absolute),
            _ => None,
        }
    }

    pub fn flag(&self) -> Option<NormalizeFlag> {
        match self {
            Normalized::Standard { .. } => None,
            Normalized::Unsupported { unit, .. } => {
                Some(NormalizeFlag::UnsupportedConversion { unit: unit.clone() })
            }
            Normalized::MissingCarrierVolume => Some(NormalizeFlag::MissingCarrierVolume),
        }
    }

    pub fn is_flagged(&self) -> bool {
        !matches!(self, Normalized::Standard { .. })
    }

    /// Pro-rate the standardized amount over `(key, percent)` allocations.
    /// Flagged results have nothing to split.
    pub fn split<'a, I>(&self, allocations: I) -> Option<Split>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        self.standardized()
            .map(|amount| split_amount(amount.value, allocations))
    }
}

/// Non-finite and negative inputs count as zero.
#[inline]
fn non_negative(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Normalize one product line over `applied_acres`.
///
/// `carrier_gpa` is only consulted for percent-of-carrier lines.
pub fn normalize(
    line: &ProductLine,
    applied_acres: f64,
    carrier_gpa: Option<f64>,
    cfg: &ConversionCfg,
) -> Normalized {
    let acres = non_negative(applied_acres);
    let rate = non_negative(line.rate.unwrap_or(0.0));

    let Some(unit) = &line.unit else {
        warn!(product_id = %line.product_id, "product line has no unit, flagging");
        return Normalized::Unsupported {
            absolute_amount: rate * acres,
            unit: String::new(),
        };
    };

    let total = rate * acres;
    let crop = line.crop.as_ref();

    let (absolute, standardized) = match unit {
        RateUnit::PercentOfCarrier => {
            let Some(carrier) = carrier_gpa.filter(|c| c.is_finite() && *c > 0.0) else {
                warn!(product_id = %line.product_id, "percent-of-carrier line without carrier volume");
                return Normalized::MissingCarrierVolume;
            };
            let gallons = (rate / 100.0) * carrier * acres;
            (Amount::new(gallons, Unit::Gallons), Amount::new(gallons, Unit::Gallons))
        }
        RateUnit::SeedsPerAcre => (
            Amount::new(total, Unit::Seeds),
            Amount::new(total / cfg.seeds_per_unit(crop), Unit::Units),
        ),
        RateUnit::LbsPerAcre if line.kind == ProductKind::Seed => (
            Amount::new(total, Unit::Lbs),
            Amount::new(total / cfg.lbs_per_bushel(crop), Unit::Bushels),
        ),
        RateUnit::LbsPerAcre => (
            Amount::new(total, Unit::Lbs),
            Amount::new(total / cfg.lbs_per_ton, Unit::Tons),
        ),
        RateUnit::FlOzPerAcre => (
            Amount::new(total, Unit::FlOz),
            Amount::new(total / cfg.fl_oz_per_gallon, Unit::Gallons),
        ),
        RateUnit::OzPerAcre => (
            Amount::new(total, Unit::Oz),
            Amount::new(total / cfg.fl_oz_per_gallon, Unit::Gallons),
        ),
        RateUnit::PtPerAcre => (
            Amount::new(total, Unit::Pints),
            Amount::new(total / cfg.pints_per_gallon, Unit::Gallons),
        ),
        RateUnit::QtPerAcre => (
            Amount::new(total, Unit::Quarts),
            Amount::new(total / cfg.quarts_per_gallon, Unit::Gallons),
        ),
        RateUnit::OzDryPerAcre => (
            Amount::new(total, Unit::OzDry),
            Amount::new(total / cfg.dry_oz_per_lb, Unit::Lbs),
        ),
        RateUnit::TonsPerAcre => (Amount::new(total, Unit::Tons), Amount::new(total, Unit::Tons)),
        RateUnit::Other(label) => {
            warn!(product_id = %line.product_id, unit = %label, "unsupported unit conversion");
            return Normalized::Unsupported {
                absolute_amount: total,
                unit: label.clone(),
            };
        }
    };

    Normalized::Standard {
        absolute,
        standardized,
    }
}
