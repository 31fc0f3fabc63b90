use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::LatLng;
use crate::units::RateUnit;

// ---------------------------------------------------------------------
// Field registry entities (read-only to this crate)
// ---------------------------------------------------------------------

/// Crop planted on a field for a given crop year.
///
/// Only rice and soybean carry their own conversion factors and levee
/// overrides; everything else shares the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crop {
    Rice,
    Soybean,
    Corn,
    Other(String),
}

impl Crop {
    /// Parse a free-text crop name. Blank input means "no crop assigned".
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        let crop = match trimmed.to_ascii_lowercase().as_str() {
            "rice" => Crop::Rice,
            "soybean" | "soybeans" | "beans" => Crop::Soybean,
            "corn" => Crop::Corn,
            _ => Crop::Other(trimmed.to_string()),
        };
        Some(crop)
    }

    pub fn name(&self) -> &str {
        match self {
            Crop::Rice => "Rice",
            Crop::Soybean => "Soybeans",
            Crop::Corn => "Corn",
            Crop::Other(name) => name,
        }
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-crop levee/pack acreage entered by hand on the field record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeveeAcres {
    pub rice: Option<f64>,
    pub soybean: Option<f64>,
}

impl LeveeAcres {
    /// Override keyed by crop. Crops other than rice and soybean have no key.
    pub fn for_crop(&self, crop: Option<&Crop>) -> Option<f64> {
        match crop {
            Some(Crop::Rice) => self.rice,
            Some(Crop::Soybean) => self.soybean,
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareRole {
    Operator,
    Landowner,
}

/// One partner's expense share on a field, in percent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartnerShare {
    pub name: String,
    pub role: ShareRole,
    pub percent: f64,
}

impl PartnerShare {
    pub fn new(name: impl Into<String>, role: ShareRole, percent: f64) -> Self {
        Self {
            name: name.into(),
            role,
            percent,
        }
    }
}

/// A land parcel as the field registry hands it to us.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    /// Official (FSA/registry) acreage.
    pub registry_acres: Option<f64>,
    /// GPS-surveyed acreage.
    pub gps_acres: Option<f64>,
    /// Area of the last boundary drawn in the legacy editor.
    pub drawn_acres: Option<f64>,
    /// Crop assignment keyed by crop year.
    pub crops: BTreeMap<i32, Crop>,
    pub levee_acres: LeveeAcres,
    pub shares: Vec<PartnerShare>,
    pub boundary: Vec<LatLng>,
}

impl Field {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn crop_for(&self, crop_year: i32) -> Option<&Crop> {
        self.crops.get(&crop_year)
    }

    pub fn shares_for(&self, role: ShareRole) -> impl Iterator<Item = &PartnerShare> {
        self.shares.iter().filter(move |s| s.role == role)
    }
}

// ---------------------------------------------------------------------
// Product application lines
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Seed,
    Chemical,
    Fertilizer,
    #[default]
    Other,
}

/// One product applied by a job.
///
/// `rate` and `unit` stay optional so that half-filled rows can reach
/// validation and be reported instead of being rejected at parse time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub product_id: String,
    /// Per-acre rate, or percent of carrier volume for `RateUnit::PercentOfCarrier`.
    pub rate: Option<f64>,
    pub unit: Option<RateUnit>,
    pub kind: ProductKind,
    pub crop: Option<Crop>,
}

impl ProductLine {
    pub fn new(product_id: impl Into<String>, rate: f64, unit: RateUnit) -> Self {
        Self {
            product_id: product_id.into(),
            rate: Some(rate),
            unit: Some(unit),
            kind: ProductKind::Other,
            crop: None,
        }
    }

    pub fn with_kind(mut self, kind: ProductKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_crop(mut self, crop: Crop) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Product, rate and unit are all present.
    pub fn is_complete(&self) -> bool {
        !self.product_id.trim().is_empty()
            && self.rate.map(|r| r.is_finite() && r >= 0.0).unwrap_or(false)
            && self.unit.is_some()
    }
}
