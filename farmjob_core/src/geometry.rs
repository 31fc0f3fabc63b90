//! Applied-acre resolution and the geometry helpers behind it.
//!
//! Acreage always comes out of [`resolve_applied_acres`]. The overlay
//! projection at the bottom of this module exists for thumbnails and never
//! feeds back into an acreage number.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Crop, Field};

/// Square meters to acres. Applied once, in [`ring_acres`].
pub const SQ_METERS_TO_ACRES: f64 = 0.000247105;

/// WGS84 equatorial radius, as used by common web-map area functions.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Rings smaller than this are treated as degenerate (rounding noise).
const MIN_AREA_SQ_M: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Drop a repeated closing vertex and reject rings we cannot measure.
fn open_ring(ring: &[LatLng]) -> Option<&[LatLng]> {
    if ring.iter().any(|p| !p.is_valid()) {
        return None;
    }
    let open = match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    };
    if open.len() < 3 {
        return None;
    }
    Some(open)
}

/// Geodesic area of a lat/lng ring in square meters (spherical excess).
///
/// Returns `None` for fewer than three vertices, out-of-range coordinates,
/// or a degenerate ring under a square meter.
pub fn ring_area_sq_m(ring: &[LatLng]) -> Option<f64> {
    let pts = open_ring(ring)?;
    let n = pts.len();

    let mut total = 0.0_f64;
    for i in 0..n {
        let lower = pts[i];
        let middle = pts[(i + 1) % n];
        let upper = pts[(i + 2) % n];
        total += (upper.lng.to_radians() - lower.lng.to_radians()) * middle.lat.to_radians().sin();
    }

    let area = (total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs();
    if area.is_finite() && area >= MIN_AREA_SQ_M {
        Some(area)
    } else {
        None
    }
}

pub fn ring_acres(ring: &[LatLng]) -> Option<f64> {
    ring_area_sq_m(ring).map(|sq_m| sq_m * SQ_METERS_TO_ACRES)
}

/// A user-drawn sub-area inside a field, with the area measured when it was drawn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubPolygon {
    pub ring: Vec<LatLng>,
    pub measured_acres: Option<f64>,
}

impl SubPolygon {
    /// Measure a freshly drawn ring.
    pub fn measure(ring: Vec<LatLng>) -> Self {
        let measured_acres = ring_acres(&ring);
        Self {
            ring,
            measured_acres,
        }
    }

    /// Stored measurement, or a fresh one when the stored value is unusable.
    pub fn acres(&self) -> Option<f64> {
        usable(self.measured_acres).or_else(|| ring_acres(&self.ring))
    }
}

// ---------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobClass {
    Ordinary,
    /// Levee/pack work: acreage is an explicit override, never measured.
    Levee,
}

/// Where a resolved acreage came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcreSource {
    LeveeOverride,
    SubPolygon,
    LegacyDrawn,
    Gps,
    Registry,
    #[default]
    Unavailable,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAcres {
    pub acres: f64,
    pub source: AcreSource,
}

impl ResolvedAcres {
    pub fn new(acres: f64, source: AcreSource) -> Self {
        Self { acres, source }
    }

    fn unavailable() -> Self {
        Self::default()
    }
}

fn usable(acres: Option<f64>) -> Option<f64> {
    acres.filter(|a| a.is_finite() && *a > 0.0)
}

/// Resolve the applied acres for one field.
///
/// Precedence for ordinary work: drawn sub-polygon, legacy drawn area, GPS
/// acres, registry acres. Levee work only ever uses the crop-keyed override.
/// A missing field or unusable geometry resolves to zero.
pub fn resolve_applied_acres(
    field: Option<&Field>,
    class: JobClass,
    crop: Option<&Crop>,
    drawn: Option<&SubPolygon>,
) -> ResolvedAcres {
    if class == JobClass::Levee {
        let levee = field
            .and_then(|f| f.levee_acres.for_crop(crop))
            .filter(|a| a.is_finite() && *a >= 0.0);
        return match levee {
            Some(acres) => ResolvedAcres::new(acres, AcreSource::LeveeOverride),
            None => {
                debug!(
                    field_id = field.map(|f| f.id.as_str()),
                    crop = crop.map(Crop::name),
                    "no levee acreage for crop, resolving to zero"
                );
                ResolvedAcres::unavailable()
            }
        };
    }

    if let Some(polygon) = drawn {
        match polygon.acres() {
            Some(acres) => return ResolvedAcres::new(acres, AcreSource::SubPolygon),
            None => debug!(
                vertices = polygon.ring.len(),
                "drawn sub-polygon unusable, falling through"
            ),
        }
    }

    let Some(field) = field else {
        debug!("field missing from registry snapshot, resolving to zero");
        return ResolvedAcres::unavailable();
    };

    let chain = [
        (field.drawn_acres, AcreSource::LegacyDrawn),
        (field.gps_acres, AcreSource::Gps),
        (field.registry_acres, AcreSource::Registry),
    ];
    for (acres, source) in chain {
        if let Some(acres) = usable(acres) {
            return ResolvedAcres::new(acres, source);
        }
    }

    debug!(field_id = %field.id, "no geometry source available, resolving to zero");
    ResolvedAcres::unavailable()
}

// ---------------------------------------------------------------------
// Overlay projection (rendering only)
// ---------------------------------------------------------------------

/// Aspect-preserving fit of a ring's bounding box into a `size` x `size` square.
///
/// Screen coordinates: x grows right, y grows down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayProjection {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    min_lng: f64,
    max_lat: f64,
}

impl OverlayProjection {
    pub fn fit(ring: &[LatLng], size: f64, padding: f64) -> Option<Self> {
        let first = ring.iter().find(|p| p.is_valid())?;
        let (mut min_lng, mut max_lng) = (first.lng, first.lng);
        let (mut min_lat, mut max_lat) = (first.lat, first.lat);
        for p in ring.iter().filter(|p| p.is_valid()) {
            min_lng = min_lng.min(p.lng);
            max_lng = max_lng.max(p.lng);
            min_lat = min_lat.min(p.lat);
            max_lat = max_lat.max(p.lat);
        }

        let width = max_lng - min_lng;
        let height = max_lat - min_lat;
        let span = width.max(height);
        let avail = size - 2.0 * padding;
        if span <= 0.0 || avail <= 0.0 {
            return None;
        }

        let scale = avail / span;
        Some(Self {
            scale,
            offset_x: padding + (avail - width * scale) / 2.0,
            offset_y: padding + (avail - height * scale) / 2.0,
            min_lng,
            max_lat,
        })
    }

    #[inline]
    pub fn project(&self, p: LatLng) -> (f64, f64) {
        (
            self.offset_x + (p.lng - self.min_lng) * self.scale,
            self.offset_y + (self.max_lat - p.lat) * self.scale,
        )
    }

    pub fn project_ring(&self, ring: &[LatLng]) -> Vec<(f64, f64)> {
        ring.iter().map(|p| self.project(*p)).collect()
    }
}
