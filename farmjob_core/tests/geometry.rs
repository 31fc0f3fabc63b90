use farmjob_core::*;

fn rect(lat0: f64, lng0: f64, lat1: f64, lng1: f64) -> Vec<LatLng> {
    vec![
        LatLng::new(lat0, lng0),
        LatLng::new(lat0, lng1),
        LatLng::new(lat1, lng1),
        LatLng::new(lat1, lng0),
    ]
}

fn field_with_acres() -> Field {
    let mut f = Field::new("F1", "North 80");
    f.registry_acres = Some(78.5);
    f.gps_acres = Some(80.0);
    f.crops.insert(2024, Crop::Rice);
    f.levee_acres = LeveeAcres {
        rice: Some(12.5),
        soybean: None,
    };
    f
}

#[test]
fn geodesic_area_of_small_rectangle() {
    let (lat0, lng0, lat1, lng1) = (34.0, -91.0, 34.01, -90.99);
    let area = ring_area_sq_m(&rect(lat0, lng0, lat1, lng1)).unwrap();

    let r = 6_378_137.0_f64;
    let expected = r * r
        * (lng1 - lng0).to_radians()
        * (lat1.to_radians().sin() - lat0.to_radians().sin());
    assert!(((area - expected) / expected).abs() < 1e-9);

    let acres = ring_acres(&rect(lat0, lng0, lat1, lng1)).unwrap();
    assert_eq!(acres, area * SQ_METERS_TO_ACRES);
}

#[test]
fn closed_and_open_rings_measure_the_same() {
    let open = rect(34.0, -91.0, 34.01, -90.99);
    let mut closed = open.clone();
    closed.push(open[0]);
    assert_eq!(ring_area_sq_m(&open), ring_area_sq_m(&closed));

    let mut reversed = open.clone();
    reversed.reverse();
    let a = ring_area_sq_m(&open).unwrap();
    let b = ring_area_sq_m(&reversed).unwrap();
    assert!(((a - b) / a).abs() < 1e-9);
}

#[test]
fn malformed_rings_are_unavailable() {
    assert!(ring_area_sq_m(&[]).is_none());
    assert!(ring_area_sq_m(&rect(34.0, -91.0, 34.01, -90.99)[..2]).is_none());
    assert!(ring_area_sq_m(&[
        LatLng::new(34.0, -91.0),
        LatLng::new(f64::NAN, -91.0),
        LatLng::new(34.01, -90.99),
    ])
    .is_none());
    // collinear
    assert!(ring_area_sq_m(&[
        LatLng::new(34.0, -91.0),
        LatLng::new(34.0, -90.99),
        LatLng::new(34.0, -90.98),
    ])
    .is_none());
}

#[test]
fn sub_polygon_wins_over_gps() {
    let field = field_with_acres();
    let drawn = SubPolygon {
        ring: rect(34.0, -91.0, 34.001, -90.999),
        measured_acres: Some(42.35),
    };

    let r = resolve_applied_acres(Some(&field), JobClass::Ordinary, field.crop_for(2024), Some(&drawn));
    assert_eq!(r.acres, 42.35);
    assert_eq!(r.source, AcreSource::SubPolygon);
}

#[test]
fn sub_polygon_without_measurement_is_measured() {
    let field = field_with_acres();
    let ring = rect(34.0, -91.0, 34.01, -90.99);
    let expected = ring_acres(&ring).unwrap();
    let drawn = SubPolygon {
        ring,
        measured_acres: None,
    };

    let r = resolve_applied_acres(Some(&field), JobClass::Ordinary, None, Some(&drawn));
    assert_eq!(r.acres, expected);
    assert_eq!(r.source, AcreSource::SubPolygon);
}

#[test]
fn broken_sub_polygon_falls_through() {
    let field = field_with_acres();
    let drawn = SubPolygon {
        ring: rect(34.0, -91.0, 34.01, -90.99)[..2].to_vec(),
        measured_acres: None,
    };

    let r = resolve_applied_acres(Some(&field), JobClass::Ordinary, None, Some(&drawn));
    assert_eq!(r.acres, 80.0);
    assert_eq!(r.source, AcreSource::Gps);
}

#[test]
fn precedence_chain() {
    let mut field = field_with_acres();
    field.drawn_acres = Some(70.0);
    let r = resolve_applied_acres(Some(&field), JobClass::Ordinary, None, None);
    assert_eq!((r.acres, r.source), (70.0, AcreSource::LegacyDrawn));

    field.drawn_acres = None;
    let r = resolve_applied_acres(Some(&field), JobClass::Ordinary, None, None);
    assert_eq!((r.acres, r.source), (80.0, AcreSource::Gps));

    field.gps_acres = Some(0.0);
    let r = resolve_applied_acres(Some(&field), JobClass::Ordinary, None, None);
    assert_eq!((r.acres, r.source), (78.5, AcreSource::Registry));

    field.registry_acres = None;
    let r = resolve_applied_acres(Some(&field), JobClass::Ordinary, None, None);
    assert_eq!((r.acres, r.source), (0.0, AcreSource::Unavailable));
}

#[test]
fn missing_field_resolves_to_zero() {
    let r = resolve_applied_acres(None, JobClass::Ordinary, None, None);
    assert_eq!(r.acres, 0.0);
    assert_eq!(r.source, AcreSource::Unavailable);

    let r = resolve_applied_acres(None, JobClass::Levee, Some(&Crop::Rice), None);
    assert_eq!(r.acres, 0.0);
}

#[test]
fn levee_uses_crop_override_only() {
    let field = field_with_acres();
    let drawn = SubPolygon::measure(rect(34.0, -91.0, 34.01, -90.99));

    let rice = resolve_applied_acres(Some(&field), JobClass::Levee, Some(&Crop::Rice), Some(&drawn));
    assert_eq!(rice.acres, 12.5);
    assert_eq!(rice.source, AcreSource::LeveeOverride);

    // No soybean override: zero, never the polygon or GPS area.
    let soy = resolve_applied_acres(Some(&field), JobClass::Levee, Some(&Crop::Soybean), Some(&drawn));
    assert_eq!(soy.acres, 0.0);
    assert_eq!(soy.source, AcreSource::Unavailable);

    let corn = resolve_applied_acres(Some(&field), JobClass::Levee, Some(&Crop::Corn), None);
    assert_eq!(corn.acres, 0.0);
}

#[test]
fn overlay_projection_is_aspect_preserving() {
    // twice as wide as tall
    let ring = rect(34.0, -91.0, 34.01, -90.98);
    let proj = OverlayProjection::fit(&ring, 100.0, 10.0).unwrap();
    let pts = proj.project_ring(&ring);

    let xs: Vec<f64> = pts.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pts.iter().map(|p| p.1).collect();
    let w = xs.iter().cloned().fold(f64::MIN, f64::max) - xs.iter().cloned().fold(f64::MAX, f64::min);
    let h = ys.iter().cloned().fold(f64::MIN, f64::max) - ys.iter().cloned().fold(f64::MAX, f64::min);
    assert!((w - 80.0).abs() < 1e-6);
    assert!((h - 40.0).abs() < 1e-6);

    // centered vertically inside the padding
    let top = ys.iter().cloned().fold(f64::MAX, f64::min);
    assert!((top - 30.0).abs() < 1e-6);

    assert!(OverlayProjection::fit(&[LatLng::new(34.0, -91.0)], 100.0, 10.0).is_none());
}
