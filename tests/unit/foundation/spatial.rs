use super::*;
use approx::assert_abs_diff_eq;

#[test]
fn unsupported_wkid_is_a_configuration_error() {
    assert!(SpatialReference::new(4326).is_ok());
    assert!(SpatialReference::new(102100).is_ok());
    let err = SpatialReference::new(2193).unwrap_err();
    assert!(err.to_string().contains("configuration error:"));
}

#[test]
fn web_mercator_aliases_are_equivalent() {
    let legacy = SpatialReference { wkid: 102100 };
    assert!(legacy.equivalent(SpatialReference::WEB_MERCATOR));
    assert!(!legacy.equivalent(SpatialReference::WGS84));
}

#[test]
fn mercator_round_trips_known_coordinates() {
    let sr = SpatialReference::WEB_MERCATOR;
    let origin = sr.from_lon_lat(Point::new(0.0, 0.0));
    assert_abs_diff_eq!(origin.x, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(origin.y, 0.0, epsilon = 1e-6);

    let edge = sr.from_lon_lat(Point::new(180.0, 0.0));
    assert_abs_diff_eq!(edge.x, 20_037_508.342_789_244, epsilon = 1e-3);

    let oakland = Point::new(-122.2711, 37.8044);
    let back = sr.to_lon_lat(sr.from_lon_lat(oakland));
    assert_abs_diff_eq!(back.x, oakland.x, epsilon = 1e-9);
    assert_abs_diff_eq!(back.y, oakland.y, epsilon = 1e-9);
}

#[test]
fn geographic_projection_is_identity() {
    let p = Point::new(12.5, -7.25);
    assert_eq!(SpatialReference::WGS84.to_lon_lat(p), p);
    assert_eq!(SpatialReference::WGS84.project_to(p, SpatialReference::WGS84), p);
}
