//! Geodesy properties over a spread of real-world coordinates.

mod common;

use trajectory_engine::geodesy::{
    bearing_degrees, distance_km, haversine_km, midpoint, within_radius,
};
use trajectory_engine::Coordinate;

use common::approx_eq;

fn cities() -> Vec<Coordinate> {
    vec![
        Coordinate::new(-23.5505, -46.6333), // São Paulo
        Coordinate::new(-22.9068, -43.1729), // Rio de Janeiro
        Coordinate::new(51.5074, -0.1278),   // London
        Coordinate::new(48.8566, 2.3522),    // Paris
        Coordinate::new(35.6762, 139.6503),  // Tokyo
        Coordinate::new(-33.8688, 151.2093), // Sydney
        Coordinate::new(64.1466, -21.9426),  // Reykjavik
        Coordinate::new(0.0, 179.9),
        Coordinate::new(0.0, -179.9),
        Coordinate::new(90.0, 0.0),
        Coordinate::new(-90.0, 0.0),
    ]
}

#[test]
fn test_distance_is_symmetric_and_zero_on_identity() {
    for a in cities() {
        assert_eq!(distance_km(a, a), 0.0);
        for b in cities() {
            assert_eq!(distance_km(a, b), distance_km(b, a), "{:?} / {:?}", a, b);
        }
    }
}

#[test]
fn test_bearing_is_always_in_range() {
    for a in cities() {
        for b in cities() {
            let bearing = bearing_degrees(a, b);
            assert!((0.0..360.0).contains(&bearing), "{:?} -> {:?} = {}", a, b, bearing);
        }
    }
}

#[test]
fn test_distance_never_exceeds_half_circumference() {
    let half = std::f64::consts::PI * 6371.0;
    for a in cities() {
        for b in cities() {
            assert!(haversine_km(a, b) <= half + 1e-9);
        }
    }
}

#[test]
fn test_midpoint_is_equidistant() {
    let cities = cities();
    for pair in cities.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let m = midpoint(a, b);
        let total = haversine_km(a, b);
        // Antipodal pairs have no unique midpoint.
        if total > 20_000.0 {
            continue;
        }
        assert!(
            approx_eq(haversine_km(a, m), haversine_km(m, b), 1e-6),
            "{:?} {:?} -> {:?}",
            a,
            b,
            m
        );
        assert!(approx_eq(haversine_km(a, m) * 2.0, total, 1e-6));
    }
}

#[test]
fn test_antimeridian_neighbors_are_close() {
    let east = Coordinate::new(0.0, 179.9);
    let west = Coordinate::new(0.0, -179.9);
    assert!(approx_eq(distance_km(east, west), 22.24, 0.01));
    assert_eq!(bearing_degrees(east, west), 90.0);

    let m = midpoint(east, west);
    assert!(approx_eq(m.longitude.abs(), 180.0, 1e-9));
}

#[test]
fn test_geofence_matches_distance() {
    let depot = Coordinate::new(-23.5505, -46.6333);
    for c in cities() {
        let d = distance_km(c, depot);
        assert!(within_radius(c, depot, d));
        if d > 0.0 {
            assert!(!within_radius(c, depot, d - 0.01));
        }
    }
}
