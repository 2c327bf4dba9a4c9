//! Great-circle course and distance on a spherical earth.

use crate::models::Coordinate;
use std::f64::consts::PI;

/// Metres per international nautical mile.
pub const METERS_PER_NM: f64 = 1852.0;

/// Convert an angular distance in radians to nautical miles.
fn radians_to_nm(r: f64) -> f64 {
    ((180.0 * 60.0) / PI) * r
}

/// Initial course (degrees, [0, 360)) and distance (nautical miles) from
/// point 1 to point 2.
///
/// Coincident points yield a distance of 0 and a course of 0; callers should
/// not read anything into the course of a zero-length leg.
pub fn course_and_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();
    let dlon = lon2 - lon1;

    let d = 2.0
        * (((lat1 - lat2) / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2))
        .sqrt()
        .asin();

    let course = (dlon.sin() * lat2.cos())
        .atan2(lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos())
        .rem_euclid(2.0 * PI);

    // rem_euclid can round up to exactly 2π for tiny negative angles
    let course_deg = course.to_degrees();
    let course_deg = if course_deg >= 360.0 { 0.0 } else { course_deg };

    (course_deg, radians_to_nm(d))
}

/// Course in degrees and distance in metres between two coordinates.
pub fn course_and_distance_m(from: Coordinate, to: Coordinate) -> (f64, f64) {
    let (course, nm) = course_and_distance(from.lat, from.lon, to.lat, to.lon);
    (course, nm * METERS_PER_NM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_sixty_nm() {
        let (course, nm) = course_and_distance(0.0, 0.0, 1.0, 0.0);
        assert!((nm - 60.0).abs() < 1e-9, "got {nm}");
        assert!(course.abs() < 1e-9);
    }

    #[test]
    fn cardinal_courses() {
        let (east, _) = course_and_distance(0.0, 0.0, 0.0, 1.0);
        let (south, _) = course_and_distance(0.0, 0.0, -1.0, 0.0);
        let (west, _) = course_and_distance(0.0, 0.0, 0.0, -1.0);
        assert!((east - 90.0).abs() < 1e-9);
        assert!((south - 180.0).abs() < 1e-9);
        assert!((west - 270.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_points_have_zero_distance() {
        let (course, nm) = course_and_distance(51.0, -1.0, 51.0, -1.0);
        assert_eq!(nm, 0.0);
        assert!((0.0..360.0).contains(&course));
    }

    #[test]
    fn distance_is_symmetric_and_courses_reciprocal() {
        let samples = [
            (51.0, -1.0, 51.01, -1.01),
            (33.6846, -117.8265, 33.70, -117.80),
            (-33.9, 151.2, -34.1, 150.9),
            (10.0, 179.9, 10.2, -179.9),
        ];
        for (lat1, lon1, lat2, lon2) in samples {
            let (c_ab, d_ab) = course_and_distance(lat1, lon1, lat2, lon2);
            let (c_ba, d_ba) = course_and_distance(lat2, lon2, lat1, lon1);
            assert!(d_ab > 0.0);
            assert!((d_ab - d_ba).abs() < 1e-9);
            assert!((0.0..360.0).contains(&c_ab));
            assert!((0.0..360.0).contains(&c_ba));
            let diff = (c_ab - c_ba).rem_euclid(360.0);
            assert!((diff - 180.0).abs() < 1.0, "courses {c_ab} / {c_ba}");
        }
    }

    #[test]
    fn metres_use_nautical_mile_factor() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 1.0);
        let (_, m) = course_and_distance_m(a, b);
        assert!((m - 60.0 * METERS_PER_NM).abs() < 1e-6);
    }
}
