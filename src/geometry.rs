//! Geographic points and distances.
//!
//! `distance` is the planar metric used for every assignment and sequencing
//! decision. It works on raw degrees, so results are not metres and are only
//! comparable within one city-sized area. `haversine_m` exists for reporting
//! path lengths to humans.

use serde::{Deserialize, Serialize};

/// Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Formats as `lat,lon`, the form mapping services expect in query strings.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

impl From<(f64, f64)> for Point {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl From<Point> for (f64, f64) {
    fn from(point: Point) -> Self {
        (point.lat, point.lon)
    }
}

/// Euclidean distance between two points treated as planar (lat, lon) pairs.
pub fn distance(p1: Point, p2: Point) -> f64 {
    ((p1.lat - p2.lat).powi(2) + (p1.lon - p2.lon).powi(2)).sqrt()
}

/// Great-circle distance between two points in metres.
pub fn haversine_m(from: Point, to: Point) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_same_point() {
        let p = Point::new(19.0178, 72.8478);
        assert_eq!(distance(p, p), 0.0);
    }

    #[test]
    fn test_distance_is_planar() {
        let d = distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = Point::new(19.0596, 72.8295);
        let b = Point::new(19.2307, 72.8567);
        assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn test_haversine_known_distance() {
        // Worli garage to Borivali garage, roughly 23.5 km apart
        let m = haversine_m(Point::new(19.0178, 72.8478), Point::new(19.2307, 72.8567));
        assert!(m > 22_000.0 && m < 25_000.0, "Worli to Borivali should be ~23.7km, got {}", m);
    }

    #[test]
    fn test_to_query() {
        assert_eq!(Point::new(19.055, 72.925).to_query(), "19.055,72.925");
    }
}
