//! Road-following geometry for a tour.
//!
//! Each consecutive pair of tour points is snapped onto the road network and
//! joined by the shortest path between the snapped nodes. A pair the network
//! cannot resolve falls back to a straight segment, so one unreachable stop
//! never loses the rest of the route.
//!
//! Segments are concatenated as-is: the last point of one segment and the
//! first of the next may repeat.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RoutingUnavailable;
use crate::geometry::{Point, haversine_m};
use crate::network::RoadNetworkProvider;

/// Drawable coordinates for a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathGeometry {
    points: Vec<Point>,
    /// Segments drawn as straight lines because routing failed.
    fallback_segments: usize,
}

impl PathGeometry {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            fallback_segments: 0,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn fallback_segments(&self) -> usize {
        self.fallback_segments
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Great-circle length of the polyline in metres.
    pub fn length_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine_m(pair[0], pair[1]))
            .sum()
    }

    /// `(lat, lon)` pairs as map renderers expect them.
    pub fn to_lat_lon(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|&point| <(f64, f64)>::from(point)).collect()
    }
}

fn road_segment<N>(network: &N, from: Point, to: Point) -> Result<Vec<Point>, RoutingUnavailable>
where
    N: RoadNetworkProvider + ?Sized,
{
    let a = network.nearest_node(from)?;
    let b = network.nearest_node(to)?;
    let path = network.shortest_path(&a, &b)?;
    if path.is_empty() {
        return Err(RoutingUnavailable::NoPath { from: a.id, to: b.id });
    }
    Ok(path)
}

/// Stitch `route` onto `network`.
///
/// Never fails. A route with fewer than two points is returned unchanged.
/// Road paths start and end at snapped network nodes, so the route's own
/// first and last points are added as connectors when they differ.
pub fn stitch<N>(route: &[Point], network: &N) -> PathGeometry
where
    N: RoadNetworkProvider + ?Sized,
{
    if route.len() < 2 {
        return PathGeometry::new(route.to_vec());
    }

    let mut points = Vec::new();
    let mut fallback_segments = 0;

    for (index, pair) in route.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        match road_segment(network, from, to) {
            Ok(path) => {
                debug!(segment = index, nodes = path.len(), "routed segment");
                points.extend(path);
            }
            Err(err) => {
                warn!(segment = index, %err, "routing unavailable, drawing straight segment");
                fallback_segments += 1;
                points.push(from);
                points.push(to);
            }
        }
    }

    let (origin, destination) = (route[0], route[route.len() - 1]);
    if points.first() != Some(&origin) {
        points.insert(0, origin);
    }
    if points.last() != Some(&destination) {
        points.push(destination);
    }

    PathGeometry {
        points,
        fallback_segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkNode;

    struct Offline;

    impl RoadNetworkProvider for Offline {
        fn nearest_node(&self, point: Point) -> Result<NetworkNode, RoutingUnavailable> {
            Err(RoutingUnavailable::NoNearbyNode {
                lat: point.lat,
                lon: point.lon,
            })
        }

        fn shortest_path(
            &self,
            from: &NetworkNode,
            to: &NetworkNode,
        ) -> Result<Vec<Point>, RoutingUnavailable> {
            Err(RoutingUnavailable::NoPath { from: from.id, to: to.id })
        }
    }

    #[test]
    fn test_offline_returns_raw_route() {
        let route = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)];
        let geometry = stitch(&route, &Offline);
        assert_eq!(
            geometry.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 0.0),
            ]
        );
        assert_eq!(geometry.fallback_segments(), 2);
    }

    #[test]
    fn test_single_point_route() {
        let route = vec![Point::new(3.0, 3.0)];
        let geometry = stitch(&route, &Offline);
        assert_eq!(geometry.points(), &route[..]);
        assert_eq!(geometry.fallback_segments(), 0);
    }

    #[test]
    fn test_empty_route() {
        let geometry = stitch(&[], &Offline);
        assert!(geometry.is_empty());
    }

    #[test]
    fn test_length_m() {
        let geometry = PathGeometry::new(vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0)]);
        // one degree of longitude on the equator
        assert!((geometry.length_m() - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn test_to_lat_lon() {
        let geometry = PathGeometry::new(vec![Point::new(19.0, 72.8)]);
        assert_eq!(geometry.to_lat_lon(), vec![(19.0, 72.8)]);
    }
}
