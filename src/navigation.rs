//! Multi-stop directions links for the driver's phone.

use crate::geometry::Point;
use crate::tour::Tour;

const DIRECTIONS_ENDPOINT: &str = "https://www.google.com/maps/dir/?api=1";

/// A tour split the way directions services want it.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationStops {
    pub origin: Point,
    pub destination: Point,
    pub waypoints: Vec<Point>,
}

impl NavigationStops {
    pub fn from_tour(tour: &Tour<'_>) -> Self {
        Self {
            origin: tour.start,
            destination: tour.end,
            waypoints: tour.stop_points(),
        }
    }

    /// `origin=..&destination=..&waypoints=a|b`, with `waypoints` left out
    /// when there are none.
    pub fn query(&self) -> String {
        let mut query = format!(
            "origin={}&destination={}",
            self.origin.to_query(),
            self.destination.to_query()
        );
        if !self.waypoints.is_empty() {
            let waypoints = self
                .waypoints
                .iter()
                .map(Point::to_query)
                .collect::<Vec<_>>()
                .join("|");
            query.push_str("&waypoints=");
            query.push_str(&waypoints);
        }
        query
    }
}

/// Driving directions URL covering every stop of `tour` in order.
pub fn directions_url(tour: &Tour<'_>) -> String {
    let stops = NavigationStops::from_tour(tour);
    format!("{}&{}&travelmode=driving", DIRECTIONS_ENDPOINT, stops.query())
}
