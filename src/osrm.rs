//! OSRM HTTP adapter for node snapping and road paths.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::RoutingUnavailable;
use crate::geometry::Point;
use crate::network::{NetworkNode, RoadNetworkProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn nearest_url(&self, point: Point) -> String {
        format!(
            "{}/nearest/v1/{}/{:.6},{:.6}?number=1",
            self.config.base_url, self.config.profile, point.lon, point.lat
        )
    }

    pub fn route_url(&self, from: Point, to: Point) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=geojson",
            self.config.base_url, self.config.profile, from.lon, from.lat, to.lon, to.lat
        )
    }

    fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, RoutingUnavailable> {
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<T>())?;
        Ok(body)
    }
}

impl RoadNetworkProvider for OsrmClient {
    fn nearest_node(&self, point: Point) -> Result<NetworkNode, RoutingUnavailable> {
        let body: OsrmNearestResponse = self.get(self.nearest_url(point))?;
        ensure_ok(&body.code, body.message.as_deref())?;

        let waypoint = body
            .waypoints
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(RoutingUnavailable::NoNearbyNode {
                lat: point.lat,
                lon: point.lon,
            })?;

        let [lon, lat] = waypoint.location;
        Ok(NetworkNode {
            id: waypoint.nodes.first().copied().unwrap_or_default(),
            location: Point::new(lat, lon),
        })
    }

    fn shortest_path(
        &self,
        from: &NetworkNode,
        to: &NetworkNode,
    ) -> Result<Vec<Point>, RoutingUnavailable> {
        let body: OsrmRouteResponse = self.get(self.route_url(from.location, to.location))?;
        ensure_ok(&body.code, body.message.as_deref())?;

        let route = body
            .routes
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(RoutingUnavailable::NoPath {
                from: from.id,
                to: to.id,
            })?;

        let points: Vec<Point> = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| Point::new(lat, lon))
            .collect();

        if points.is_empty() {
            return Err(RoutingUnavailable::Response("route has no geometry".to_string()));
        }
        Ok(points)
    }
}

fn ensure_ok(code: &str, message: Option<&str>) -> Result<(), RoutingUnavailable> {
    if code == "Ok" {
        Ok(())
    } else {
        Err(RoutingUnavailable::Response(format!(
            "{}: {}",
            code,
            message.unwrap_or("no message")
        )))
    }
}

#[derive(Debug, Deserialize)]
struct OsrmNearestResponse {
    code: String,
    message: Option<String>,
    waypoints: Option<Vec<OsrmWaypoint>>,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    /// [lon, lat]
    location: [f64; 2],
    #[serde(default)]
    nodes: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}
