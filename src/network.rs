//! Road network provider interface and the per-region network cache.
//!
//! Building a routable graph for a city is expensive. Once built, a network
//! is read-only, so the cache hands out shared `Arc`s and never mutates them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RoutingUnavailable;
use crate::geometry::Point;

/// A routable node resolved from a geographic point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkNode {
    pub id: u64,
    pub location: Point,
}

/// Resolves points onto a road graph and finds shortest paths by length.
///
/// Implementations must be usable through a shared reference: the stitcher
/// only reads from them.
pub trait RoadNetworkProvider {
    /// Graph node closest to `point`.
    fn nearest_node(&self, point: Point) -> Result<NetworkNode, RoutingUnavailable>;

    /// Node coordinates along the shortest path from `from` to `to`, both ends
    /// included.
    fn shortest_path(
        &self,
        from: &NetworkNode,
        to: &NetworkNode,
    ) -> Result<Vec<Point>, RoutingUnavailable>;
}

impl<P: RoadNetworkProvider + ?Sized> RoadNetworkProvider for Arc<P> {
    fn nearest_node(&self, point: Point) -> Result<NetworkNode, RoutingUnavailable> {
        (**self).nearest_node(point)
    }

    fn shortest_path(
        &self,
        from: &NetworkNode,
        to: &NetworkNode,
    ) -> Result<Vec<Point>, RoutingUnavailable> {
        (**self).shortest_path(from, to)
    }
}

/// Area a road network covers: a radius around a centre point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Point,
    pub dist_m: f64,
    /// Kind of roads included, e.g. "drive".
    pub network_type: String,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            center: Point::new(19.0760, 72.8777),
            dist_m: 8000.0,
            network_type: "drive".to_string(),
        }
    }
}

impl Region {
    fn key(&self) -> RegionKey {
        RegionKey {
            lat_bits: self.center.lat.to_bits(),
            lon_bits: self.center.lon.to_bits(),
            dist_bits: self.dist_m.to_bits(),
            network_type: self.network_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RegionKey {
    lat_bits: u64,
    lon_bits: u64,
    dist_bits: u64,
    network_type: String,
}

/// Builds each region's network once and shares it afterwards.
///
/// Failed loads are not cached, so the next request retries the build.
#[derive(Debug)]
pub struct NetworkCache<P> {
    networks: RwLock<HashMap<RegionKey, Arc<P>>>,
}

impl<P> Default for NetworkCache<P> {
    fn default() -> Self {
        Self {
            networks: RwLock::new(HashMap::new()),
        }
    }
}

impl<P> NetworkCache<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached network for `region`, building it with `load` on first use.
    pub fn get_or_load<E, F>(&self, region: &Region, load: F) -> Result<Arc<P>, E>
    where
        F: FnOnce(&Region) -> Result<P, E>,
    {
        let key = region.key();

        {
            let networks = self.networks.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(network) = networks.get(&key) {
                debug!(network_type = %region.network_type, "road network cache hit");
                return Ok(Arc::clone(network));
            }
        }

        info!(
            lat = region.center.lat,
            lon = region.center.lon,
            dist_m = region.dist_m,
            network_type = %region.network_type,
            "building road network"
        );
        let network = Arc::new(load(region)?);

        let mut networks = self.networks.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = networks.entry(key).or_insert(network);
        Ok(Arc::clone(entry))
    }

    pub fn get(&self, region: &Region) -> Option<Arc<P>> {
        let networks = self.networks.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        networks.get(&region.key()).cloned()
    }

    pub fn len(&self) -> usize {
        let networks = self.networks.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
