//! One full recomputation: assign, filter, sequence, stitch, link.
//!
//! Every control change (selected truck, threshold, snapshot time) reruns the
//! whole pipeline on the current snapshot. Nothing is carried over between
//! runs except the cached road network.

use std::sync::Arc;

use jiff::civil::DateTime;
use tracing::{info, warn};

use crate::assignment::{Assignment, assign};
use crate::config::DispatchConfig;
use crate::error::{ConfigurationError, DataError, DispatchError, RoutingUnavailable};
use crate::geometry::Point;
use crate::model::{BinRecord, Depot};
use crate::navigation::directions_url;
use crate::network::{NetworkCache, NetworkNode, Region, RoadNetworkProvider};
use crate::stitch::{PathGeometry, stitch};
use crate::tour::{Tour, build_tour, by_fill};

#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Minimum fill percentage (inclusive) for a pickup.
    pub fill_threshold: f64,
    /// Maximum stops in the tour, fullest bins first.
    pub capacity: Option<usize>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for PlanOptions {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            fill_threshold: config.fill_threshold,
            capacity: config.capacity,
        }
    }
}

/// How a bin relates to the selected truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinStatus {
    /// Full and assigned to the selected truck.
    Pickup,
    /// Full but assigned to another truck.
    OtherVehicle,
    /// Below the threshold.
    Safe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinView<'a> {
    pub bin: &'a BinRecord,
    pub depot: &'a Depot,
    pub status: BinStatus,
}

#[derive(Debug, Clone)]
pub struct Mission<'a> {
    pub depot: &'a Depot,
    /// Latest timestamp among the assigned records, `None` when nothing was
    /// assigned.
    pub snapshot_time: Option<DateTime>,
    /// Every full bin assigned to the depot, before the capacity cut.
    pub pickups: Vec<&'a BinRecord>,
    pub tour: Tour<'a>,
    pub path: PathGeometry,
    /// Only set when the tour has stops.
    pub navigation_url: Option<String>,
    pub bins: Vec<BinView<'a>>,
    pub skipped: Vec<DataError>,
}

impl Mission<'_> {
    pub fn assigned_pickups(&self) -> usize {
        self.pickups.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Full bins assigned to `depot_name`, in snapshot order.
pub fn pickups_for<'a>(
    assignment: &Assignment<'a>,
    depot_name: &str,
    fill_threshold: f64,
) -> Vec<&'a BinRecord> {
    assignment
        .bins_for(depot_name)
        .into_iter()
        .filter(|bin| bin.is_full(fill_threshold))
        .collect()
}

pub fn classify(bin: &BinRecord, depot: &Depot, selected: &str, fill_threshold: f64) -> BinStatus {
    match (bin.is_full(fill_threshold), depot.name == selected) {
        (true, true) => BinStatus::Pickup,
        (true, false) => BinStatus::OtherVehicle,
        (false, _) => BinStatus::Safe,
    }
}

/// Plan the selected truck's mission for one snapshot.
pub fn plan_mission<'a, N>(
    snapshot: &'a [BinRecord],
    config: &'a DispatchConfig,
    depot_name: &str,
    options: &PlanOptions,
    network: &N,
) -> Result<Mission<'a>, DispatchError>
where
    N: RoadNetworkProvider + ?Sized,
{
    config.validate()?;
    let depot = config.depot(depot_name)?;

    let assignment = assign(snapshot, &config.depots)?;
    // a snapshot from latest_per_bin mixes timestamps
    let snapshot_time = assignment.assigned.iter().map(|entry| entry.bin.timestamp).max();
    let pickups = pickups_for(&assignment, &depot.name, options.fill_threshold);

    let tour = build_tour(depot.location, config.terminal, &pickups, options.capacity, by_fill);
    let path = stitch(&tour.points(), network);
    let navigation_url = (!tour.is_empty()).then(|| directions_url(&tour));

    let bins = assignment
        .assigned
        .iter()
        .map(|entry| BinView {
            bin: entry.bin,
            depot: entry.depot,
            status: classify(entry.bin, entry.depot, &depot.name, options.fill_threshold),
        })
        .collect();

    info!(
        depot = %depot.name,
        pickups = pickups.len(),
        stops = tour.stops.len(),
        path_points = path.points().len(),
        fallback_segments = path.fallback_segments(),
        skipped = assignment.skipped.len(),
        "planned mission"
    );

    Ok(Mission {
        depot,
        snapshot_time,
        pickups,
        tour,
        path,
        navigation_url,
        bins,
        skipped: assignment.skipped,
    })
}

/// Provider used when no road network could be built: every segment is drawn
/// straight.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrouted;

impl RoadNetworkProvider for Unrouted {
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

/// Long-lived planner: static configuration plus the road network cache.
#[derive(Debug)]
pub struct Dispatcher<P> {
    config: DispatchConfig,
    networks: NetworkCache<P>,
}

impl<P: RoadNetworkProvider> Dispatcher<P> {
    pub fn new(config: DispatchConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            networks: NetworkCache::new(),
        })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn default_options(&self) -> PlanOptions {
        PlanOptions::from(&self.config)
    }

    /// Road network for the configured region, built on first use.
    pub fn network<E, F>(&self, load: F) -> Result<Arc<P>, E>
    where
        F: FnOnce(&Region) -> Result<P, E>,
    {
        self.networks.get_or_load(&self.config.region, load)
    }

    /// Plan a mission, building the road network if needed.
    ///
    /// If the network cannot be built the mission is still planned, with
    /// straight segments between stops.
    pub fn plan<'a, E, F>(
        &'a self,
        snapshot: &'a [BinRecord],
        depot_name: &str,
        options: &PlanOptions,
        load: F,
    ) -> Result<Mission<'a>, DispatchError>
    where
        E: std::fmt::Display,
        F: FnOnce(&Region) -> Result<P, E>,
    {
        match self.network(load) {
            Ok(network) => {
                plan_mission(snapshot, &self.config, depot_name, options, network.as_ref())
            }
            Err(err) => {
                warn!(%err, "road network unavailable, planning without roads");
                plan_mission(snapshot, &self.config, depot_name, options, &Unrouted)
            }
        }
    }
}
