//! Real Mumbai locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

use bin_dispatch::graph::{GraphNode, RoadGraph};
use bin_dispatch::{BinRecord, Point};
use jiff::civil::{DateTime, date};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }

    pub fn point(&self) -> Point {
        Point::new(self.lat, self.lon)
    }
}

// ============================================================================
// Truck garages and the disposal site
// ============================================================================

pub const DEONAR_DUMPING: Location = Location::new("Deonar Dumping Ground", 19.0550, 72.9250);

// ============================================================================
// Bin sites, grouped by the garage they sit closest to
// ============================================================================

pub const WORLI_BINS: &[Location] = &[
    Location::new("Worli Naka", 19.0096, 72.8176),
    Location::new("Worli Sea Face", 19.0120, 72.8155),
    Location::new("Lower Parel Station", 18.9951, 72.8304),
    Location::new("Phoenix Palladium", 18.9946, 72.8246),
];

pub const BANDRA_BINS: &[Location] = &[
    Location::new("Bandstand Promenade", 19.0433, 72.8197),
    Location::new("Hill Road", 19.0547, 72.8331),
    Location::new("Carter Road", 19.0650, 72.8220),
];

pub const ANDHERI_BINS: &[Location] = &[
    Location::new("Andheri Station East", 19.1197, 72.8468),
    Location::new("SEEPZ Gate", 19.1279, 72.8746),
];

pub const BORIVALI_BINS: &[Location] = &[
    Location::new("Borivali Station West", 19.2291, 72.8574),
    Location::new("National Park Gate", 19.2288, 72.8654),
];

pub fn snapshot_time() -> DateTime {
    date(2024, 3, 1).at(18, 0, 0, 0)
}

pub fn bin_at(location: &Location, fill: f64) -> BinRecord {
    BinRecord::new(location.name, location.lat, location.lon, fill, snapshot_time())
}

/// One snapshot covering every fixture location with the given fills, in
/// fixture order (Worli, Bandra, Andheri, Borivali).
pub fn city_snapshot(fills: &[f64]) -> Vec<BinRecord> {
    WORLI_BINS
        .iter()
        .chain(BANDRA_BINS)
        .chain(ANDHERI_BINS)
        .chain(BORIVALI_BINS)
        .zip(fills.iter().copied().chain(std::iter::repeat(50.0)))
        .map(|(location, fill)| bin_at(location, fill))
        .collect()
}

/// Road corridor: Worli garage - Worli Naka - Worli Sea Face - Bandra garage,
/// with a spur to Lower Parel. Edge lengths are great-circle distances.
pub fn worli_bandra_graph() -> RoadGraph {
    let nodes = vec![
        GraphNode { id: 1, location: Point::new(19.0178, 72.8478) },
        GraphNode { id: 2, location: Point::new(19.0096, 72.8176) },
        GraphNode { id: 3, location: Point::new(19.0120, 72.8155) },
        GraphNode { id: 4, location: Point::new(19.0596, 72.8295) },
        GraphNode { id: 5, location: Point::new(18.9951, 72.8304) },
        GraphNode { id: 6, location: Point::new(19.0350, 72.8600) },
    ];
    RoadGraph::from_segments(nodes, &[(1, 2), (2, 3), (3, 4), (1, 5), (5, 2)])
        .expect("fixture graph is valid")
}
