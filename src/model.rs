//! Bin records, depots and snapshot selection.
//!
//! Records arrive already parsed and typed. The serde aliases accept both the
//! long (`bin_location_lat`) and short (`lat`) column names so ingestion can
//! deserialize rows straight into [`BinRecord`].

use std::collections::HashMap;

use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Position in the sorted list of snapshot times used as the default view.
const DEFAULT_SNAPSHOT_FRACTION: f64 = 0.8;

/// One fill-level observation of one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinRecord {
    pub bin_id: String,
    #[serde(rename = "bin_location_lat", alias = "lat")]
    pub lat: f64,
    #[serde(rename = "bin_location_lon", alias = "lon")]
    pub lon: f64,
    /// Fill percentage. Expected 0-100 but never clamped.
    #[serde(rename = "bin_fill_percent", alias = "fill")]
    pub fill: f64,
    pub timestamp: DateTime,
}

impl BinRecord {
    pub fn new(
        bin_id: impl Into<String>,
        lat: f64,
        lon: f64,
        fill: f64,
        timestamp: DateTime,
    ) -> Self {
        Self {
            bin_id: bin_id.into(),
            lat,
            lon,
            fill,
            timestamp,
        }
    }

    pub fn location(&self) -> Point {
        Point::new(self.lat, self.lon)
    }

    pub fn is_full(&self, threshold: f64) -> bool {
        self.fill >= threshold
    }
}

/// A named garage a truck starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub name: String,
    pub location: Point,
}

impl Depot {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            location: Point::new(lat, lon),
        }
    }
}

/// Sorted, de-duplicated timestamps present in `records`.
pub fn snapshot_times(records: &[BinRecord]) -> Vec<DateTime> {
    let mut times: Vec<DateTime> = records.iter().map(|record| record.timestamp).collect();
    times.sort();
    times.dedup();
    times
}

/// The snapshot time shown before the user picks one: 80% of the way through
/// the observed times, where bins are likely to be full.
pub fn default_snapshot_time(records: &[BinRecord]) -> Option<DateTime> {
    let times = snapshot_times(records);
    if times.is_empty() {
        return None;
    }
    let index = (times.len() as f64 * DEFAULT_SNAPSHOT_FRACTION) as usize;
    times.get(index.min(times.len() - 1)).copied()
}

/// Records observed exactly at `time`, in input order.
pub fn snapshot_at(records: &[BinRecord], time: DateTime) -> Vec<BinRecord> {
    records
        .iter()
        .filter(|record| record.timestamp == time)
        .cloned()
        .collect()
}

/// Most recent record per bin id, ordered by each bin's first appearance.
///
/// When two records of a bin share the latest timestamp the later one in
/// input order wins.
pub fn latest_per_bin(records: &[BinRecord]) -> Vec<BinRecord> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<&BinRecord> = Vec::new();

    for record in records {
        match slots.get(record.bin_id.as_str()) {
            Some(&slot) => {
                if record.timestamp >= latest[slot].timestamp {
                    latest[slot] = record;
                }
            }
            None => {
                slots.insert(record.bin_id.as_str(), latest.len());
                latest.push(record);
            }
        }
    }

    latest.into_iter().cloned().collect()
}
