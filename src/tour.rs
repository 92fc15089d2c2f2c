//! Greedy nearest-neighbour tour construction.
//!
//! The tour starts at a depot, visits the selected bins by repeatedly going to
//! the closest unvisited one and finishes at the terminal point. It is a
//! heuristic: the result is a valid visiting order, not a shortest one.
//!
//! # Complexity
//!
//! O(n²) in the number of selected bins. Fine for the handful of stops a
//! truck takes per mission; larger inputs need a spatial index.

use std::cmp::Ordering;

use crate::geometry::{Point, distance};
use crate::model::BinRecord;

/// Ordered visiting plan for one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour<'a> {
    pub start: Point,
    pub stops: Vec<&'a BinRecord>,
    pub end: Point,
}

impl Tour<'_> {
    /// `start`, every stop location, then `end`.
    pub fn points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.stops.len() + 2);
        points.push(self.start);
        points.extend(self.stops.iter().map(|bin| bin.location()));
        points.push(self.end);
        points
    }

    pub fn stop_points(&self) -> Vec<Point> {
        self.stops.iter().map(|bin| bin.location()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Planar length of the straight-line tour, in degrees.
    pub fn planar_length(&self) -> f64 {
        self.points()
            .windows(2)
            .map(|pair| distance(pair[0], pair[1]))
            .sum()
    }
}

/// Keep at most `capacity` candidates, highest priority first.
///
/// Equal priorities keep their input order. The returned subset is in input
/// order, not priority order. Keys that do not compare equal to themselves
/// (NaN) rank after every other key.
pub fn select_by_priority<'a, K, F>(
    candidates: &[&'a BinRecord],
    capacity: Option<usize>,
    priority_key: F,
) -> Vec<&'a BinRecord>
where
    K: PartialOrd,
    F: Fn(&BinRecord) -> K,
{
    let limit = match capacity {
        Some(limit) if limit < candidates.len() => limit,
        _ => return candidates.to_vec(),
    };

    let keys: Vec<K> = candidates.iter().map(|bin| priority_key(*bin)).collect();
    let mut ranked: Vec<usize> = (0..candidates.len()).collect();
    // stable sort: equal keys stay in input order
    ranked.sort_by(|&a, &b| descending(&keys[a], &keys[b]));
    ranked.truncate(limit);
    ranked.sort_unstable();

    ranked.into_iter().map(|index| candidates[index]).collect()
}

/// Total descending order over partially ordered keys.
fn descending<K: PartialOrd>(a: &K, b: &K) -> Ordering {
    let unordered = |key: &K| key.partial_cmp(key).is_none();
    match (unordered(a), unordered(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(a).unwrap_or(Ordering::Equal),
    }
}

/// Order `stops` by repeatedly taking the one closest to the current position.
///
/// Equal distances go to the stop that appears first in `stops`.
pub fn nearest_neighbor_order<'a>(start: Point, stops: &[&'a BinRecord]) -> Vec<&'a BinRecord> {
    let mut unvisited: Vec<&'a BinRecord> = stops.to_vec();
    let mut ordered = Vec::with_capacity(unvisited.len());
    let mut current = start;

    while !unvisited.is_empty() {
        let mut best_index = 0;
        let mut best_distance = f64::INFINITY;
        for (index, bin) in unvisited.iter().enumerate() {
            let d = distance(current, bin.location());
            if d < best_distance {
                best_distance = d;
                best_index = index;
            }
        }

        let next = unvisited.remove(best_index);
        current = next.location();
        ordered.push(next);
    }

    ordered
}

/// Build the tour for one vehicle.
///
/// With no candidates the tour is just `[start, end]`.
pub fn build_tour<'a, K, F>(
    start: Point,
    end: Point,
    candidates: &[&'a BinRecord],
    capacity: Option<usize>,
    priority_key: F,
) -> Tour<'a>
where
    K: PartialOrd,
    F: Fn(&BinRecord) -> K,
{
    let selected = select_by_priority(candidates, capacity, priority_key);
    let stops = nearest_neighbor_order(start, &selected);
    Tour { start, stops, end }
}

/// Priority used by the dispatcher: fuller bins first.
pub fn by_fill(bin: &BinRecord) -> f64 {
    bin.fill
}
