//! Nearest-depot assignment.
//!
//! Each bin goes to the depot with the smallest planar distance. This is a
//! greedy answer to the assignment problem: there is no balancing between
//! depots. Ties go to the depot listed first.

use tracing::{debug, warn};

use crate::error::{ConfigurationError, DataError};
use crate::geometry::{Point, distance};
use crate::model::{BinRecord, Depot};

/// One bin and the depot it was assigned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignedBin<'a> {
    pub bin: &'a BinRecord,
    pub depot: &'a Depot,
}

/// Result of assigning a snapshot of bins.
///
/// `assigned` follows input order. Records that could not be placed are
/// reported in `skipped` rather than failing the whole snapshot.
#[derive(Debug, Clone, Default)]
pub struct Assignment<'a> {
    pub assigned: Vec<AssignedBin<'a>>,
    pub skipped: Vec<DataError>,
}

impl<'a> Assignment<'a> {
    /// Bins assigned to `depot_name`, in input order.
    pub fn bins_for(&self, depot_name: &str) -> Vec<&'a BinRecord> {
        self.assigned
            .iter()
            .filter(|entry| entry.depot.name == depot_name)
            .map(|entry| entry.bin)
            .collect()
    }

    pub fn depot_of(&self, bin_id: &str) -> Option<&'a Depot> {
        self.assigned
            .iter()
            .find(|entry| entry.bin.bin_id == bin_id)
            .map(|entry| entry.depot)
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Depot closest to `point`, first listed wins on ties.
pub fn nearest_depot(point: Point, depots: &[Depot]) -> Option<&Depot> {
    let mut best: Option<(&Depot, f64)> = None;
    for depot in depots {
        let d = distance(point, depot.location);
        match best {
            Some((_, best_distance)) if d >= best_distance => {}
            _ => best = Some((depot, d)),
        }
    }
    best.map(|(depot, _)| depot)
}

/// Check a record is usable for routing.
pub fn validate_record(bin: &BinRecord) -> Result<(), DataError> {
    if !bin.location().is_finite() {
        return Err(DataError::NonFiniteCoordinates {
            bin_id: bin.bin_id.clone(),
        });
    }
    if !bin.fill.is_finite() {
        return Err(DataError::NonFiniteFill {
            bin_id: bin.bin_id.clone(),
        });
    }
    if !(0.0..=100.0).contains(&bin.fill) {
        warn!(
            bin_id = %bin.bin_id,
            fill = bin.fill,
            "fill percentage outside 0-100, keeping as-is"
        );
    }
    Ok(())
}

/// Assign every bin to its nearest depot.
///
/// Fails only when `depots` is empty. Bad records are skipped and reported.
pub fn assign<'a>(
    bins: &'a [BinRecord],
    depots: &'a [Depot],
) -> Result<Assignment<'a>, ConfigurationError> {
    if depots.is_empty() {
        return Err(ConfigurationError::NoDepots);
    }

    let mut assignment = Assignment::default();

    for bin in bins {
        if let Err(err) = validate_record(bin) {
            warn!(bin_id = %err.bin_id(), %err, "skipping bin");
            assignment.skipped.push(err);
            continue;
        }

        // depots is non-empty, so a nearest depot always exists
        if let Some(depot) = nearest_depot(bin.location(), depots) {
            assignment.assigned.push(AssignedBin { bin, depot });
        }
    }

    debug!(
        assigned = assignment.assigned.len(),
        skipped = assignment.skipped.len(),
        depots = depots.len(),
        "assigned bins to depots"
    );

    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn bin(id: &str, lat: f64, lon: f64, fill: f64) -> BinRecord {
        BinRecord::new(id, lat, lon, fill, date(2024, 3, 1).at(8, 0, 0, 0))
    }

    fn depots() -> Vec<Depot> {
        vec![Depot::new("A", 0.0, 0.0), Depot::new("B", 10.0, 10.0)]
    }

    #[test]
    fn test_assigns_to_nearest() {
        let bins = vec![
            bin("0", 1.0, 1.0, 90.0),
            bin("1", 9.0, 9.0, 80.0),
            bin("2", 0.5, 0.5, 60.0),
        ];
        let depots = depots();
        let assignment = assign(&bins, &depots).unwrap();

        assert_eq!(assignment.assigned.len(), 3);
        assert_eq!(assignment.depot_of("0").unwrap().name, "A");
        assert_eq!(assignment.depot_of("1").unwrap().name, "B");
        assert_eq!(assignment.depot_of("2").unwrap().name, "A");
    }

    #[test]
    fn test_empty_depots_is_configuration_error() {
        let bins = vec![bin("0", 1.0, 1.0, 90.0)];
        assert!(matches!(assign(&bins, &[]), Err(ConfigurationError::NoDepots)));
    }

    #[test]
    fn test_tie_goes_to_first_depot() {
        let bins = vec![bin("mid", 5.0, 5.0, 90.0)];
        let depots = depots();
        let assignment = assign(&bins, &depots).unwrap();
        assert_eq!(assignment.depot_of("mid").unwrap().name, "A");

        let reversed: Vec<Depot> = depots.into_iter().rev().collect();
        let assignment = assign(&bins, &reversed).unwrap();
        assert_eq!(assignment.depot_of("mid").unwrap().name, "B");
    }

    #[test]
    fn test_skips_non_finite_records() {
        let bins = vec![
            bin("ok", 1.0, 1.0, 90.0),
            bin("nan", f64::NAN, 1.0, 90.0),
            bin("inf-fill", 1.0, 1.0, f64::INFINITY),
        ];
        let depots = depots();
        let assignment = assign(&bins, &depots).unwrap();

        assert_eq!(assignment.assigned.len(), 1);
        assert_eq!(assignment.skipped_count(), 2);
        assert_eq!(
            assignment.skipped[0],
            DataError::NonFiniteCoordinates { bin_id: "nan".to_string() }
        );
        assert_eq!(
            assignment.skipped[1],
            DataError::NonFiniteFill { bin_id: "inf-fill".to_string() }
        );
    }

    #[test]
    fn test_out_of_range_fill_is_kept() {
        let bins = vec![bin("over", 1.0, 1.0, 120.0), bin("under", 1.0, 1.0, -5.0)];
        let depots = depots();
        let assignment = assign(&bins, &depots).unwrap();
        assert_eq!(assignment.assigned.len(), 2);
        assert!(assignment.skipped.is_empty());
    }

    #[test]
    fn test_bins_for_keeps_input_order() {
        let bins = vec![
            bin("x", 0.1, 0.1, 10.0),
            bin("y", 9.9, 9.9, 10.0),
            bin("z", 0.2, 0.2, 10.0),
        ];
        let depots = depots();
        let assignment = assign(&bins, &depots).unwrap();
        let ids: Vec<&str> = assignment.bins_for("A").iter().map(|b| b.bin_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "z"]);
    }

    #[test]
    fn test_nearest_depot_empty() {
        assert!(nearest_depot(Point::new(0.0, 0.0), &[]).is_none());
    }
}
