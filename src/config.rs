//! Static dispatch configuration.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::geometry::Point;
use crate::model::Depot;
use crate::network::Region;

/// Depot set, terminal point and routing knobs for one deployment.
///
/// Depot order matters: it is the tie-break when a bin is equidistant from
/// several depots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub depots: Vec<Depot>,
    /// Disposal site every tour ends at.
    pub terminal: Point,
    /// Minimum fill percentage (inclusive) for a bin to need a pickup.
    pub fill_threshold: f64,
    /// Maximum number of stops per tour. `None` visits every full bin.
    pub capacity: Option<usize>,
    /// Area the road network is built for.
    pub region: Region,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            depots: vec![
                Depot::new("Truck 1 (Worli)", 19.0178, 72.8478),
                Depot::new("Truck 2 (Bandra)", 19.0596, 72.8295),
                Depot::new("Truck 3 (Andheri)", 19.1136, 72.8697),
                Depot::new("Truck 4 (Kurla)", 19.0726, 72.8844),
                Depot::new("Truck 5 (Borivali)", 19.2307, 72.8567),
            ],
            terminal: Point::new(19.0550, 72.9250),
            fill_threshold: 75.0,
            capacity: Some(8),
            region: Region::default(),
        }
    }
}

impl DispatchConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.depots.is_empty() {
            return Err(ConfigurationError::NoDepots);
        }

        let mut seen = HashSet::new();
        for depot in &self.depots {
            if !seen.insert(depot.name.as_str()) {
                return Err(ConfigurationError::DuplicateDepot(depot.name.clone()));
            }
            if !depot.location.is_finite() {
                return Err(ConfigurationError::NonFiniteDepot(depot.name.clone()));
            }
        }

        if !self.terminal.is_finite() {
            return Err(ConfigurationError::NonFiniteTerminal);
        }

        Ok(())
    }

    pub fn depot(&self, name: &str) -> Result<&Depot, ConfigurationError> {
        self.depots
            .iter()
            .find(|depot| depot.name == name)
            .ok_or_else(|| ConfigurationError::UnknownDepot(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DispatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.depots.len(), 5);
        assert_eq!(config.capacity, Some(8));
        assert_eq!(config.fill_threshold, 75.0);
    }

    #[test]
    fn test_empty_depots_rejected() {
        let config = DispatchConfig {
            depots: Vec::new(),
            ..DispatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigurationError::NoDepots)));
    }

    #[test]
    fn test_duplicate_depot_rejected() {
        let config = DispatchConfig {
            depots: vec![Depot::new("A", 0.0, 0.0), Depot::new("A", 1.0, 1.0)],
            ..DispatchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::DuplicateDepot(name)) if name == "A"
        ));
    }

    #[test]
    fn test_non_finite_terminal_rejected() {
        let config = DispatchConfig {
            terminal: Point::new(f64::NAN, 0.0),
            ..DispatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigurationError::NonFiniteTerminal)));
    }

    #[test]
    fn test_from_json_keeps_depot_order() {
        let json = r#"{
            "depots": [
                {"name": "B", "location": {"lat": 10.0, "lon": 10.0}},
                {"name": "A", "location": {"lat": 0.0, "lon": 0.0}}
            ],
            "terminal": {"lat": 5.0, "lon": 5.0},
            "fill_threshold": 60.0,
            "capacity": null
        }"#;
        let config = DispatchConfig::from_json_str(json).unwrap();
        let names: Vec<&str> = config.depots.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(config.capacity, None);
        assert_eq!(config.region, Region::default());
    }

    #[test]
    fn test_from_json_rejects_empty_depots() {
        let json = r#"{"depots": []}"#;
        assert!(matches!(
            DispatchConfig::from_json_str(json),
            Err(ConfigurationError::NoDepots)
        ));
    }

    #[test]
    fn test_unknown_depot() {
        let config = DispatchConfig::default();
        assert!(config.depot("Truck 2 (Bandra)").is_ok());
        assert!(matches!(
            config.depot("Truck 9"),
            Err(ConfigurationError::UnknownDepot(_))
        ));
    }
}
