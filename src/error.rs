//! Error taxonomy for the dispatch core.
//!
//! - [`ConfigurationError`] aborts a recomputation.
//! - [`DataError`] describes one bad record; callers skip it and keep going.
//! - [`RoutingUnavailable`] is recovered per segment by the stitcher and
//!   never leaves it.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("at least one depot is required")]
    NoDepots,

    #[error("depot {0:?} is listed more than once")]
    DuplicateDepot(String),

    #[error("depot {0:?} has non-finite coordinates")]
    NonFiniteDepot(String),

    #[error("terminal point has non-finite coordinates")]
    NonFiniteTerminal,

    #[error("unknown depot {0:?}")]
    UnknownDepot(String),

    #[error("failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("bin {bin_id:?} has non-finite coordinates")]
    NonFiniteCoordinates { bin_id: String },

    #[error("bin {bin_id:?} has a non-finite fill percentage")]
    NonFiniteFill { bin_id: String },
}

impl DataError {
    pub fn bin_id(&self) -> &str {
        match self {
            DataError::NonFiniteCoordinates { bin_id } | DataError::NonFiniteFill { bin_id } => {
                bin_id
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RoutingUnavailable {
    #[error("no road network node near ({lat}, {lon})")]
    NoNearbyNode { lat: f64, lon: f64 },

    #[error("node {0} is not part of the road network")]
    UnknownNode(u64),

    #[error("no path from node {from} to node {to}")]
    NoPath { from: u64, to: u64 },

    #[error("routing request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unusable routing response: {0}")]
    Response(String),
}

/// Fatal errors of one recomputation cycle.
///
/// Bad records are not fatal: they come back as [`DataError`]s alongside the
/// plan.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
