//! bin-dispatch core
//!
//! Assigns waste bins to the nearest truck depot, sequences the full bins of a
//! depot into a greedy nearest-neighbour tour and stitches that tour onto a
//! road network.

pub mod geometry;
pub mod error;
pub mod model;
pub mod config;
pub mod assignment;
pub mod tour;
pub mod network;
pub mod graph;
pub mod osrm;
pub mod stitch;
pub mod navigation;
pub mod dispatch;

pub use geometry::Point;
pub use model::{BinRecord, Depot};
