//! Test fixtures for bin-dispatch.
//!
//! Provides realistic test data including:
//! - Real Mumbai garage, disposal and street locations
//! - A small road graph around the Worli / Bandra corridor

pub mod mumbai_locations;

pub use mumbai_locations::*;
