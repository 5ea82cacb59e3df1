//! Spatial data structures
//!
//! This module contains the occupancy map every placement, repair and
//! analysis stage reads and mutates.

/// Point-keyed occupancy map with corridor and reachability queries
pub mod grid;

pub use grid::OccupancyGrid;
