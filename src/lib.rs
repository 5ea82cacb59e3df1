//! Procedural level generator for a vine-clearing puzzle
//!
//! Vines are orthogonal paths on a grid that slide off the board in their head
//! direction. The generator lays vines out so that every level has a clearing
//! order, proves that order with a bounded exhaustive search and writes the
//! accepted level as JSON.

#![forbid(unsafe_code)]

/// Repair, filling, solvability, assembly and the attempt loop
pub mod algorithm;
/// Blocking relation metrics
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Points, vines, levels, difficulty tables and generation parameters
pub mod model;
/// Placement strategies and their registry
pub mod placement;
/// Grid occupancy and corridor queries
pub mod spatial;

pub use algorithm::orchestrator::{GeneratedLevel, LevelGenerator, generate_level};
pub use io::error::{GenerationError, Result};
