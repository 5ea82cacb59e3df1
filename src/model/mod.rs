//! Core records shared by every stage of generation
//!
//! This module contains:
//! - Grid coordinates and directions
//! - Vines and persisted levels
//! - Difficulty tables and generation parameters

/// Difficulty tiers and their static constraint tables
pub mod difficulty;
/// Generation configuration and statistics
pub mod generation;
/// Persisted level and mask records
pub mod level;
/// Grid coordinates and cardinal directions
pub mod point;
/// Vine records and structural validation
pub mod vine;

pub use difficulty::{Difficulty, DifficultySpec};
pub use generation::{GenerationConfig, GenerationStats};
pub use level::{Level, Mask, MaskMode};
pub use point::{Direction, Point};
pub use vine::Vine;
