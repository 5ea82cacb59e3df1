//! Structural analysis of placed vine sets

/// Blocking relation, dependency depth and cycle detection
pub mod blocking;
