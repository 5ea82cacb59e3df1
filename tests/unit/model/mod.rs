pub mod generation;
pub mod level;
