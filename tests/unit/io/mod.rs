pub mod cli;
pub mod configuration;
pub mod dump;
pub mod level_file;
