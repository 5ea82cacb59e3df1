/// Command-line surface
pub mod cli;
/// Named defaults, thresholds and caps
pub mod configuration;
/// Failure dumps for reproducing failed attempts
pub mod dump;
/// Error taxonomy and result alias
pub mod error;
/// Level file persistence
pub mod level_file;
/// Log sink cooperating with the progress display
pub mod logger;
/// Progress bars for batch generation
pub mod progress;
/// ASCII rendering of vine layouts
pub mod render;
