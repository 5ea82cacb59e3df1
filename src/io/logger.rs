//! `log` sink that writes to stderr without tearing progress bars

use indicatif::MultiProgress;
use log::{LevelFilter, Log, Metadata, Record};

/// Logger printing `LEVEL message` lines to stderr
///
/// When progress bars are active the lines are printed while the bars are
/// suspended, so they scroll above the bars.
pub struct ProgressLogger {
    level: LevelFilter,
    multi_progress: Option<MultiProgress>,
}

impl ProgressLogger {
    /// Logger for records up to `level`
    pub const fn new(level: LevelFilter, multi_progress: Option<MultiProgress>) -> Self {
        Self {
            level,
            multi_progress,
        }
    }

    /// Install as the global logger
    ///
    /// Does nothing if a logger is already installed.
    pub fn install(level: LevelFilter, multi_progress: Option<MultiProgress>) {
        if log::set_boxed_logger(Box::new(Self::new(level, multi_progress))).is_ok() {
            log::set_max_level(level);
        }
    }

    /// Filter matching the command-line verbosity flags
    pub const fn level_for(quiet: bool, verbose: u8) -> LevelFilter {
        if quiet {
            return LevelFilter::Warn;
        }
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Line written for a record
    pub fn format(record: &Record<'_>) -> String {
        format!("{:<5} {}", record.level(), record.args())
    }
}

impl Log for ProgressLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    // Allow print for log output routed around the progress display
    #[allow(clippy::print_stderr)]
    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format(record);
        match &self.multi_progress {
            Some(multi_progress) => multi_progress.suspend(|| eprintln!("{line}")),
            None => eprintln!("{line}"),
        }
    }

    fn flush(&self) {}
}
