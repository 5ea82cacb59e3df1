//! Command-line interface for generating, validating and inspecting levels

use crate::algorithm::orchestrator::{GeneratedLevel, LevelGenerator};
use crate::algorithm::solvability::is_level_solvable;
use crate::io::configuration::{DEFAULT_DUMP_DIR, DEFAULT_MAX_STATES, DEFAULT_OUTPUT_DIR};
use crate::io::error::{GenerationError, Result};
use crate::io::level_file::{collect_level_files, level_path, read_level, write_level};
use crate::io::logger::ProgressLogger;
use crate::io::progress::ProgressManager;
use crate::io::render::{render_legend, render_level};
use crate::model::difficulty::Difficulty;
use crate::model::generation::GenerationConfig;
use crate::placement::{STRATEGY_CENTER_OUT, StrategyRegistry};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "vinegen")]
#[command(
    author,
    version,
    about = "Generate and validate solvable vine-clearing puzzle levels"
)]
/// Command-line arguments for the level generator
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Only report warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log detail (repeat for trace output)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate one or more levels
    Generate(GenerateArgs),
    /// Check level files for structural validity and solvability
    Validate {
        /// Level files or directories of level files
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// State cap of the exhaustive search
        #[arg(long, default_value_t = DEFAULT_MAX_STATES)]
        max_states: usize,
    },
    /// Print a level as an ASCII grid
    Render {
        /// Level file
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// List the registered placement strategies
    Strategies,
}

/// Arguments of the `generate` subcommand
#[derive(Args, Debug, Clone)]
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateArgs {
    /// Level id or inclusive range such as `3..8`
    #[arg(short, long, value_parser = parse_level_range)]
    pub levels: RangeInclusive<u32>,

    /// Directory receiving level files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub out: PathBuf,

    /// Grid width (tier default when absent)
    #[arg(short = 'W', long)]
    pub width: Option<usize>,

    /// Grid height (tier default when absent)
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Difficulty tier (derived from the level id when absent)
    #[arg(short, long)]
    pub difficulty: Option<Difficulty>,

    /// Base seed (derived from the level id when absent)
    #[arg(short, long, conflicts_with = "randomize")]
    pub seed: Option<u64>,

    /// Draw the base seed from entropy
    #[arg(long)]
    pub randomize: bool,

    /// Primary placement strategy
    #[arg(long, default_value = STRATEGY_CENTER_OUT)]
    pub strategy: String,

    /// Fraction of cells that must be covered
    #[arg(long)]
    pub min_coverage: Option<f64>,

    /// Target number of vines
    #[arg(long)]
    pub vine_count: Option<usize>,

    /// Upper move bound written to each level
    #[arg(long)]
    pub max_moves: Option<usize>,

    /// Vines removed per sliding-window backtrack
    #[arg(long)]
    pub backtrack_window: Option<usize>,

    /// Sliding-window backtracks per failed vine
    #[arg(long)]
    pub max_backtrack_attempts: Option<usize>,

    /// Use the wide backtracking preset
    #[arg(long)]
    pub aggressive: bool,

    /// Directory receiving failure dumps
    #[arg(long, default_value = DEFAULT_DUMP_DIR)]
    pub dump_dir: PathBuf,

    /// Do not write failure dumps
    #[arg(long)]
    pub no_dumps: bool,

    /// State cap of the exhaustive solvability search
    #[arg(long)]
    pub max_states: Option<usize>,

    /// Attempts per level before giving up
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// Reject layouts whose blocking depth exceeds the tier limit
    #[arg(long)]
    pub strict_depth: bool,

    /// Replace existing level files
    #[arg(long)]
    pub overwrite: bool,
}

impl GenerateArgs {
    /// Generation parameters for one level of the batch
    ///
    /// # Errors
    ///
    /// Returns `UnknownStrategy` if the strategy is not registered
    pub fn config_for(&self, level_id: u32, registry: &StrategyRegistry) -> Result<GenerationConfig> {
        let mut config = match self.difficulty {
            Some(difficulty) => GenerationConfig::with_difficulty(level_id, difficulty),
            None => GenerationConfig::for_level(level_id),
        }
        .with_strategy(&self.strategy, registry)?;

        if let Some(min_coverage) = self.min_coverage {
            config.min_coverage = min_coverage;
        }
        let width = self.width.unwrap_or(config.grid_width);
        let height = self.height.unwrap_or(config.grid_height);
        config = config.with_grid(width, height);

        if let Some(vine_count) = self.vine_count {
            config.vine_count = vine_count;
            config.max_moves = vine_count * 2;
        }
        if let Some(max_moves) = self.max_moves {
            config.max_moves = max_moves;
        }
        if self.aggressive {
            config = config.with_aggressive_backtracking();
        }
        if let Some(window) = self.backtrack_window {
            config.backtrack_window = window;
        }
        if let Some(attempts) = self.max_backtrack_attempts {
            config.max_backtrack_attempts = attempts;
        }
        if let Some(max_states) = self.max_states {
            config.max_states = max_states;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }

        config.seed = self.seed;
        config.randomize = self.randomize;
        config.dump_dir = (!self.no_dumps).then(|| self.dump_dir.clone());
        config.strict_depth = self.strict_depth;
        config.overwrite = self.overwrite;
        Ok(config)
    }
}

/// Parse `N`, `A..B`, `A..=B` or `A-B` into an inclusive range
///
/// # Errors
///
/// Returns a message when the bounds are not numbers or are reversed
pub fn parse_level_range(input: &str) -> std::result::Result<RangeInclusive<u32>, String> {
    let parse = |text: &str| {
        text.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid level id '{text}': {e}"))
    };

    let bounds = input
        .split_once("..=")
        .or_else(|| input.split_once(".."))
        .or_else(|| input.split_once('-'));
    let (start, end) = match bounds {
        Some((start, end)) => (parse(start)?, parse(end)?),
        None => {
            let single = parse(input)?;
            (single, single)
        }
    };

    if start == 0 || end < start {
        return Err(format!("invalid level range '{input}'"));
    }
    Ok(start..=end)
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Execute the selected subcommand
    ///
    /// # Errors
    ///
    /// Returns the first generation or persistence error, or
    /// `ValidationFailed` when any validated level fails
    pub fn run(self, registry: &StrategyRegistry) -> Result<()> {
        let level = ProgressLogger::level_for(self.quiet, self.verbose);
        match self.command {
            Command::Generate(args) => {
                let mut batch = BatchGenerator::new(args, registry, !self.quiet);
                ProgressLogger::install(level, batch.multi_progress());
                batch.process()
            }
            Command::Validate { paths, max_states } => {
                ProgressLogger::install(level, None);
                validate_levels(&paths, max_states)
            }
            Command::Render { path } => {
                ProgressLogger::install(level, None);
                print_level(&path)
            }
            Command::Strategies => {
                print_strategies(registry);
                Ok(())
            }
        }
    }
}

/// Generates a range of levels with progress tracking
pub struct BatchGenerator<'a> {
    args: GenerateArgs,
    registry: &'a StrategyRegistry,
    progress_manager: Option<ProgressManager>,
}

impl<'a> BatchGenerator<'a> {
    /// Create a batch generator
    pub fn new(args: GenerateArgs, registry: &'a StrategyRegistry, show_progress: bool) -> Self {
        Self {
            args,
            registry,
            progress_manager: show_progress.then(ProgressManager::new),
        }
    }

    /// Progress handle for the logger, when progress is shown
    pub fn multi_progress(&self) -> Option<indicatif::MultiProgress> {
        self.progress_manager
            .as_ref()
            .map(ProgressManager::multi_progress)
    }

    /// Generate and write every level of the batch
    ///
    /// Levels whose file already exists are skipped unless overwriting.
    ///
    /// # Errors
    ///
    /// Returns the first level's generation or persistence error
    pub fn process(&mut self) -> Result<()> {
        let levels = self.collect_levels();
        if levels.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(levels.len());
        }

        for (index, &level_id) in levels.iter().enumerate() {
            self.process_level(level_id, index)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    /// Level ids that still need generating
    pub fn collect_levels(&self) -> Vec<u32> {
        self.args
            .levels
            .clone()
            .filter(|&level_id| {
                let path = level_path(&self.args.out, level_id);
                if self.args.overwrite || !path.exists() {
                    return true;
                }
                log::warn!("Skipping level {level_id}: {} exists", path.display());
                false
            })
            .collect()
    }

    fn process_level(&mut self, level_id: u32, index: usize) -> Result<GeneratedLevel> {
        let config = self.args.config_for(level_id, self.registry)?;
        let mut generator = LevelGenerator::new(config, self.registry)?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_level(index, level_id, generator.max_attempts());
        }

        let outcome = loop {
            match generator.step() {
                Ok(Some(generated)) => break Ok(generated),
                Ok(None) => {
                    if let Some(ref mut pm) = self.progress_manager {
                        pm.update_attempt(index, generator.attempts());
                    }
                }
                Err(e) => break Err(e),
            }
        };

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_level(index, outcome.is_ok());
        }

        let generated = outcome?;
        let path = write_level(&self.args.out, &generated.level, self.args.overwrite)?;
        log::info!("Wrote {}", path.display());
        Ok(generated)
    }
}

/// Validate level files, printing one verdict per file
///
/// # Errors
///
/// Returns `ValidationFailed` if any level is malformed or not provably
/// solvable, or `Persistence` if the paths cannot be listed
// Allow print for validation verdicts
#[allow(clippy::print_stdout)]
pub fn validate_levels(paths: &[PathBuf], max_states: usize) -> Result<()> {
    let files = collect_level_files(paths)?;
    let mut failed = 0;

    for file in &files {
        match validate_level_file(file, max_states) {
            Ok(moves) => println!("ok    {} ({moves} moves)", file.display()),
            Err(e) => {
                failed += 1;
                println!("FAIL  {}: {e}", file.display());
            }
        }
    }

    if failed > 0 {
        return Err(GenerationError::ValidationFailed {
            failed,
            total: files.len(),
        });
    }
    Ok(())
}

/// Load one level, check its structure and design rules and prove it solvable
///
/// Returns the length of the clearing order found.
///
/// # Errors
///
/// Returns the structural, design, persistence or solvability error for the
/// level
pub fn validate_level_file(path: &Path, max_states: usize) -> Result<usize> {
    let level = read_level(path)?;
    level.validate_structure()?;
    level.validate_design()?;
    let order = is_level_solvable(&level, max_states)?.into_order()?;
    Ok(order.len())
}

// Allow print for the rendered grid
#[allow(clippy::print_stdout)]
fn print_level(path: &Path) -> Result<()> {
    let level = read_level(path)?;
    println!(
        "{} ({}, {}x{}, {} vines)",
        level.name,
        level.difficulty,
        level.width(),
        level.height(),
        level.vines.len()
    );
    print!("{}", render_level(&level));
    print!("{}", render_legend(&level.vines));
    Ok(())
}

// Allow print for the strategy listing
#[allow(clippy::print_stdout)]
fn print_strategies(registry: &StrategyRegistry) {
    for (name, description) in registry.list() {
        println!("{name:<16} {description}");
    }
}
