//! Failure dumps capturing the grid state of a failed placement
//!
//! A dump records the attempt seed together with the effective parameters the
//! attempt ran with, so replaying it reruns exactly the same random stream.

use crate::io::error::{Result, WithPath};
use crate::io::render::{render_legend, render_vines};
use crate::model::difficulty::Difficulty;
use crate::model::generation::GenerationConfig;
use crate::model::vine::Vine;
use crate::spatial::OccupancyGrid;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Owner of one occupied cell
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedCell {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
    /// Owning vine id
    pub vine: String,
}

/// What triggered a dump
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpKind {
    /// A repair path was exhausted
    #[default]
    Failure,
    /// A vine had no placement and local backtracking started
    Backtrack,
}

/// Generation parameters in effect for the dumped attempt
///
/// Relaxations are already applied, so these can differ from the values the
/// level was configured with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayParameters {
    /// Target number of vines
    pub vine_count: usize,
    /// Upper move bound
    pub max_moves: usize,
    /// Required coverage fraction
    pub min_coverage: f64,
    /// Vines removed per sliding-window backtrack
    pub backtrack_window: usize,
    /// Sliding-window backtracks per failed vine
    pub max_backtrack_attempts: usize,
    /// State cap of the exhaustive search
    pub max_states: usize,
    /// Whether the tier depth limit was enforced
    pub strict_depth: bool,
}

impl ReplayParameters {
    fn of(config: &GenerationConfig) -> Self {
        Self {
            vine_count: config.vine_count,
            max_moves: config.max_moves,
            min_coverage: config.min_coverage,
            backtrack_window: config.backtrack_window,
            max_backtrack_attempts: config.max_backtrack_attempts,
            max_states: config.max_states,
            strict_depth: config.strict_depth,
        }
    }

    fn apply(&self, config: &mut GenerationConfig) {
        config.vine_count = self.vine_count;
        config.max_moves = self.max_moves;
        config.min_coverage = self.min_coverage;
        config.backtrack_window = self.backtrack_window;
        config.max_backtrack_attempts = self.max_backtrack_attempts;
        config.max_states = self.max_states;
        config.strict_depth = self.strict_depth;
    }
}

/// Snapshot of a failed placement, sufficient to replay the attempt
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailureDump {
    /// Level being generated
    pub level_id: u32,
    /// Grid dimensions as `[width, height]`
    pub grid: [usize; 2],
    /// Seed of the failing attempt
    pub seed: u64,
    /// Zero-based attempt number
    pub attempt: usize,
    /// Description of the failure
    pub message: String,
    /// Fraction of cells covered when the failure happened
    pub coverage: f64,
    /// Vines in placement order
    pub vines: Vec<Vine>,
    /// Occupied cells sorted by row then column
    pub occupied: Vec<OccupiedCell>,
    /// Difficulty tier of the level
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Strategy that ran the attempt
    #[serde(default)]
    pub strategy: String,
    /// Failure or backtrack dump
    #[serde(default)]
    pub kind: DumpKind,
    /// Vine being placed when a backtrack dump was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vine: Option<String>,
    /// Effective parameters of the attempt; tier defaults apply when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ReplayParameters>,
}

impl FailureDump {
    /// Capture the state of a failing attempt
    ///
    /// `config` is the attempt's effective configuration, with `strategy`
    /// naming the strategy that actually ran.
    pub fn capture(
        config: &GenerationConfig,
        attempt: usize,
        seed: u64,
        message: impl Into<String>,
        vines: &[Vine],
        grid: &OccupancyGrid,
    ) -> Self {
        let mut occupied: Vec<OccupiedCell> = grid
            .occupied_cells()
            .into_iter()
            .map(|(point, vine)| OccupiedCell {
                x: point.x,
                y: point.y,
                vine: vine.to_string(),
            })
            .collect();
        occupied.sort_by_key(|cell| (cell.y, cell.x));

        Self {
            level_id: config.level_id,
            grid: [grid.width(), grid.height()],
            seed,
            attempt,
            message: message.into(),
            coverage: grid.coverage(),
            vines: vines.to_vec(),
            occupied,
            difficulty: config.difficulty,
            strategy: config.strategy.clone(),
            kind: DumpKind::Failure,
            vine: None,
            parameters: Some(ReplayParameters::of(config)),
        }
    }

    /// Mark the dump as taken when local backtracking started for `vine_id`
    #[must_use]
    pub fn backtrack(mut self, vine_id: &str) -> Self {
        self.kind = DumpKind::Backtrack;
        self.vine = Some(vine_id.to_string());
        self
    }

    /// File name shared by the JSON and text renderings, without extension
    pub fn base_name(&self) -> String {
        match (self.kind, &self.vine) {
            (DumpKind::Backtrack, Some(vine)) => format!(
                "backtrack_level_{}_seed_{}_attempt_{}_{vine}",
                self.level_id, self.seed, self.attempt
            ),
            (DumpKind::Backtrack, None) => format!(
                "backtrack_level_{}_seed_{}_attempt_{}",
                self.level_id, self.seed, self.attempt
            ),
            (DumpKind::Failure, _) => format!(
                "failure_level_{}_seed_{}_attempt_{}",
                self.level_id, self.seed, self.attempt
            ),
        }
    }

    /// Write `<base>.json` and `<base>.txt` into `directory`
    ///
    /// # Errors
    ///
    /// Returns `Persistence` or `Serialization` naming the file that failed
    pub fn write(&self, directory: &Path) -> Result<PathBuf> {
        fs::create_dir_all(directory).with_path(directory, "create dump directory")?;

        let json_path = directory.join(format!("{}.json", self.base_name()));
        let json = serde_json::to_string_pretty(self).with_path(&json_path, "encode dump")?;
        fs::write(&json_path, json).with_path(&json_path, "write dump")?;

        let text_path = directory.join(format!("{}.txt", self.base_name()));
        fs::write(&text_path, self.render()).with_path(&text_path, "write dump")?;

        log::info!("Failure dump written to {}", json_path.display());
        Ok(json_path)
    }

    /// Human-readable rendering of the dump
    pub fn render(&self) -> String {
        let [width, height] = self.grid;
        format!(
            "level {} seed {} attempt {}\n{}\ncoverage {:.1}%\n\n{}\n{}",
            self.level_id,
            self.seed,
            self.attempt,
            self.message,
            self.coverage * 100.0,
            render_vines(width, height, &self.vines),
            render_legend(&self.vines)
        )
    }

    /// Configuration reproducing the failing attempt
    ///
    /// The attempt seed becomes the base seed of a single-attempt run with the
    /// recorded strategy and effective parameters. Dumps without parameters
    /// fall back to the tier defaults for the grid.
    pub fn replay_config(&self) -> GenerationConfig {
        let [width, height] = self.grid;
        let mut config =
            GenerationConfig::with_difficulty(self.level_id, self.difficulty).with_grid(width, height);
        config.seed = Some(self.seed);
        config.max_attempts = 1;
        if !self.strategy.is_empty() {
            config.strategy.clone_from(&self.strategy);
        }
        if let Some(parameters) = &self.parameters {
            parameters.apply(&mut config);
        }
        config
    }
}

/// Read a dump written by [`FailureDump::write`]
///
/// # Errors
///
/// Returns `Persistence` if the file cannot be read or `Serialization` if it
/// is not a dump
pub fn load_failure_dump(path: &Path) -> Result<FailureDump> {
    let contents = fs::read_to_string(path).with_path(path, "read dump")?;
    serde_json::from_str(&contents).with_path(path, "decode dump")
}

/// Dump files in `directory`, sorted by name
///
/// # Errors
///
/// Returns `Persistence` if the directory cannot be listed
pub fn collect_dump_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory).with_path(directory, "list dumps")? {
        let path = entry.with_path(directory, "list dumps")?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
