//! Per-level attempt bars with a batch bar for long runs

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

/// Coordinates progress display for batch generation
///
/// Shows one attempt bar for each of the most recent levels, plus a batch
/// bar once the batch is too long to show every level
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    level_bars: Vec<ProgressBar>,
    /// Stores (`label`, `attempt`, `max_attempts`) for rolling window display
    level_states: Vec<(String, usize, usize)>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static ATTEMPT_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{prefix:>12} [{bar:30.green/white}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Levels: [{bar:40.green/white}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            level_bars: Vec::new(),
            level_states: Vec::new(),
        }
    }

    /// Handle shared with the logger so log lines print above the bars
    pub fn multi_progress(&self) -> MultiProgress {
        self.multi_progress.clone()
    }

    /// Create the bars for a batch of `level_count` levels
    pub fn initialize(&mut self, level_count: usize) {
        if level_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch_bar = ProgressBar::new(level_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for _ in 0..level_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let bar = ProgressBar::new(0);
            bar.set_style(ATTEMPT_STYLE.clone());
            self.level_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Begin tracking a level
    pub fn start_level(&mut self, index: usize, level_id: u32, max_attempts: usize) {
        if index >= self.level_states.len() {
            self.level_states.resize(index + 1, (String::new(), 0, 0));
        }
        if let Some(state) = self.level_states.get_mut(index) {
            *state = (format!("level {level_id}"), 0, max_attempts);
        }
        self.update_bars();
    }

    /// Report the attempt a level is on
    pub fn update_attempt(&mut self, index: usize, attempt: usize) {
        if let Some(state) = self.level_states.get_mut(index) {
            state.1 = attempt;
        }
        self.update_bars();
    }

    /// Mark a level as finished
    pub fn complete_level(&mut self, index: usize, accepted: bool) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }

        if let Some(state) = self.level_states.get_mut(index) {
            let mark = if accepted { '✓' } else { '✗' };
            state.0 = format!("{mark} {}", state.0);
            if accepted {
                state.2 = state.1;
            }
        }
        self.update_bars();
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All levels processed");
        }
        let _ = self.multi_progress.clear();
    }

    /// Labels currently shown, oldest first
    pub fn visible_labels(&self) -> Vec<String> {
        self.visible_states()
            .iter()
            .map(|(label, _, _)| label.clone())
            .collect()
    }

    fn visible_states(&self) -> Vec<(String, usize, usize)> {
        let active: Vec<(String, usize, usize)> = self
            .level_states
            .iter()
            .filter(|(label, _, _)| !label.is_empty())
            .cloned()
            .collect();
        let start = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        active.get(start..).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// Update all progress bars to show the last N active levels
    fn update_bars(&self) {
        let visible = self.visible_states();

        for (bar_index, (label, attempt, max)) in visible.iter().enumerate() {
            if let Some(bar) = self.level_bars.get(bar_index) {
                bar.set_length(*max as u64);
                bar.set_position(*attempt as u64);
                let width = max.to_string().len();
                bar.set_message(format!("attempt {attempt:>width$}/{max}"));
                bar.set_prefix(label.clone());
            }
        }

        for bar_index in visible.len()..self.level_bars.len() {
            if let Some(bar) = self.level_bars.get(bar_index) {
                bar.set_length(0);
                bar.set_position(0);
                bar.set_message(String::new());
                bar.set_prefix(String::new());
            }
        }
    }
}
