//! Local repair of stuck placements and blocking cycles

use crate::algorithm::solvability::{ClearanceModel, is_likely_solvable_partial};
use crate::analysis::blocking::BlockingGraph;
use crate::io::configuration::{
    COMBINATION_FAN_OUT_WEIGHT, MAX_CYCLE_BREAKER_COMBINATIONS, PARTIAL_CHECK_MAX_STEPS,
    REPAIR_MAX_STATES,
};
use crate::io::dump::FailureDump;
use crate::io::error::{GenerationError, Result, placement_failure};
use crate::model::generation::{GenerationConfig, GenerationStats};
use crate::model::vine::Vine;
use crate::placement::Placement;
use crate::spatial::OccupancyGrid;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Retry of a single vine placement against a modified grid
pub type PlaceFn<'a> =
    dyn FnMut(&OccupancyGrid, &mut StdRng, &mut GenerationStats) -> Option<Vine> + 'a;

/// Removal set proposed by the cycle breaker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovalCombination {
    /// Vines to remove, sorted by id
    pub ids: Vec<String>,
    /// `fan_out * 10 + combined_length`
    pub score: usize,
}

/// Repairs placements that got stuck or formed blocking cycles
///
/// Holds the attempt identity so every exhausted repair path can write a
/// failure dump that replays the attempt.
#[derive(Clone, Copy, Debug)]
pub struct BacktrackEngine<'a> {
    config: &'a GenerationConfig,
    attempt: usize,
    seed: u64,
}

impl<'a> BacktrackEngine<'a> {
    /// Engine for one attempt
    pub const fn new(config: &'a GenerationConfig, attempt: usize, seed: u64) -> Self {
        Self {
            config,
            attempt,
            seed,
        }
    }

    /// Make room for a vine that could not be placed
    ///
    /// The contended state is written as a backtrack dump first. Then the
    /// best-ranked blockers are removed one at a time on a scratch copy,
    /// retrying after each removal. When that fails, the most recent
    /// `backtrack_window` vines are dropped for good and the placement retried,
    /// up to `max_backtrack_attempts` times. Last, the shortest member of each
    /// blocking cycle is removed in turn. On success the new vine has been
    /// appended to `layout`.
    ///
    /// # Errors
    ///
    /// Returns `Placement` once every repair path is exhausted, after writing
    /// a failure dump when a dump directory is configured
    pub fn recover_placement(
        &self,
        layout: &mut Placement,
        failing_id: &str,
        direct_blockers: &BTreeSet<String>,
        rng: &mut StdRng,
        stats: &mut GenerationStats,
        place: &mut PlaceFn<'_>,
    ) -> Result<Vine> {
        self.dump_backtrack(failing_id, layout, stats);

        if let Some(vine) = self.remove_ranked_blockers(layout, direct_blockers, rng, stats, place)? {
            log::debug!("Placed {failing_id} after removing ranked blockers");
            return Ok(vine);
        }
        if let Some(vine) = self.slide_window(layout, rng, stats, place)? {
            log::debug!("Placed {failing_id} after sliding-window backtrack");
            return Ok(vine);
        }
        if let Some(vine) = self.remove_cycle_members(layout, rng, stats, place)? {
            log::debug!("Placed {failing_id} after breaking a blocking cycle");
            return Ok(vine);
        }

        let reason = format!(
            "no placement after {} backtracks (window {}, cap {})",
            stats.backtracks_attempted, self.config.backtrack_window, self.config.max_backtrack_attempts
        );
        self.dump_failure(&format!("{failing_id}: {reason}"), layout, stats);
        Err(placement_failure(failing_id, &reason))
    }

    fn remove_ranked_blockers(
        &self,
        layout: &mut Placement,
        direct_blockers: &BTreeSet<String>,
        rng: &mut StdRng,
        stats: &mut GenerationStats,
        place: &mut PlaceFn<'_>,
    ) -> Result<Option<Vine>> {
        let graph = BlockingGraph::build(&layout.vines, &layout.grid);
        let candidates: Vec<String> = graph
            .rank_backtrack_candidates(direct_blockers, self.config.backtrack_window)
            .into_iter()
            .filter(|id| direct_blockers.contains(id) || graph.out_degree(id) > 0)
            .collect();
        if candidates.is_empty() {
            return Ok(None);
        }

        let mut scratch = layout.clone();
        for id in &candidates {
            scratch.remove(id);
            stats.backtracks_attempted += 1;
            if let Some(vine) = place(&scratch.grid, rng, stats) {
                scratch.push(vine.clone())?;
                *layout = scratch;
                return Ok(Some(vine));
            }
        }
        Ok(None)
    }

    fn slide_window(
        &self,
        layout: &mut Placement,
        rng: &mut StdRng,
        stats: &mut GenerationStats,
        place: &mut PlaceFn<'_>,
    ) -> Result<Option<Vine>> {
        for round in 0..self.config.max_backtrack_attempts {
            if layout.vines.is_empty() {
                break;
            }
            let removed = layout.pop_recent(self.config.backtrack_window);
            stats.backtracks_attempted += 1;
            log::trace!("Backtrack round {round} dropped {} vines", removed.len());

            if let Some(vine) = place(&layout.grid, rng, stats) {
                layout.push(vine.clone())?;
                return Ok(Some(vine));
            }
        }
        Ok(None)
    }

    fn remove_cycle_members(
        &self,
        layout: &mut Placement,
        rng: &mut StdRng,
        stats: &mut GenerationStats,
        place: &mut PlaceFn<'_>,
    ) -> Result<Option<Vine>> {
        let chains = BlockingGraph::build(&layout.vines, &layout.grid).cycles();
        for chain in &chains {
            let Some(shortest) = shortest_member(layout, chain) else {
                continue;
            };
            let mut scratch = layout.clone();
            scratch.remove(&shortest);
            stats.backtracks_attempted += 1;
            if let Some(vine) = place(&scratch.grid, rng, stats) {
                scratch.push(vine.clone())?;
                stats.cycle_breaker_repairs += 1;
                log::trace!("Removed {shortest} from cycle {}", chain.join(" -> "));
                *layout = scratch;
                return Ok(Some(vine));
            }
        }
        Ok(None)
    }

    /// Remove vines until the blocking graph is acyclic
    ///
    /// Each chain first loses its shortest member. If the rest of the layout
    /// still cannot be cleared, pairs and triples of members are tried by
    /// descending score. Every removal set must pass the cheap single-step
    /// check before the bounded exact search confirms it. Returns the number
    /// of chains repaired.
    ///
    /// # Errors
    ///
    /// Returns `CircularBlocking` with the surviving chains when a chain
    /// cannot be repaired, after writing a failure dump when configured
    pub fn break_cycles(&self, layout: &mut Placement, stats: &mut GenerationStats) -> Result<usize> {
        let mut repairs = 0;

        for _ in 0..=layout.vines.len() {
            let graph = BlockingGraph::build(&layout.vines, &layout.grid);
            let chains = graph.cycles();
            let Some(chain) = chains.first() else {
                return Ok(repairs);
            };

            // Members of other chains are set aside so each chain is judged alone
            let unresolved: BTreeSet<&str> = chains
                .iter()
                .skip(1)
                .flatten()
                .map(String::as_str)
                .filter(|id| !chain.iter().any(|member| member == id))
                .collect();

            let Some(removal) = self.find_chain_removal(layout, &graph, chain, &unresolved, stats) else {
                let message = format!("blocking cycle could not be broken: {}", chain.join(" -> "));
                self.dump_failure(&message, layout, stats);
                return Err(GenerationError::CircularBlocking { chains });
            };

            for id in &removal {
                layout.remove(id);
            }
            repairs += 1;
            stats.cycle_breaker_repairs += 1;
            log::debug!("Broke blocking cycle by removing {}", removal.join(", "));
        }

        let chains = BlockingGraph::build(&layout.vines, &layout.grid).cycles();
        if chains.is_empty() {
            Ok(repairs)
        } else {
            Err(GenerationError::CircularBlocking { chains })
        }
    }

    fn find_chain_removal(
        &self,
        layout: &Placement,
        graph: &BlockingGraph,
        chain: &[String],
        unresolved: &BTreeSet<&str>,
        stats: &mut GenerationStats,
    ) -> Option<Vec<String>> {
        let shortest = shortest_member(layout, chain).map(|id| vec![id]);

        let combinations = rank_combinations(layout, graph, chain)
            .into_iter()
            .take(MAX_CYCLE_BREAKER_COMBINATIONS)
            .map(|combination| combination.ids);

        shortest.into_iter().chain(combinations).find(|removal| {
            stats.backtracks_attempted += 1;
            self.removal_clears(layout, removal, unresolved)
        })
    }

    fn removal_clears(&self, layout: &Placement, removal: &[String], unresolved: &BTreeSet<&str>) -> bool {
        let remaining: Vec<Vine> = layout
            .vines
            .iter()
            .filter(|vine| !removal.contains(&vine.id) && !unresolved.contains(vine.id.as_str()))
            .cloned()
            .collect();
        let (width, height) = (self.config.grid_width, self.config.grid_height);

        if !is_likely_solvable_partial(&remaining, width, height, PARTIAL_CHECK_MAX_STEPS) {
            return false;
        }
        ClearanceModel::new(width, height, &remaining)
            .is_ok_and(|model| model.search(REPAIR_MAX_STATES).is_solvable())
    }

    /// Write a failure dump for the current attempt when a directory is configured
    pub fn dump_failure(
        &self,
        message: &str,
        layout: &Placement,
        stats: &mut GenerationStats,
    ) -> Option<PathBuf> {
        if self.config.dump_dir.is_none() {
            return None;
        }
        let dump = self.capture(message, layout);
        self.write_dump(&dump, stats)
    }

    /// Write a backtrack dump of the state `failing_id` could not be placed in
    pub fn dump_backtrack(
        &self,
        failing_id: &str,
        layout: &Placement,
        stats: &mut GenerationStats,
    ) -> Option<PathBuf> {
        if self.config.dump_dir.is_none() {
            return None;
        }
        let message = format!("{failing_id}: no placement, starting local backtracking");
        let dump = self.capture(&message, layout).backtrack(failing_id);
        self.write_dump(&dump, stats)
    }

    fn capture(&self, message: &str, layout: &Placement) -> FailureDump {
        FailureDump::capture(
            self.config,
            self.attempt,
            self.seed,
            message,
            &layout.vines,
            &layout.grid,
        )
    }

    fn write_dump(&self, dump: &FailureDump, stats: &mut GenerationStats) -> Option<PathBuf> {
        let directory = self.config.dump_dir.as_ref()?;
        match dump.write(directory) {
            Ok(path) => {
                stats.dumps_produced += 1;
                Some(path)
            }
            Err(e) => {
                log::warn!("Could not write failure dump: {e}");
                None
            }
        }
    }
}

/// Shortest vine of a chain, ties broken by id
fn shortest_member(layout: &Placement, chain: &[String]) -> Option<String> {
    chain
        .iter()
        .filter_map(|id| layout.vine(id))
        .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.id.cmp(&b.id)))
        .map(|vine| vine.id.clone())
}

/// Pairs and triples of chain members ordered for the cycle breaker
///
/// Highest score first, then smaller sets, then lexicographic ids. Triples are
/// only formed for chains of at least three members.
pub fn rank_combinations(
    layout: &Placement,
    graph: &BlockingGraph,
    chain: &[String],
) -> Vec<RemovalCombination> {
    let mut members: Vec<&String> = chain.iter().collect();
    members.sort();
    members.dedup();

    let score = |ids: &[&String]| {
        let fan_out: usize = ids.iter().map(|id| graph.out_degree(id)).sum();
        let length: usize = ids
            .iter()
            .filter_map(|id| layout.vine(id))
            .map(Vine::len)
            .sum();
        fan_out * COMBINATION_FAN_OUT_WEIGHT + length
    };

    let mut combinations = Vec::new();
    let n = members.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (Some(&a), Some(&b)) = (members.get(i), members.get(j)) else {
                continue;
            };
            let pair = [a, b];
            combinations.push(RemovalCombination {
                score: score(&pair),
                ids: pair.iter().map(|id| (*id).clone()).collect(),
            });
            for k in (j + 1)..n {
                let Some(&c) = members.get(k) else {
                    continue;
                };
                let triple = [a, b, c];
                combinations.push(RemovalCombination {
                    score: score(&triple),
                    ids: triple.iter().map(|id| (*id).clone()).collect(),
                });
            }
        }
    }

    combinations.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.ids.len().cmp(&b.ids.len()))
            .then_with(|| a.ids.cmp(&b.ids))
    });
    combinations
}
