//! Directed "blocks" relation between vines
//!
//! Vine A blocks vine B when the cell B's head would step into next is owned by A.
//! The relation only looks one step ahead, so it feeds difficulty metrics and
//! backtracking heuristics but never decides solvability on its own.

use crate::io::configuration::DIRECT_BLOCKER_BONUS;
use crate::model::point::Point;
use crate::model::vine::Vine;
use crate::spatial::OccupancyGrid;
use std::collections::{BTreeSet, HashMap};

/// Summary metrics of a blocking graph
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockingAnalysis {
    /// Longest blocking chain, counted in edges
    pub max_depth: usize,
    /// Mean chain length over all vines
    pub average_depth: f64,
    /// Every detected cycle as an ordered list of vine ids
    pub cycles: Vec<Vec<String>>,
}

impl BlockingAnalysis {
    /// Test whether any cycle was found
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

/// Blocking relation indexed by vine position in the analysed set
#[derive(Clone, Debug)]
pub struct BlockingGraph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    blocks: Vec<Vec<usize>>,
    blockers: Vec<Vec<usize>>,
}

impl BlockingGraph {
    /// Build the relation using an existing occupancy map
    pub fn build(vines: &[Vine], grid: &OccupancyGrid) -> Self {
        let ids: Vec<String> = vines.iter().map(|vine| vine.id.clone()).collect();
        let index: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(position, id)| (id.clone(), position))
            .collect();
        Self::from_lookup(ids, index, vines, |target| {
            grid.owner(target).map(str::to_string)
        })
    }

    /// Build the relation from the vines alone
    pub fn from_vines(vines: &[Vine]) -> Self {
        let ids: Vec<String> = vines.iter().map(|vine| vine.id.clone()).collect();
        let index: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(position, id)| (id.clone(), position))
            .collect();
        let owners: HashMap<Point, &str> = vines
            .iter()
            .flat_map(|vine| vine.ordered_path.iter().map(|&point| (point, vine.id.as_str())))
            .collect();
        Self::from_lookup(ids, index, vines, |target| {
            owners.get(&target).map(|owner| (*owner).to_string())
        })
    }

    fn from_lookup(
        ids: Vec<String>,
        index: HashMap<String, usize>,
        vines: &[Vine],
        owner_of: impl Fn(Point) -> Option<String>,
    ) -> Self {
        let mut blocks = vec![Vec::new(); vines.len()];
        let mut blockers = vec![Vec::new(); vines.len()];

        for (blocked, vine) in vines.iter().enumerate() {
            let Some(owner) = vine.head_target().and_then(&owner_of) else {
                continue;
            };
            let Some(&blocker) = index.get(&owner) else {
                continue;
            };
            if blocker == blocked {
                continue;
            }
            if let Some(edges) = blocks.get_mut(blocker) {
                edges.push(blocked);
            }
            if let Some(edges) = blockers.get_mut(blocked) {
                edges.push(blocker);
            }
        }

        Self {
            ids,
            index,
            blocks,
            blockers,
        }
    }

    /// Number of vines in the graph
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Test whether the graph has no vines
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of blocking edges
    pub fn edge_count(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }

    /// Test whether `blocker` blocks `blocked`
    pub fn blocks(&self, blocker: &str, blocked: &str) -> bool {
        match (self.index.get(blocker), self.index.get(blocked)) {
            (Some(&a), Some(b)) => self.blocks.get(a).is_some_and(|edges| edges.contains(b)),
            _ => false,
        }
    }

    /// Vines blocked by `id`
    pub fn blocked_vines(&self, id: &str) -> Vec<&str> {
        self.neighbors(&self.blocks, id)
    }

    /// Vines blocking `id`
    pub fn blockers(&self, id: &str) -> Vec<&str> {
        self.neighbors(&self.blockers, id)
    }

    fn neighbors<'a>(&'a self, edges: &'a [Vec<usize>], id: &str) -> Vec<&'a str> {
        self.index
            .get(id)
            .and_then(|&position| edges.get(position))
            .map(|targets| {
                targets
                    .iter()
                    .filter_map(|&target| self.ids.get(target).map(String::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of vines blocked by `id`
    pub fn out_degree(&self, id: &str) -> usize {
        self.index
            .get(id)
            .and_then(|&position| self.blocks.get(position))
            .map_or(0, Vec::len)
    }

    /// Depth-first walk over every vine with an explicit stack
    ///
    /// `on_back_edge` receives the current path and the vine it loops back to.
    /// `on_finish` is called once per vine after all its successors.
    fn traverse(
        &self,
        mut on_back_edge: impl FnMut(&[usize], usize),
        mut on_finish: impl FnMut(usize),
    ) {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Visit {
            Unseen,
            Active,
            Done,
        }

        let mut state = vec![Visit::Unseen; self.ids.len()];
        for root in 0..self.ids.len() {
            if state.get(root) != Some(&Visit::Unseen) {
                continue;
            }
            if let Some(visit) = state.get_mut(root) {
                *visit = Visit::Active;
            }
            let mut path = vec![root];
            let mut cursors = vec![0_usize];

            loop {
                let Some(&node) = path.last() else {
                    break;
                };
                let cursor = cursors.last().copied().unwrap_or_default();
                let child = self
                    .blocks
                    .get(node)
                    .and_then(|edges| edges.get(cursor))
                    .copied();
                if let Some(child) = child {
                    if let Some(next) = cursors.last_mut() {
                        *next += 1;
                    }
                    match state.get(child) {
                        Some(Visit::Unseen) => {
                            if let Some(visit) = state.get_mut(child) {
                                *visit = Visit::Active;
                            }
                            path.push(child);
                            cursors.push(0);
                        }
                        Some(Visit::Active) => on_back_edge(&path, child),
                        _ => {}
                    }
                } else {
                    on_finish(node);
                    if let Some(visit) = state.get_mut(node) {
                        *visit = Visit::Done;
                    }
                    path.pop();
                    cursors.pop();
                }
            }
        }
    }

    /// Longest blocking chain starting at each vine
    ///
    /// Results are memoized so each vine is expanded once. An edge closing a
    /// cycle counts as a single step.
    pub fn depths(&self) -> Vec<usize> {
        let mut depths: Vec<Option<usize>> = vec![None; self.ids.len()];
        self.traverse(
            |_, _| {},
            |node| {
                let depth = self
                    .blocks
                    .get(node)
                    .map(|edges| {
                        edges
                            .iter()
                            .map(|&child| {
                                depths
                                    .get(child)
                                    .copied()
                                    .flatten()
                                    .map_or(1, |depth| depth + 1)
                            })
                            .max()
                            .unwrap_or(0)
                    })
                    .unwrap_or(0);
                if let Some(slot) = depths.get_mut(node) {
                    *slot = Some(depth);
                }
            },
        );
        depths.into_iter().map(Option::unwrap_or_default).collect()
    }

    /// Longest blocking chain in the graph
    pub fn max_depth(&self) -> usize {
        self.depths().into_iter().max().unwrap_or(0)
    }

    /// Blocking cycles, each listed from the vine first reached by the walk
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        self.traverse(
            |path, target| {
                if let Some(start) = path.iter().position(|&node| node == target) {
                    let chain = path
                        .get(start..)
                        .unwrap_or_default()
                        .iter()
                        .filter_map(|&node| self.ids.get(node).cloned())
                        .collect();
                    cycles.push(chain);
                }
            },
            |_| {},
        );
        cycles
    }

    /// Depth and cycle metrics in one report
    pub fn analyze(&self) -> BlockingAnalysis {
        let depths = self.depths();
        let max_depth = depths.iter().copied().max().unwrap_or(0);
        let average_depth = if depths.is_empty() {
            0.0
        } else {
            depths.iter().sum::<usize>() as f64 / depths.len() as f64
        };
        BlockingAnalysis {
            max_depth,
            average_depth,
            cycles: self.cycles(),
        }
    }

    /// Vines worth removing to make room for a failing placement
    ///
    /// Vines in `direct_blockers` rank first, then vines blocking many others.
    /// Ties are broken by id.
    pub fn rank_backtrack_candidates(
        &self,
        direct_blockers: &BTreeSet<String>,
        window: usize,
    ) -> Vec<String> {
        let mut scored: Vec<(usize, &String)> = self
            .ids
            .iter()
            .map(|id| {
                let bonus = if direct_blockers.contains(id) {
                    DIRECT_BLOCKER_BONUS
                } else {
                    0
                };
                (bonus + self.out_degree(id), id)
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(window)
            .map(|(_, id)| id.clone())
            .collect()
    }
}
