//! Centre-out placement with an exit guarantee for every vine

use crate::algorithm::backtracking::BacktrackEngine;
use crate::io::error::{Result, placement_failure};
use crate::model::generation::GenerationStats;
use crate::model::vine::next_vine_id;
use crate::placement::growth::{GrowthWeights, place_with_exit_guarantee, target_lengths};
use crate::placement::{Placement, PlacementContext, PlacementStrategy, STRATEGY_CENTER_OUT};
use crate::spatial::OccupancyGrid;
use rand::rngs::StdRng;

/// Growth preferences of the centre-out strategy
pub const CENTER_OUT_WEIGHTS: GrowthWeights = GrowthWeights {
    straight: 1.5,
    perpendicular: 1.5,
    free_neighbor: 0.8,
    jitter: 0.5,
    greedy_probability: 0.8,
    guard_reachability: true,
};

/// Seeds vines near the centre and points each head along a clear corridor
///
/// Every vine can leave the grid at the moment it is placed, so clearing in
/// reverse placement order always works.
#[derive(Clone, Copy, Debug, Default)]
pub struct CenterOut;

impl PlacementStrategy for CenterOut {
    fn name(&self) -> &'static str {
        STRATEGY_CENTER_OUT
    }

    fn description(&self) -> &'static str {
        "LIFO placement growing from the grid centre with exit guarantees"
    }

    fn is_lifo(&self) -> bool {
        true
    }

    fn place_vines(
        &self,
        context: &PlacementContext<'_>,
        rng: &mut StdRng,
        stats: &mut GenerationStats,
    ) -> Result<Placement> {
        let config = context.config;
        let engine = BacktrackEngine::new(config, context.attempt, context.seed);
        let target_cells = config.target_cells();
        let mut layout = Placement::empty(config);

        for target_length in target_lengths(config, rng) {
            if layout.grid.occupied_count() >= target_cells {
                break;
            }
            let vine_id = next_vine_id(&layout.vines);

            match place_with_exit_guarantee(
                &layout.grid,
                &vine_id,
                target_length,
                &CENTER_OUT_WEIGHTS,
                rng,
                stats,
            ) {
                Ok(vine) => layout.push(vine)?,
                Err(miss) => {
                    let blockers = miss.direct_blockers(&layout.grid);
                    let mut retry = |grid: &OccupancyGrid, rng: &mut StdRng, stats: &mut GenerationStats| {
                        place_with_exit_guarantee(
                            grid,
                            &vine_id,
                            target_length,
                            &CENTER_OUT_WEIGHTS,
                            rng,
                            stats,
                        )
                        .ok()
                    };
                    if let Err(e) = engine.recover_placement(
                        &mut layout,
                        &vine_id,
                        &blockers,
                        rng,
                        stats,
                        &mut retry,
                    ) {
                        log::debug!("Skipping vine: {e}");
                    }
                }
            }
        }

        if layout.vines.len() < 2 {
            return Err(placement_failure(
                &next_vine_id(&layout.vines),
                &format!("only {} vines placed", layout.vines.len()),
            ));
        }
        Ok(layout)
    }
}
