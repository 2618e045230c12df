//! Harvest mature crops and replant them.

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Outcome, Step};
use quarry_planner::AcquireOptions;
use quarry_types::{BlockPos, GoalId};
use quarry_world::WorldView;
use tracing::debug;

use super::{DigBlock, PlaceBlock, Planning};

/// How far from the agent to look for crops.
pub const HARVEST_RADIUS: f64 = 16.0;

const MAX_ROUNDS: u32 = 16;

/// Nearest mature crop block.
pub(crate) fn ripe_crop(view: &dyn WorldView) -> Option<BlockPos> {
    let data = view.data();
    view.find_block(&|_, name| data.seed_for(name).is_some(), HARVEST_RADIUS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Find,
    Replant { pos: BlockPos, seed: String },
}

/// Digs every mature crop nearby and plants a seed back in its place.
#[derive(Debug)]
pub struct HarvestCrops {
    planning: Planning,
    phase: Phase,
    harvested: u32,
    rounds: u32,
    child: Option<GoalResult>,
}

impl HarvestCrops {
    /// Harvest with the tools already held.
    pub fn new(planning: Planning) -> Self {
        Self {
            planning: planning.with_options(AcquireOptions::HELD_TOOLS_ONLY),
            phase: Phase::Find,
            harvested: 0,
            rounds: 0,
            child: None,
        }
    }

    fn finish(&self) -> Step {
        if self.harvested == 0 {
            return Step::fail(GoalError::failed("no ripe crops nearby"));
        }
        Step::ok(Outcome::Harvested(self.harvested))
    }
}

impl Goal for HarvestCrops {
    fn label(&self) -> String {
        String::from("harvest crops")
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        let result = self.child.take();

        if let Phase::Replant { pos, seed } = &self.phase {
            if let Some(Err(e)) = result {
                return Step::fail(e);
            }
            let (pos, seed) = (*pos, seed.clone());
            self.harvested = self.harvested.saturating_add(1);
            self.phase = Phase::Find;
            if ctx.view().count(&seed) > 0 {
                ctx.spawn(PlaceBlock::at(seed, pos));
                return Step::Pending;
            }
        } else if let Some(Err(e)) = result {
            debug!(goal = %ctx.id(), error = %e, "replanting failed");
        }

        if self.rounds >= MAX_ROUNDS {
            return self.finish();
        }
        let view = ctx.view();
        let Some(pos) = ripe_crop(view) else {
            return self.finish();
        };
        let Some(seed) = view
            .block_at(pos)
            .and_then(|crop| view.data().seed_for(&crop).map(str::to_owned))
        else {
            return self.finish();
        };

        self.rounds = self.rounds.saturating_add(1);
        self.phase = Phase::Replant { pos, seed };
        ctx.spawn(DigBlock::new(pos, self.planning.clone()));
        Step::Pending
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}
