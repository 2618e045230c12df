//! Plant a sapling.

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Outcome, Step};
use quarry_types::{BlockPos, GoalId};
use quarry_world::{AgentMemory, GameData, WorldView};

use super::{PlaceBlock, held_matching};

/// How far from the agent to look for soil.
pub const PLANT_RADIUS: f64 = 16.0;

/// Minimum spacing between planted saplings.
pub const SAPLING_SPACING: f64 = 5.0;

/// Soil with air above it, away from every sapling planted so far.
pub(crate) fn planting_spot(view: &dyn WorldView, memory: &AgentMemory) -> Option<BlockPos> {
    view.find_block(
        &|pos, name| {
            matches!(name, "grass_block" | "dirt")
                && view.block_at(pos.up()).is_none()
                && memory
                    .saplings
                    .iter()
                    .all(|s| s.pos.center().distance_to(pos.up().center()) >= SAPLING_SPACING)
        },
        PLANT_RADIUS,
    )
}

/// Plants a held sapling on open soil and remembers where.
#[derive(Debug, Default)]
pub struct PlantSapling {
    planted: Option<(String, BlockPos)>,
    child: Option<GoalResult>,
}

impl PlantSapling {
    /// A new planting goal.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Goal for PlantSapling {
    fn label(&self) -> String {
        match &self.planted {
            Some((sapling, pos)) => format!("plant {sapling} at {pos}"),
            None => String::from("plant a sapling"),
        }
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        match (self.child.take(), &self.planted) {
            (Some(Err(e)), _) => return Step::fail(e),
            (Some(Ok(_)), Some((sapling, pos))) => {
                let pos = *pos;
                ctx.memory_mut().remember_sapling(sapling, pos);
                return Step::ok(Outcome::Planted(pos));
            }
            _ => {}
        }

        let Some(sapling) = held_matching(ctx.view(), GameData::is_sapling) else {
            return Step::fail(GoalError::failed("no saplings to plant"));
        };
        let Some(soil) = planting_spot(ctx.view(), ctx.memory()) else {
            return Step::fail(GoalError::failed("nowhere to plant"));
        };
        let pos = soil.up();
        self.planted = Some((sapling.clone(), pos));
        ctx.spawn(PlaceBlock::at(sapling, pos));
        Step::Pending
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}
