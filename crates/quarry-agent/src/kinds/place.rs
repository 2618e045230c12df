//! Place an item as a block.

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Outcome, Step};
use quarry_types::{BlockPos, GoalId};
use quarry_world::{ActionError, NavTarget, REACH, WorldView};

use super::{Action, NavigateTo, Perform, in_reach};

const MAX_APPROACHES: u32 = 4;

/// Spots around the agent's feet tried in order.
const RING: [(i32, i32); 12] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (2, 0),
    (-2, 0),
    (0, 2),
    (0, -2),
];

/// A free spot next to the agent, preferring one with ground beneath it.
pub(crate) fn free_spot(view: &dyn WorldView) -> Option<BlockPos> {
    let feet = view.position().block();
    let free: Vec<BlockPos> = RING
        .iter()
        .map(|(dx, dz)| feet.offset(*dx, 0, *dz))
        .filter(|pos| view.block_at(*pos).is_none())
        .collect();
    free.iter()
        .copied()
        .find(|pos| view.block_at(pos.down()).is_some())
        .or_else(|| free.first().copied())
}

/// Places one held item, at a given position or on a free spot next to
/// the agent. Workstations and beds it places are remembered.
#[derive(Debug)]
pub struct PlaceBlock {
    item: String,
    at: Option<BlockPos>,
    placing: bool,
    approaches: u32,
    child: Option<GoalResult>,
}

impl PlaceBlock {
    /// Place `item` next to the agent.
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            at: None,
            placing: false,
            approaches: 0,
            child: None,
        }
    }

    /// Place `item` exactly at `pos`.
    pub fn at(item: impl Into<String>, pos: BlockPos) -> Self {
        Self {
            at: Some(pos),
            ..Self::new(item)
        }
    }
}

impl Goal for PlaceBlock {
    fn label(&self) -> String {
        match self.at {
            Some(pos) => format!("place {} at {pos}", self.item),
            None => format!("place {}", self.item),
        }
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        match (self.child.take(), self.placing) {
            (Some(Err(e)), _) => return Step::fail(e),
            (Some(Ok(_)), true) => {
                let Some(pos) = self.at else {
                    return Step::fail(GoalError::failed("placed block went missing"));
                };
                if let Some(block) = ctx.view().data().placed_block(&self.item).map(str::to_owned) {
                    ctx.memory_mut().remember_block(&block, pos);
                }
                return Step::ok(Outcome::Placed(pos));
            }
            _ => {}
        }

        let view = ctx.view();
        let have = view.count(&self.item);
        if have == 0 {
            return Step::fail(ActionError::MissingItem {
                item: self.item.clone(),
                needed: 1,
                have,
            });
        }
        let pos = match self.at {
            Some(pos) => pos,
            None => {
                let Some(pos) = free_spot(view) else {
                    return Step::fail(GoalError::failed(format!(
                        "no room to place {}",
                        self.item
                    )));
                };
                self.at = Some(pos);
                pos
            }
        };

        if !in_reach(view, pos, REACH) {
            if self.approaches >= MAX_APPROACHES {
                return Step::fail(ActionError::OutOfReach {
                    target: pos.to_string(),
                });
            }
            self.approaches = self.approaches.saturating_add(1);
            ctx.spawn(NavigateTo::new(NavTarget::Block(pos)));
            return Step::Pending;
        }

        self.placing = true;
        ctx.spawn(Perform::new(Action::Place {
            item: self.item.clone(),
            pos,
        }));
        Step::Pending
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}
