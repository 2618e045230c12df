//! Sleep through the night.

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Outcome, Step};
use quarry_types::{BlockPos, GoalId};
use quarry_world::{ActionError, GameData, Landmark, NavTarget};

use super::{Action, GatherItem, NavigateTo, Perform, PlaceBlock, Planning, held_matching, in_reach};

/// Bed item crafted when no bed is known or held.
pub const DEFAULT_BED: &str = "white_bed";

const MAX_BED_ATTEMPTS: u32 = 3;
const MAX_APPROACHES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Bed,
    Approach,
    Finished,
}

/// Finds a bed (known, placed from the inventory, or crafted), walks to it
/// and sleeps. Only possible at night.
#[derive(Debug)]
pub struct Sleep {
    planning: Planning,
    phase: Phase,
    bed: Option<BlockPos>,
    attempts: u32,
    approaches: u32,
    sleeping: bool,
    child: Option<GoalResult>,
}

impl Sleep {
    /// Sleep, obtaining a bed with `planning` if needed.
    pub const fn new(planning: Planning) -> Self {
        Self {
            planning,
            phase: Phase::Bed,
            bed: None,
            attempts: 0,
            approaches: 0,
            sleeping: false,
            child: None,
        }
    }
}

impl Goal for Sleep {
    fn label(&self) -> String {
        String::from("sleep")
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        let result = self.child.take();
        if let Some(Err(e)) = result {
            self.sleeping = false;
            return Step::fail(e);
        }

        loop {
            match self.phase {
                Phase::Bed => {
                    if !ctx.view().is_night() {
                        return Step::fail(ActionError::NotNight);
                    }
                    let found = self.planning.estimator(ctx).locate(Landmark::Bed);
                    if let Some(pos) = found {
                        if let Some(block) = ctx.view().block_at(pos) {
                            ctx.memory_mut().remember_block(&block, pos);
                        }
                        self.bed = Some(pos);
                        self.phase = Phase::Approach;
                        continue;
                    }
                    if self.attempts >= MAX_BED_ATTEMPTS {
                        return Step::fail(GoalError::failed("couldn't find a bed"));
                    }
                    self.attempts = self.attempts.saturating_add(1);
                    match held_matching(ctx.view(), GameData::is_bed) {
                        Some(bed) => ctx.spawn(PlaceBlock::new(bed)),
                        None => ctx.spawn(GatherItem::new(DEFAULT_BED, 1, self.planning.clone())),
                    };
                    return Step::Pending;
                }
                Phase::Approach => {
                    let Some(bed) = self.bed else {
                        self.phase = Phase::Bed;
                        continue;
                    };
                    let still_there = ctx
                        .view()
                        .block_at(bed)
                        .is_some_and(|b| GameData::is_bed(&b));
                    if !still_there {
                        ctx.memory_mut().forget(bed);
                        self.bed = None;
                        self.phase = Phase::Bed;
                        continue;
                    }
                    if !in_reach(ctx.view(), bed, self.planning.reach()) {
                        if self.approaches >= MAX_APPROACHES {
                            return Step::fail(GoalError::failed("can't reach the bed"));
                        }
                        self.approaches = self.approaches.saturating_add(1);
                        ctx.spawn(NavigateTo::new(NavTarget::Block(bed)));
                        return Step::Pending;
                    }
                    self.phase = Phase::Finished;
                    self.sleeping = true;
                    ctx.spawn(Perform::new(Action::Sleep { bed }));
                    return Step::Pending;
                }
                Phase::Finished => {
                    self.sleeping = false;
                    return Step::ok(Outcome::Slept);
                }
            }
        }
    }

    fn cancel(&mut self, ctx: &mut GoalContext<'_>) {
        if self.sleeping {
            ctx.actions().wake();
        }
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}
