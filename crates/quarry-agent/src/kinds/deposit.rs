//! Store items in a chest.


use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Outcome, Step};
use quarry_types::{BlockPos, GoalId};
use quarry_world::{Landmark, NavTarget, WorldView};

use super::{Action, NavigateTo, Perform, Planning, in_reach};

const MAX_APPROACHES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Locate,
    Approach,
    Open,
    Store,
}

/// Items worth keeping on hand: weapons, harvest tools and food.
fn kept(view: &dyn WorldView, item: &str) -> bool {
    let data = view.data();
    data.weapons.contains_key(item)
        || data.food_value(item).is_some()
        || data
            .blocks
            .values()
            .any(|b| b.harvest_tools.iter().any(|t| t == item))
}

/// Opens the nearest known chest, deposits items and closes it again.
///
/// By default everything except weapons, tools and food is stored.
#[derive(Debug)]
pub struct DepositItems {
    planning: Planning,
    only: Option<String>,
    phase: Phase,
    chest: Option<BlockPos>,
    queue: Vec<(String, u32)>,
    pending: u32,
    deposited: u32,
    open: bool,
    approaches: u32,
    child: Option<GoalResult>,
}

impl DepositItems {
    /// Deposit everything that is not kept on hand.
    pub const fn new(planning: Planning) -> Self {
        Self {
            planning,
            only: None,
            phase: Phase::Locate,
            chest: None,
            queue: Vec::new(),
            pending: 0,
            deposited: 0,
            open: false,
            approaches: 0,
            child: None,
        }
    }

    /// Deposit every held `item` and nothing else.
    #[must_use]
    pub fn only(mut self, item: impl Into<String>) -> Self {
        self.only = Some(item.into());
        self
    }

    fn contents(&self, view: &dyn WorldView) -> Vec<(String, u32)> {
        let inventory = view.inventory();
        match &self.only {
            Some(item) => inventory
                .get(item)
                .filter(|n| **n > 0)
                .map(|n| vec![(item.clone(), *n)])
                .unwrap_or_default(),
            None => inventory
                .into_iter()
                .filter(|(item, n)| *n > 0 && !kept(view, item))
                .collect(),
        }
    }

    fn close(&mut self, ctx: &GoalContext<'_>) {
        if self.open {
            ctx.actions().close_container();
            self.open = false;
        }
    }
}

impl Goal for DepositItems {
    fn label(&self) -> String {
        match &self.only {
            Some(item) => format!("deposit {item}"),
            None => String::from("deposit items"),
        }
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        let mut result = self.child.take();
        if let Some(Err(e)) = result.take_if(|r| r.is_err()) {
            self.close(ctx);
            return Step::fail(e);
        }

        loop {
            match self.phase {
                Phase::Locate => {
                    let Some(chest) = self.planning.estimator(ctx).locate(Landmark::Chest) else {
                        return Step::fail(GoalError::failed("no known chest"));
                    };
                    ctx.memory_mut().remember_block("chest", chest);
                    self.chest = Some(chest);
                    self.phase = Phase::Approach;
                }
                Phase::Approach => {
                    let Some(chest) = self.chest else {
                        self.phase = Phase::Locate;
                        continue;
                    };
                    if in_reach(ctx.view(), chest, self.planning.reach()) {
                        self.phase = Phase::Open;
                        continue;
                    }
                    if self.approaches >= MAX_APPROACHES {
                        return Step::fail(GoalError::failed("can't reach the chest"));
                    }
                    self.approaches = self.approaches.saturating_add(1);
                    ctx.spawn(NavigateTo::new(NavTarget::Block(chest)));
                    return Step::Pending;
                }
                Phase::Open => {
                    let Some(chest) = self.chest else {
                        self.phase = Phase::Locate;
                        continue;
                    };
                    self.queue = self.contents(ctx.view());
                    if self.queue.is_empty() {
                        return Step::fail(GoalError::failed(match &self.only {
                            Some(item) => format!("no {item} to store"),
                            None => String::from("nothing to store"),
                        }));
                    }
                    self.phase = Phase::Store;
                    self.open = true;
                    ctx.spawn(Perform::new(Action::OpenContainer { pos: chest }));
                    return Step::Pending;
                }
                Phase::Store => {
                    if result.take().is_some() {
                        self.deposited = self.deposited.saturating_add(self.pending);
                    }
                    self.pending = 0;
                    let Some((item, count)) = self.queue.pop() else {
                        self.close(ctx);
                        return Step::ok(Outcome::Deposited(self.deposited));
                    };
                    self.pending = count;
                    ctx.spawn(Perform::new(Action::Deposit { item, count }));
                    return Step::Pending;
                }
            }
        }
    }

    fn cancel(&mut self, ctx: &mut GoalContext<'_>) {
        self.close(ctx);
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}
