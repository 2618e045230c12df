//! Hand items to a player.

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Step};
use quarry_types::{EntityKind, GoalId};
use quarry_world::NavTarget;

use super::{Action, GatherItem, NavigateTo, Perform, Planning};

/// How close to stand before tossing.
const HAND_OVER_RANGE: f64 = 2.0;
const MAX_APPROACHES: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Gather,
    Approach,
    Finished,
}

/// Gathers items if needed, walks up to a player and tosses them over.
#[derive(Debug)]
pub struct GiveItem {
    player: String,
    item: String,
    count: u32,
    planning: Planning,
    phase: Phase,
    approaches: u32,
    child: Option<GoalResult>,
}

impl GiveItem {
    /// Give `count` of `item` to `player`.
    pub fn new(
        player: impl Into<String>,
        item: impl Into<String>,
        count: u32,
        planning: Planning,
    ) -> Self {
        Self {
            player: player.into(),
            item: item.into(),
            count,
            planning,
            phase: Phase::Gather,
            approaches: 0,
            child: None,
        }
    }
}

impl Goal for GiveItem {
    fn label(&self) -> String {
        format!("give {} {} to {}", self.count, self.item, self.player)
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        match self.child.take() {
            Some(Err(e)) => return Step::fail(e),
            Some(Ok(outcome)) if self.phase == Phase::Finished => return Step::ok(outcome),
            _ => {}
        }

        if self.phase == Phase::Gather {
            self.phase = Phase::Approach;
            if ctx.view().count(&self.item) < self.count {
                ctx.spawn(GatherItem::new(
                    self.item.clone(),
                    self.count,
                    self.planning.clone(),
                ));
                return Step::Pending;
            }
        }

        let view = ctx.view();
        let search = self.planning.config.search_radius;
        let Some(player) =
            view.nearest_entity(&|e| e.kind == EntityKind::Player && e.name == self.player, search)
        else {
            return Step::fail(GoalError::failed(format!("can't see {}", self.player)));
        };

        if view.position().distance_to(player.position) > HAND_OVER_RANGE {
            if self.approaches >= MAX_APPROACHES {
                return Step::fail(GoalError::failed(format!("can't reach {}", self.player)));
            }
            self.approaches = self.approaches.saturating_add(1);
            ctx.spawn(NavigateTo::new(NavTarget::Entity {
                id: player.id,
                range: HAND_OVER_RANGE,
            }));
            return Step::Pending;
        }

        self.phase = Phase::Finished;
        ctx.spawn(Perform::new(Action::Toss {
            item: self.item.clone(),
            count: self.count,
        }));
        Step::Pending
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}

