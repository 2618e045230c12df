//! Eat the most filling food held.

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Outcome, Step};
use quarry_types::{EquipSlot, GoalId};
use quarry_world::WorldView;

use super::{Action, Perform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Equip,
    Consume,
    Finished,
}

/// Equips and eats the held food restoring the most points.
#[derive(Debug)]
pub struct Eat {
    phase: Phase,
    food: Option<String>,
    child: Option<GoalResult>,
}

impl Eat {
    /// A new eat goal.
    pub const fn new() -> Self {
        Self {
            phase: Phase::Equip,
            food: None,
            child: None,
        }
    }
}

impl Default for Eat {
    fn default() -> Self {
        Self::new()
    }
}

/// The held food restoring the most points.
pub(crate) fn best_food(view: &dyn WorldView) -> Option<String> {
    let data = view.data();
    view.inventory()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .filter_map(|(item, _)| data.food_value(&item).map(|value| (item, value)))
        .max_by_key(|(_, value)| *value)
        .map(|(item, _)| item)
}

impl Goal for Eat {
    fn label(&self) -> String {
        match &self.food {
            Some(food) => format!("eat {food}"),
            None => String::from("eat"),
        }
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        if let Some(Err(e)) = self.child.take() {
            return Step::fail(e);
        }
        match self.phase {
            Phase::Equip => {
                let Some(food) = best_food(ctx.view()) else {
                    return Step::fail(GoalError::failed("nothing to eat"));
                };
                self.food = Some(food.clone());
                self.phase = Phase::Consume;
                if ctx.view().held_item().as_ref() != Some(&food) {
                    ctx.spawn(Perform::new(Action::Equip {
                        item: food,
                        slot: EquipSlot::Hand,
                    }));
                    return Step::Pending;
                }
                self.step(ctx)
            }
            Phase::Consume => {
                self.phase = Phase::Finished;
                ctx.spawn(Perform::new(Action::Consume));
                Step::Pending
            }
            Phase::Finished => Step::ok(Outcome::Ate(self.food.clone().unwrap_or_default())),
        }
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}
