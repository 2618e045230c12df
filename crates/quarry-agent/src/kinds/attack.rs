//! Fight an entity.

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Outcome, Step};
use quarry_types::{EntityId, EquipSlot, GoalId, Vec3};
use quarry_world::{NavTarget, REACH, WorldView};
use tracing::debug;

use super::{Action, CollectDrops, DROP_RADIUS, NavigateTo, Perform};

const MAX_SWINGS: u32 = 40;
const MAX_APPROACHES: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Arm,
    Fight,
    Collect,
}

/// Approaches an entity and swings until it is gone, then optionally
/// collects what it dropped.
#[derive(Debug)]
pub struct AttackEntity {
    target: EntityId,
    collect_drops: bool,
    reach: f64,
    phase: Phase,
    swings: u32,
    approaches: u32,
    last_seen: Option<Vec3>,
    last_error: Option<GoalError>,
    child: Option<GoalResult>,
}

impl AttackEntity {
    /// Attack `target`.
    pub const fn new(target: EntityId) -> Self {
        Self {
            target,
            collect_drops: false,
            reach: REACH,
            phase: Phase::Arm,
            swings: 0,
            approaches: 0,
            last_seen: None,
            last_error: None,
            child: None,
        }
    }

    /// Pick up the drops once the target is gone.
    #[must_use]
    pub const fn collecting_drops(mut self) -> Self {
        self.collect_drops = true;
        self
    }

    /// Use a different melee reach.
    #[must_use]
    pub const fn with_reach(mut self, reach: f64) -> Self {
        self.reach = reach;
        self
    }

    fn give_up(&mut self, tries: u32) -> Step {
        Step::fail(self.last_error.take().unwrap_or_else(|| GoalError::EndlessLoop {
            label: self.label(),
            iterations: tries,
        }))
    }
}

/// The held item dealing the most melee damage, if any beats bare hands.
fn best_weapon(view: &dyn WorldView) -> Option<String> {
    let data = view.data();
    view.inventory()
        .into_keys()
        .filter_map(|item| {
            let damage = data.weapon_damage(Some(&item));
            (damage > 1.0).then_some((item, damage))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(item, _)| item)
}

impl Goal for AttackEntity {
    fn label(&self) -> String {
        format!("attack {}", self.target)
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        let result = self.child.take();

        if self.phase == Phase::Arm {
            self.phase = Phase::Fight;
            let held = ctx.view().held_item();
            if let Some(item) = best_weapon(ctx.view()).filter(|w| held.as_ref() != Some(w)) {
                ctx.spawn(Perform::new(Action::Equip {
                    item,
                    slot: EquipSlot::Hand,
                }));
                return Step::Pending;
            }
        } else if let Some(Err(e)) = result {
            // Swings and approaches are retried until a guard trips.
            debug!(goal = %ctx.id(), error = %e, "attack child failed");
            self.last_error = Some(e);
        }

        if self.phase == Phase::Collect {
            return Step::ok(Outcome::Killed);
        }

        let view = ctx.view();
        let Some(entity) = view.entity(self.target) else {
            if let Some(at) = self.last_seen.filter(|_| self.collect_drops) {
                self.phase = Phase::Collect;
                ctx.spawn(CollectDrops::around(at, DROP_RADIUS));
                return Step::Pending;
            }
            return Step::ok(Outcome::Killed);
        };
        self.last_seen = Some(entity.position);

        if view.position().distance_to(entity.position) > self.reach {
            if self.approaches >= MAX_APPROACHES {
                return self.give_up(self.approaches);
            }
            self.approaches = self.approaches.saturating_add(1);
            let range = (self.reach - 1.0).max(1.0);
            ctx.spawn(NavigateTo::new(NavTarget::Entity {
                id: self.target,
                range,
            }));
            return Step::Pending;
        }

        if self.swings >= MAX_SWINGS {
            return self.give_up(self.swings);
        }
        self.swings = self.swings.saturating_add(1);
        ctx.spawn(Perform::new(Action::Attack {
            target: self.target,
        }));
        Step::Pending
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}
