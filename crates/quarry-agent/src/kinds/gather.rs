//! Obtain a quantity of an item by the cheapest available means.
//!
//! Each iteration re-measures how many items are still missing, asks the
//! cost estimator for the cheapest branch that has not failed yet, and
//! runs that branch as one child goal. A failed child rejects exactly the
//! alternative it tried (a block position, an entity, a recipe index, a
//! smelting recipe) and the loop continues with the next cheapest one.
//!
//! A cancellation or the tree-depth guard fails the whole gather: another
//! alternative would hit the same wall. When the chosen branch is taller
//! than the tree levels left, the raw material at the bottom of its
//! deepest chain is gathered first as a direct child, which shortens the
//! branch on the next iteration.

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, MAX_TREE_DEPTH, Outcome, Step};
use quarry_planner::{Branch, Rejections};
use quarry_types::GoalId;
use quarry_world::GameData;
use tracing::debug;

use super::levels::{branch_height, levels_left};
use super::{AttackEntity, CraftItem, DigBlock, Planning, SmeltItem};

/// Gathers `count` of an item.
#[derive(Debug)]
pub struct GatherItem {
    item: String,
    count: u32,
    planning: Planning,
    force: bool,
    baseline: Option<u32>,
    acquired: Option<Outcome>,
    rejected: Rejections,
    current: Option<Branch>,
    prerequisite: Option<String>,
    iterations: u32,
    child: Option<GoalResult>,
}

impl GatherItem {
    /// Gather until `count` of `item` are held.
    pub fn new(item: impl Into<String>, count: u32, planning: Planning) -> Self {
        Self {
            item: item.into(),
            count,
            planning,
            force: false,
            baseline: None,
            acquired: None,
            rejected: Rejections::new(),
            current: None,
            prerequisite: None,
            iterations: 0,
            child: None,
        }
    }

    /// Gather `count` more, ignoring what is already held.
    #[must_use]
    pub const fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// The item being gathered.
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Why no branch is left.
    fn exhausted(&self, data: &GameData) -> GoalError {
        let recipes = data.recipes_for(&self.item);
        let only_circular = !recipes.is_empty()
            && recipes.iter().all(|r| r.is_self_referential())
            && data.blocks_dropping(&self.item).is_empty()
            && data.creatures_dropping(&self.item).is_empty()
            && data.smelting_for(&self.item).is_empty();
        if only_circular {
            GoalError::Circular {
                item: self.item.clone(),
            }
        } else {
            GoalError::Unobtainable {
                item: self.item.clone(),
            }
        }
    }

    fn spawn_branch(&self, branch: &Branch, required: u32, ctx: &mut GoalContext<'_>) {
        match branch {
            Branch::Dig { pos, .. } => {
                ctx.spawn(DigBlock::new(*pos, self.planning.excluding(&self.item)));
            }
            Branch::Attack { entity, .. } => {
                ctx.spawn(AttackEntity::new(*entity).collecting_drops());
            }
            Branch::Craft { recipe } => {
                ctx.spawn(
                    CraftItem::new(self.item.clone(), required, self.planning.clone())
                        .with_recipe(*recipe),
                );
            }
            Branch::Smelt { recipe } => {
                ctx.spawn(
                    SmeltItem::new(self.item.clone(), required, self.planning.clone())
                        .with_recipe(*recipe),
                );
            }
        }
    }
}

impl Goal for GatherItem {
    fn label(&self) -> String {
        format!("gather {} {}", self.count, self.item)
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        match (self.child.take(), self.current.take(), self.prerequisite.take()) {
            (Some(Err(e)), _, _) if e.is_structural() => return Step::fail(e),
            (Some(Err(e)), _, Some(prerequisite)) => {
                debug!(
                    goal = %ctx.id(),
                    item = %self.item,
                    %prerequisite,
                    error = %e,
                    "prerequisite failed"
                );
                return Step::fail(e);
            }
            (Some(Ok(outcome)), Some(_), _) => self.acquired = Some(outcome),
            (Some(Err(e)), Some(branch), None) => {
                debug!(
                    goal = %ctx.id(),
                    item = %self.item,
                    branch = %branch,
                    error = %e,
                    "branch failed, rejecting it"
                );
                self.rejected.reject(branch.rejection());
            }
            _ => {}
        }

        let have = ctx.view().count(&self.item);
        let force = self.force;
        let baseline = *self.baseline.get_or_insert(if force { have } else { 0 });
        let target = self.count.saturating_add(baseline);
        if have >= target {
            return Step::ok(self.acquired.take().unwrap_or(Outcome::Have(have)));
        }

        if self.iterations >= self.planning.config.max_iterations {
            return Step::fail(GoalError::EndlessLoop {
                label: self.label(),
                iterations: self.iterations,
            });
        }
        self.iterations = self.iterations.saturating_add(1);

        let required = target.saturating_sub(have);
        let plan = self.planning.estimator(ctx).plan(
            &self.item,
            required,
            self.planning.options,
            self.planning.depth,
            &self.planning.ancestors,
            &self.rejected,
        );
        let Some(plan) = plan else {
            return Step::fail(self.exhausted(ctx.view().data()));
        };

        let height = branch_height(
            &self.planning.estimator(ctx),
            &self.item,
            required,
            &plan.branch,
            &self.planning,
        );
        let left = levels_left(ctx.depth());
        if height.levels > left {
            let (item, count) = height.deepest;
            if item == self.item {
                return Step::fail(GoalError::TooDeep {
                    limit: MAX_TREE_DEPTH,
                });
            }
            debug!(
                goal = %ctx.id(),
                item = %self.item,
                branch = %plan.branch,
                levels = height.levels,
                left,
                prerequisite = %item,
                "branch too tall, gathering its raw material first"
            );
            ctx.spawn(GatherItem::new(item.clone(), count, self.planning.nested(&self.item)));
            self.prerequisite = Some(item);
            return Step::Pending;
        }

        debug!(
            goal = %ctx.id(),
            item = %self.item,
            required,
            branch = %plan.branch,
            cost = plan.cost,
            "gather branch chosen"
        );
        self.spawn_branch(&plan.branch, required, ctx);
        self.current = Some(plan.branch);
        Step::Pending
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use quarry_planner::PlannerConfig;
    use quarry_types::{BlockPos, Recipe};
    use quarry_world::{GameData, SimWorld, WorldView};

    use super::*;
    use crate::kinds::bench::{Bench, Nest};

    fn tree(world: &SimWorld, x: i32, z: i32) {
        world.fill(BlockPos::new(x, 64, z), BlockPos::new(x, 67, z), "oak_log");
    }

    #[test]
    fn iteration_guard_stops_a_gather() {
        let world = SimWorld::vanilla();
        tree(&world, 3, 0);
        let config = PlannerConfig {
            max_iterations: 1,
            ..PlannerConfig::default()
        };
        let mut bench = Bench::with_config(world, config);

        let id = bench.push(GatherItem::new("oak_log", 3, bench.planning.clone()));
        let (result, _) = bench.run(id, 100);

        assert_eq!(
            result,
            Err(GoalError::EndlessLoop {
                label: String::from("gather 3 oak_log"),
                iterations: 1,
            })
        );
        assert_eq!(bench.world.count("oak_log"), 1);
    }

    #[test]
    fn self_made_item_is_circular() {
        let mut data = GameData::default();
        data.recipes.push(Recipe {
            result: String::from("widget"),
            count: 1,
            ingredients: BTreeMap::from([(String::from("widget"), 1)]),
            needs_table: false,
        });
        let mut bench = Bench::new(SimWorld::new(data));

        let id = bench.push(GatherItem::new("widget", 1, bench.planning.clone()));
        let (result, spawned) = bench.run(id, 5);

        assert_eq!(
            result,
            Err(GoalError::Circular {
                item: String::from("widget")
            })
        );
        assert!(spawned.is_empty());
    }

    #[test]
    fn forced_gather_ignores_what_is_held() {
        let world = SimWorld::vanilla();
        world.give("oak_log", 2);
        tree(&world, 3, 0);
        let mut bench = Bench::new(world);

        let held = bench.push(GatherItem::new("oak_log", 1, bench.planning.clone()));
        let (result, spawned) = bench.run(held, 5);
        assert_eq!(result, Ok(Outcome::Have(2)));
        assert!(spawned.is_empty());

        let forced = bench.push(GatherItem::new("oak_log", 1, bench.planning.clone()).forced());
        let (result, spawned) = bench.run(forced, 100);
        assert!(result.is_ok(), "{result:?}");
        assert!(spawned.iter().any(|l| l.starts_with("dig")), "{spawned:?}");
        assert_eq!(bench.world.count("oak_log"), 3);
    }

    #[test]
    fn tall_branch_gathers_its_raw_material_first() {
        let world = SimWorld::vanilla();
        tree(&world, 3, 0);
        tree(&world, -3, 2);
        world.set_block(BlockPos::new(6, 64, -6), "stone");
        let mut bench = Bench::new(world);

        let id = bench.push(GatherItem::new("cobblestone", 1, bench.planning.clone()));
        let (result, spawned) = bench.run(id, 2000);

        assert!(result.is_ok(), "{result:?}");
        assert_eq!(spawned.first().map(String::as_str), Some("gather 1 oak_log"));
        assert_eq!(bench.world.count("cobblestone"), 1);
    }

    #[test]
    fn no_room_in_the_tree_fails_too_deep() {
        let world = SimWorld::vanilla();
        world.set_block(BlockPos::new(2, 64, 0), "oak_log");
        let mut bench = Bench::new(world);

        let planning = bench.planning.clone();
        let id = bench.push(Nest::new(9, GatherItem::new("oak_planks", 4, planning)));
        let (result, _) = bench.run(id, 50);

        assert_eq!(
            result,
            Err(GoalError::TooDeep {
                limit: MAX_TREE_DEPTH
            })
        );
        assert!(bench.world.action_log().is_empty());
    }
}
