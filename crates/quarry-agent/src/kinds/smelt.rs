//! Smelt an item in a furnace.

use std::collections::BTreeSet;

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Step};
use quarry_planner::FuelChoice;
use quarry_types::{BlockPos, GoalId, SmeltingRecipe};
use quarry_world::{Landmark, NavTarget};
use tracing::debug;

use super::{Action, GatherItem, NavigateTo, Perform, PlaceBlock, Planning, in_reach};

const MAX_FURNACE_ATTEMPTS: u32 = 3;
const MAX_APPROACHES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Choose,
    Furnace,
    Input,
    Fuel,
    Approach,
    Smelt,
    Finished,
}

/// Smelts `count` of an item: picks a furnace recipe and a fuel, sets up a
/// furnace, gathers input and fuel, then smelts.
#[derive(Debug)]
pub struct SmeltItem {
    item: String,
    count: u32,
    planning: Planning,
    fixed: Option<usize>,
    phase: Phase,
    recipe: Option<(usize, SmeltingRecipe)>,
    fuel: Option<FuelChoice>,
    rejected: BTreeSet<usize>,
    furnace: Option<BlockPos>,
    furnace_attempts: u32,
    approaches: u32,
    iterations: u32,
    child: Option<GoalResult>,
}

impl SmeltItem {
    /// Smelt `count` of `item` with whichever furnace recipe is cheapest.
    pub fn new(item: impl Into<String>, count: u32, planning: Planning) -> Self {
        Self {
            item: item.into(),
            count,
            planning,
            fixed: None,
            phase: Phase::Choose,
            recipe: None,
            fuel: None,
            rejected: BTreeSet::new(),
            furnace: None,
            furnace_attempts: 0,
            approaches: 0,
            iterations: 0,
            child: None,
        }
    }

    /// Use the furnace recipe at this index of `GameData::smelting_for`.
    #[must_use]
    pub const fn with_recipe(mut self, index: usize) -> Self {
        self.fixed = Some(index);
        self
    }

    fn choose(&mut self, ctx: &GoalContext<'_>) -> Result<(), GoalError> {
        let data = ctx.view().data();
        let recipes = data.smelting_for(&self.item);
        if recipes.is_empty() {
            return Err(GoalError::NoRecipe {
                item: self.item.clone(),
            });
        }
        let estimator = self.planning.estimator(ctx);
        let mut best: Option<(usize, f64)> = None;
        for (index, recipe) in recipes.iter().enumerate() {
            if self.rejected.contains(&index) || self.fixed.is_some_and(|f| f != index) {
                continue;
            }
            let cost = estimator.smelt_cost(
                recipe,
                self.count,
                self.planning.options,
                self.planning.depth,
                &self.planning.ancestors,
            );
            if cost.is_finite() && best.is_none_or(|(_, c)| cost < c) {
                best = Some((index, cost));
            }
        }
        let Some((index, _)) = best else {
            return Err(GoalError::Unobtainable {
                item: self.item.clone(),
            });
        };
        let child = self.planning.nested(&self.item);
        let fuel = estimator
            .cheapest_fuel(self.count, child.options, self.planning.depth, &child.ancestors)
            .ok_or_else(|| GoalError::failed(format!("no fuel to smelt {}", self.item)))?;
        let recipe = recipes.get(index).map(|r| (*r).clone());
        self.recipe = recipe.map(|r| (index, r));
        self.fuel = Some(fuel);
        Ok(())
    }

    /// Units of fuel to hold, including input when it burns itself.
    fn fuel_needed(&self) -> Option<(String, u32)> {
        let fuel = self.fuel.as_ref()?;
        let (_, recipe) = self.recipe.as_ref()?;
        let extra = if recipe.input == fuel.item {
            self.count
        } else {
            0
        };
        Some((fuel.item.clone(), fuel.units.saturating_add(extra)))
    }

    /// Trips the iteration guard once gathering has gone round too often.
    fn guard(&mut self) -> Option<Step> {
        if self.iterations >= self.planning.config.max_iterations {
            return Some(Step::fail(GoalError::EndlessLoop {
                label: self.label(),
                iterations: self.iterations,
            }));
        }
        self.iterations = self.iterations.saturating_add(1);
        None
    }

    fn input_needed(&self) -> Option<(String, u32)> {
        let (_, recipe) = self.recipe.as_ref()?;
        Some((recipe.input.clone(), self.count))
    }
}

impl Goal for SmeltItem {
    fn label(&self) -> String {
        format!("smelt {} {}", self.count, self.item)
    }

    #[allow(clippy::too_many_lines)]
    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        let mut result = self.child.take();

        loop {
            match self.phase {
                Phase::Choose => {
                    if let Err(e) = self.choose(ctx) {
                        return Step::fail(e);
                    }
                    self.phase = Phase::Furnace;
                }
                Phase::Furnace => {
                    if let Some(Err(e)) = result.take() {
                        return Step::fail(e);
                    }
                    let found = self.planning.estimator(ctx).locate(Landmark::Furnace);
                    if let Some(pos) = found {
                        ctx.memory_mut().remember_block("furnace", pos);
                        self.furnace = Some(pos);
                        self.phase = Phase::Input;
                        continue;
                    }
                    if self.furnace_attempts >= MAX_FURNACE_ATTEMPTS {
                        return Step::fail(GoalError::failed("couldn't set up a furnace"));
                    }
                    self.furnace_attempts = self.furnace_attempts.saturating_add(1);
                    if ctx.view().count("furnace") > 0 {
                        ctx.spawn(PlaceBlock::new("furnace"));
                    } else {
                        ctx.spawn(GatherItem::new("furnace", 1, self.planning.nested(&self.item)));
                    }
                    return Step::Pending;
                }
                Phase::Input => {
                    if let Some(Err(e)) = result.take() {
                        let Some((index, _)) = self
                            .recipe
                            .take()
                            .filter(|_| self.fixed.is_none() && !e.is_structural())
                        else {
                            return Step::fail(e);
                        };
                        debug!(
                            goal = %ctx.id(),
                            item = %self.item,
                            recipe = index,
                            error = %e,
                            "smelting recipe rejected"
                        );
                        self.rejected.insert(index);
                        self.phase = Phase::Choose;
                        continue;
                    }
                    let Some((input, needed)) = self.input_needed() else {
                        self.phase = Phase::Choose;
                        continue;
                    };
                    if ctx.view().count(&input) >= needed {
                        self.phase = Phase::Fuel;
                        continue;
                    }
                    if let Some(step) = self.guard() {
                        return step;
                    }
                    ctx.spawn(GatherItem::new(input, needed, self.planning.nested(&self.item)));
                    return Step::Pending;
                }
                Phase::Fuel => {
                    if let Some(Err(e)) = result.take() {
                        return Step::fail(e);
                    }
                    let Some((fuel, needed)) = self.fuel_needed() else {
                        self.phase = Phase::Choose;
                        continue;
                    };
                    if ctx.view().count(&fuel) >= needed {
                        self.phase = Phase::Approach;
                        continue;
                    }
                    if let Some(step) = self.guard() {
                        return step;
                    }
                    ctx.spawn(GatherItem::new(fuel, needed, self.planning.nested(&self.item)));
                    return Step::Pending;
                }
                Phase::Approach => {
                    if let Some(Err(e)) = result.take() {
                        return Step::fail(e);
                    }
                    let Some(furnace) = self.furnace else {
                        self.phase = Phase::Furnace;
                        continue;
                    };
                    let still_there = ctx
                        .view()
                        .block_at(furnace)
                        .is_some_and(|b| Landmark::Furnace.matches(&b));
                    if !still_there {
                        ctx.memory_mut().forget(furnace);
                        self.furnace = None;
                        self.phase = Phase::Furnace;
                        continue;
                    }
                    if in_reach(ctx.view(), furnace, self.planning.reach()) {
                        self.phase = Phase::Smelt;
                        continue;
                    }
                    if self.approaches >= MAX_APPROACHES {
                        return Step::fail(GoalError::failed("can't reach the furnace"));
                    }
                    self.approaches = self.approaches.saturating_add(1);
                    ctx.spawn(NavigateTo::new(NavTarget::Block(furnace)));
                    return Step::Pending;
                }
                Phase::Smelt => {
                    let (Some(furnace), Some((_, recipe)), Some(fuel)) =
                        (self.furnace, &self.recipe, &self.fuel)
                    else {
                        self.phase = Phase::Choose;
                        continue;
                    };
                    let action = Action::Smelt {
                        furnace,
                        recipe: recipe.clone(),
                        fuel: fuel.item.clone(),
                        count: self.count,
                    };
                    self.phase = Phase::Finished;
                    ctx.spawn(Perform::new(action));
                    return Step::Pending;
                }
                Phase::Finished => match result.take() {
                    Some(Ok(outcome)) => return Step::ok(outcome),
                    Some(Err(e)) => return Step::fail(e),
                    None => self.phase = Phase::Input,
                },
            }
        }
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quarry_goals::{MAX_TREE_DEPTH, Outcome};
    use quarry_planner::PlannerConfig;
    use quarry_world::{SimWorld, WorldView};

    use super::*;
    use crate::kinds::bench::{Bench, Nest};

    fn world_with_furnace() -> SimWorld {
        let world = SimWorld::vanilla();
        world.set_block(BlockPos::new(2, 64, 0), "furnace");
        world.fill(BlockPos::new(4, 64, 2), BlockPos::new(4, 67, 2), "oak_log");
        world
    }

    #[test]
    fn logs_burn_into_charcoal_at_a_known_furnace() {
        let world = world_with_furnace();
        world.give("oak_log", 2);
        let mut bench = Bench::new(world);

        let id = bench.push(SmeltItem::new("charcoal", 1, bench.planning.clone()));
        let (result, spawned) = bench.run(id, 40);

        assert_eq!(result, Ok(Outcome::Smelted(1)));
        assert!(spawned.iter().all(|l| !l.starts_with("gather")), "{spawned:?}");
        assert_eq!(bench.world.count("charcoal"), 1);
        assert_eq!(bench.world.count("oak_log"), 0);
    }

    #[test]
    fn iteration_guard_stops_input_and_fuel_gathering() {
        let config = PlannerConfig {
            max_iterations: 1,
            ..PlannerConfig::default()
        };
        let mut bench = Bench::with_config(world_with_furnace(), config);

        let id = bench.push(SmeltItem::new("charcoal", 1, bench.planning.clone()));
        let (result, spawned) = bench.run(id, 100);

        assert_eq!(
            result,
            Err(GoalError::EndlessLoop {
                label: String::from("smelt 1 charcoal"),
                iterations: 1,
            })
        );
        assert!(spawned.contains(&String::from("gather 1 oak_log")), "{spawned:?}");
        assert_eq!(bench.world.count("oak_log"), 1);
    }

    #[test]
    fn depth_guard_fails_instead_of_rejecting() {
        let mut bench = Bench::new(world_with_furnace());

        let planning = bench.planning.clone();
        let id = bench.push(Nest::new(9, SmeltItem::new("charcoal", 1, planning)));
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
