//! Craft an item.

use std::collections::BTreeSet;

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Step};
use quarry_types::{BlockPos, GoalId, Recipe};
use quarry_world::{GameData, Landmark, NavTarget};
use tracing::debug;

use super::{Action, GatherItem, NavigateTo, Perform, PlaceBlock, Planning, in_reach};

const MAX_TABLE_ATTEMPTS: u32 = 3;
const MAX_APPROACHES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Choose,
    Table,
    Ingredients,
    Approach,
    Craft,
    Finished,
}

/// Crafts `count` of an item.
///
/// Picks the cheapest usable recipe (or the one it was told to use), sets
/// up a crafting table when the recipe needs one, gathers every missing
/// ingredient, walks to the table and crafts. An ingredient that cannot be
/// obtained rejects the recipe and the next cheapest one is tried.
#[derive(Debug)]
pub struct CraftItem {
    item: String,
    count: u32,
    planning: Planning,
    fixed: Option<usize>,
    phase: Phase,
    recipe: Option<(usize, Recipe)>,
    rejected: BTreeSet<usize>,
    table: Option<BlockPos>,
    table_attempts: u32,
    approaches: u32,
    iterations: u32,
    child: Option<GoalResult>,
}

impl CraftItem {
    /// Craft `count` of `item` with whichever recipe is cheapest.
    pub fn new(item: impl Into<String>, count: u32, planning: Planning) -> Self {
        Self {
            item: item.into(),
            count,
            planning,
            fixed: None,
            phase: Phase::Choose,
            recipe: None,
            rejected: BTreeSet::new(),
            table: None,
            table_attempts: 0,
            approaches: 0,
            iterations: 0,
            child: None,
        }
    }

    /// Use the recipe at this index of `GameData::recipes_for`.
    #[must_use]
    pub const fn with_recipe(mut self, index: usize) -> Self {
        self.fixed = Some(index);
        self
    }

    fn no_recipe(&self, data: &GameData) -> GoalError {
        let recipes = data.recipes_for(&self.item);
        if recipes.is_empty() {
            GoalError::NoRecipe {
                item: self.item.clone(),
            }
        } else if recipes.iter().all(|r| r.is_self_referential()) {
            GoalError::Circular {
                item: self.item.clone(),
            }
        } else {
            GoalError::Unobtainable {
                item: self.item.clone(),
            }
        }
    }

    fn choose(&mut self, ctx: &GoalContext<'_>) -> Result<(), GoalError> {
        let data = ctx.view().data();
        let index = match self.fixed {
            Some(index) if !self.rejected.contains(&index) => Some(index),
            Some(_) => None,
            None => self
                .planning
                .estimator(ctx)
                .cheapest_recipe(
                    &self.item,
                    self.count,
                    self.planning.options,
                    self.planning.depth,
                    &self.planning.ancestors,
                    &self.rejected,
                )
                .map(|(index, _)| index),
        };
        let recipe = index.and_then(|i| {
            data.recipes_for(&self.item)
                .get(i)
                .map(|r| (i, (*r).clone()))
        });
        match recipe {
            Some((index, recipe)) if !recipe.is_self_referential() => {
                self.recipe = Some((index, recipe));
                Ok(())
            }
            _ => Err(self.no_recipe(data)),
        }
    }

    /// Drop the current recipe after an ingredient failed. Fails when
    /// the recipe was fixed by the caller.
    fn reject_recipe(&mut self, goal: GoalId, error: GoalError) -> Result<(), GoalError> {
        let Some((index, _)) = self.recipe.take() else {
            return Err(error);
        };
        if self.fixed.is_some() || error.is_structural() {
            return Err(error);
        }
        debug!(%goal, item = %self.item, recipe = index, %error, "recipe rejected");
        self.rejected.insert(index);
        self.phase = Phase::Choose;
        Ok(())
    }
}

impl Goal for CraftItem {
    fn label(&self) -> String {
        format!("craft {} {}", self.count, self.item)
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
                    let needs_table = self.recipe.as_ref().is_some_and(|(_, r)| r.needs_table);
                    self.phase = if needs_table {
                        Phase::Table
                    } else {
                        Phase::Ingredients
                    };
                }
                Phase::Table => {
                    if let Some(Err(e)) = result.take() {
                        return Step::fail(e);
                    }
                    let found = self.planning.estimator(ctx).locate(Landmark::CraftingTable);
                    if let Some(pos) = found {
                        ctx.memory_mut().remember_block("crafting_table", pos);
                        self.table = Some(pos);
                        self.phase = Phase::Ingredients;
                        continue;
                    }
                    if self.table_attempts >= MAX_TABLE_ATTEMPTS {
                        return Step::fail(GoalError::failed("couldn't set up a crafting table"));
                    }
                    self.table_attempts = self.table_attempts.saturating_add(1);
                    if ctx.view().count("crafting_table") > 0 {
                        ctx.spawn(PlaceBlock::new("crafting_table"));
                    } else {
                        ctx.spawn(GatherItem::new(
                            "crafting_table",
                            1,
                            self.planning.nested(&self.item),
                        ));
                    }
                    return Step::Pending;
                }
                Phase::Ingredients => {
                    if let Some(Err(e)) = result.take() {
                        match self.reject_recipe(ctx.id(), e) {
                            Ok(()) => continue,
                            Err(e) => return Step::fail(e),
                        }
                    }
                    let Some((_, recipe)) = &self.recipe else {
                        self.phase = Phase::Choose;
                        continue;
                    };
                    let crafts = recipe.crafts_for(self.count);
                    let view = ctx.view();
                    let missing = recipe
                        .totals(crafts)
                        .into_iter()
                        .find(|(ingredient, needed)| view.count(ingredient) < *needed);
                    let Some((ingredient, needed)) = missing else {
                        self.phase = Phase::Approach;
                        continue;
                    };
                    if self.iterations >= self.planning.config.max_iterations {
                        return Step::fail(GoalError::EndlessLoop {
                            label: self.label(),
                            iterations: self.iterations,
                        });
                    }
                    self.iterations = self.iterations.saturating_add(1);
                    let nested = self.planning.nested(&self.item);
                    ctx.spawn(GatherItem::new(ingredient, needed, nested));
                    return Step::Pending;
                }
                Phase::Approach => {
                    if let Some(Err(e)) = result.take() {
                        return Step::fail(e);
                    }
                    let needs_table = self.recipe.as_ref().is_some_and(|(_, r)| r.needs_table);
                    if !needs_table {
                        self.phase = Phase::Craft;
                        continue;
                    }
                    let Some(table) = self.table else {
                        self.phase = Phase::Table;
                        continue;
                    };
                    let still_there = ctx
                        .view()
                        .block_at(table)
                        .is_some_and(|b| Landmark::CraftingTable.matches(&b));
                    if !still_there {
                        ctx.memory_mut().forget(table);
                        self.table = None;
                        self.phase = Phase::Table;
                        continue;
                    }
                    if in_reach(ctx.view(), table, self.planning.reach()) {
                        self.phase = Phase::Craft;
                        continue;
                    }
                    if self.approaches >= MAX_APPROACHES {
                        return Step::fail(GoalError::failed("can't reach the crafting table"));
                    }
                    self.approaches = self.approaches.saturating_add(1);
                    ctx.spawn(NavigateTo::new(NavTarget::Block(table)));
                    return Step::Pending;
                }
                Phase::Craft => {
                    let Some((_, recipe)) = &self.recipe else {
                        self.phase = Phase::Choose;
                        continue;
                    };
                    let action = Action::Craft {
                        recipe: recipe.clone(),
                        times: recipe.crafts_for(self.count),
                        table: self.table.filter(|_| recipe.needs_table),
                    };
                    self.phase = Phase::Finished;
                    ctx.spawn(Perform::new(action));
                    return Step::Pending;
                }
                Phase::Finished => match result.take() {
                    Some(Ok(outcome)) => return Step::ok(outcome),
                    Some(Err(e)) => return Step::fail(e),
                    None => self.phase = Phase::Ingredients,
                },
            }
        }
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}
