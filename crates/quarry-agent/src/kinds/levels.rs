//! How many goal-tree levels an acquisition occupies.
//!
//! The scheduler refuses goals below [`MAX_TREE_DEPTH`], while the cost
//! estimator counts planning levels. One planning level turns into two or
//! more tree levels (the gather, then the dig, craft or smelt it runs), so
//! a gather measures its chosen branch against the levels left under it
//! before spawning anything.

use quarry_goals::MAX_TREE_DEPTH;
use quarry_planner::{Branch, CostEstimator, Rejections, station_item};
use quarry_world::Landmark;

use super::Planning;

/// Levels under a dig or an attack: drop collection, then the walk to a drop.
const HARVEST_LEVELS: usize = 2;
/// Levels under a placement: the walk into reach or the place itself.
const PLACE_LEVELS: usize = 2;
/// Levels under a single walk or action.
const STEP_LEVELS: usize = 1;

/// The tallest chain below a gather.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Height {
    /// Tree levels from the gather to its deepest goal, the gather included.
    pub levels: usize,
    /// Item and count gathered at the bottom of the tallest chain.
    pub deepest: (String, u32),
}

/// Tree levels available to a goal at `depth` and everything below it.
pub(crate) const fn levels_left(depth: usize) -> usize {
    MAX_TREE_DEPTH.saturating_add(1).saturating_sub(depth)
}

/// Height of a gather for `count` of `item`, or `None` when enough is
/// already held or nothing can be planned.
pub(crate) fn gather_height(
    est: &CostEstimator<'_>,
    item: &str,
    count: u32,
    planning: &Planning,
) -> Option<Height> {
    let missing = count.saturating_sub(est.view().count(item));
    if missing == 0 {
        return None;
    }
    let plan = est.plan(
        item,
        missing,
        planning.options,
        planning.depth,
        &planning.ancestors,
        &Rejections::new(),
    )?;
    Some(branch_height(est, item, missing, &plan.branch, planning))
}

/// Height of a gather for `count` of `item` that runs `branch`.
pub(crate) fn branch_height(
    est: &CostEstimator<'_>,
    item: &str,
    count: u32,
    branch: &Branch,
    planning: &Planning,
) -> Height {
    let (base, below) = match branch {
        Branch::Dig { block, .. } => (HARVEST_LEVELS, tool_height(est, item, block, planning)),
        Branch::Attack { .. } => (HARVEST_LEVELS, None),
        Branch::Craft { recipe } => craft_height(est, item, count, *recipe, planning),
        Branch::Smelt { recipe } => smelt_height(est, item, count, *recipe, planning),
    };
    let under = below.as_ref().map_or(base, |b| b.levels.max(base));
    Height {
        levels: under.saturating_add(2),
        deepest: below.map_or_else(|| (item.to_owned(), count), |b| b.deepest),
    }
}

fn tallest(best: Option<Height>, next: Option<Height>) -> Option<Height> {
    match (best, next) {
        (Some(b), Some(n)) if n.levels > b.levels => Some(n),
        (best, next) => best.or(next),
    }
}

fn tool_height(
    est: &CostEstimator<'_>,
    item: &str,
    block: &str,
    planning: &Planning,
) -> Option<Height> {
    let info = est.view().data().block(block)?;
    if !info.requires_tool() {
        return None;
    }
    let dig = planning.excluding(item);
    let (tool, _) = est.cheapest_tool(info, dig.options, dig.depth, &dig.ancestors)?;
    gather_height(est, &tool, 1, &dig.deeper())
}

fn craft_height(
    est: &CostEstimator<'_>,
    item: &str,
    count: u32,
    index: usize,
    planning: &Planning,
) -> (usize, Option<Height>) {
    let recipes = est.view().data().recipes_for(item);
    let Some(recipe) = recipes.get(index) else {
        return (STEP_LEVELS, None);
    };
    let nested = planning.nested(item);
    let mut below = None;
    for (ingredient, needed) in recipe.totals(recipe.crafts_for(count)) {
        below = tallest(below, gather_height(est, &ingredient, needed, &nested));
    }
    if recipe.needs_table {
        station_height(est, Landmark::CraftingTable, &nested, below)
    } else {
        (STEP_LEVELS, below)
    }
}

fn smelt_height(
    est: &CostEstimator<'_>,
    item: &str,
    count: u32,
    index: usize,
    planning: &Planning,
) -> (usize, Option<Height>) {
    let recipes = est.view().data().smelting_for(item);
    let Some(recipe) = recipes.get(index) else {
        return (STEP_LEVELS, None);
    };
    let nested = planning.nested(item);
    let mut below = gather_height(est, &recipe.input, count, &nested);
    if let Some(fuel) = est.cheapest_fuel(count, nested.options, planning.depth, &nested.ancestors)
    {
        let extra = if fuel.item == recipe.input { count } else { 0 };
        let units = fuel.units.saturating_add(extra);
        below = tallest(below, gather_height(est, &fuel.item, units, &nested));
    }
    station_height(est, Landmark::Furnace, &nested, below)
}

/// A known station adds nothing; a held one is placed; otherwise it is
/// gathered first.
fn station_height(
    est: &CostEstimator<'_>,
    kind: Landmark,
    nested: &Planning,
    below: Option<Height>,
) -> (usize, Option<Height>) {
    if est.locate(kind).is_some() {
        return (STEP_LEVELS, below);
    }
    let Some(item) = station_item(kind) else {
        return (STEP_LEVELS, below);
    };
    if est.view().count(item) > 0 {
        return (PLACE_LEVELS, below);
    }
    (PLACE_LEVELS, tallest(below, gather_height(est, item, 1, nested)))
}
