//! Recursive cost estimation over the ways of obtaining an item.
//!
//! An estimate is a pure function of the current world snapshot, the item
//! and quantity wanted, the allowed [`AcquireOptions`], the recursion depth
//! and the set of ancestor items being obtained further up the chain. It
//! returns a non-negative cost or `f64::INFINITY` when no allowed way
//! exists.
//!
//! The alternatives are enumerated in a fixed order: dig, attack, craft
//! (per recipe), smelt (per furnace recipe). Ties go to the earlier one, so
//! taking an item from the environment wins over making it.
//!
//! Nothing is memoized; every call re-reads the world.

use std::collections::BTreeSet;

use quarry_types::{BlockInfo, BlockPos, EntityKind, EntitySnapshot, Recipe, SmeltingRecipe};
use quarry_world::{AgentMemory, Landmark, WorldView};
use tracing::{debug, trace};

use crate::config::PlannerConfig;
use crate::options::AcquireOptions;
use crate::plan::{Branch, Plan, Rejection, Rejections};

/// A fuel choice for a smelt.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelChoice {
    /// Fuel item.
    pub item: String,
    /// Units of fuel to burn.
    pub units: u32,
    /// Estimated cost of having that many units.
    pub cost: f64,
}

/// Cost estimator bound to one world snapshot.
pub struct CostEstimator<'a> {
    view: &'a dyn WorldView,
    memory: &'a AgentMemory,
    config: &'a PlannerConfig,
}

impl core::fmt::Debug for CostEstimator<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CostEstimator")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> CostEstimator<'a> {
    /// Estimator over `view`, consulting `memory` for known stations.
    pub const fn new(
        view: &'a dyn WorldView,
        memory: &'a AgentMemory,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            view,
            memory,
            config,
        }
    }

    /// The planner limits in use.
    pub const fn config(&self) -> &PlannerConfig {
        self.config
    }

    /// The world snapshot being estimated over.
    pub const fn view(&self) -> &'a dyn WorldView {
        self.view
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Cost of ending up with `count` of `item`.
    ///
    /// Zero if already held. Infinite beyond the depth budget, for an
    /// ancestor item, or when no allowed alternative exists.
    pub fn cost(
        &self,
        item: &str,
        count: u32,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
    ) -> f64 {
        if self.view.count(item) >= count {
            return 0.0;
        }
        if depth > self.config.max_depth || exclude.contains(item) {
            return f64::INFINITY;
        }
        let cost = self
            .candidates(item, count, options, depth, exclude, &Rejections::new())
            .iter()
            .map(|plan| plan.cost)
            .fold(f64::INFINITY, f64::min);
        trace!(item, count, depth, cost, "estimated");
        cost
    }

    /// The cheapest branch for acquiring `count` more of `item`, skipping
    /// rejected alternatives. Held items are not considered; callers decide
    /// whether they still need the item.
    pub fn plan(
        &self,
        item: &str,
        count: u32,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
        rejected: &Rejections,
    ) -> Option<Plan> {
        if depth > self.config.max_depth || exclude.contains(item) {
            return None;
        }
        let candidates = self.candidates(item, count, options, depth, exclude, rejected);
        let considered = candidates.len();
        let mut best: Option<Plan> = None;
        for candidate in candidates {
            if best.as_ref().is_none_or(|b| candidate.cost < b.cost) {
                best = Some(candidate);
            }
        }
        match &best {
            Some(plan) => debug!(
                item,
                count,
                depth,
                considered,
                branch = %plan.branch,
                cost = plan.cost,
                "planned acquisition"
            ),
            None => debug!(item, count, depth, rejected = rejected.len(), "no acquisition branch"),
        }
        best
    }

    /// Every finite alternative, in enumeration order.
    fn candidates(
        &self,
        item: &str,
        count: u32,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
        rejected: &Rejections,
    ) -> Vec<Plan> {
        let child = with_ancestor(exclude, item);
        let mut plans = Vec::new();
        if let Some(plan) = self.dig_candidate(item, options, depth, &child, rejected) {
            plans.push(plan);
        }
        if let Some(plan) = self.attack_candidate(item, options, rejected) {
            plans.push(plan);
        }
        for (index, recipe) in self.view.data().recipes_for(item).into_iter().enumerate() {
            if rejected.contains(Rejection::Recipe(index)) {
                continue;
            }
            let cost = self.recipe_cost(recipe, count, options, depth, exclude);
            if cost.is_finite() {
                plans.push(Plan {
                    branch: Branch::Craft { recipe: index },
                    cost,
                });
            }
        }
        for (index, recipe) in self.view.data().smelting_for(item).into_iter().enumerate() {
            if rejected.contains(Rejection::Smelting(index)) {
                continue;
            }
            let cost = self.smelt_cost(recipe, count, options, depth, exclude);
            if cost.is_finite() {
                plans.push(Plan {
                    branch: Branch::Smelt { recipe: index },
                    cost,
                });
            }
        }
        plans
    }

    // -----------------------------------------------------------------------
    // Environment
    // -----------------------------------------------------------------------

    fn dig_candidate(
        &self,
        item: &str,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
        rejected: &Rejections,
    ) -> Option<Plan> {
        if !options.dig {
            return None;
        }
        let data = self.view.data();
        let sources = data.blocks_dropping(item);
        if sources.is_empty() {
            return None;
        }
        let pos = self.view.find_block(
            &|pos: BlockPos, name: &str| {
                sources.contains(&name) && !rejected.contains(Rejection::Block(pos))
            },
            self.config.search_radius,
        )?;
        let block = self.view.block_at(pos)?;
        let info = data.block(&block)?;
        let tool = self.tool_cost(info, options, depth, exclude);
        let cost = self.view.distance_to_block(pos) + info.hardness + tool;
        cost.is_finite().then(|| Plan {
            branch: Branch::Dig { pos, block },
            cost,
        })
    }

    fn attack_candidate(
        &self,
        item: &str,
        options: AcquireOptions,
        rejected: &Rejections,
    ) -> Option<Plan> {
        if !options.attack {
            return None;
        }
        let sources = self.view.data().creatures_dropping(item);
        if sources.is_empty() {
            return None;
        }
        let target = self.view.nearest_entity(
            &|e: &EntitySnapshot| {
                e.kind != EntityKind::Drop
                    && e.kind != EntityKind::Player
                    && sources.contains(&e.name.as_str())
                    && !rejected.contains(Rejection::Entity(e.id))
            },
            self.config.search_radius,
        )?;
        let cost = self.view.position().distance_to(target.position) + self.config.combat_overhead;
        Some(Plan {
            branch: Branch::Attack {
                entity: target.id,
                creature: target.name,
            },
            cost,
        })
    }

    /// The harvest tool to use for `info`: a held one first, else the
    /// cheapest to obtain when tool gathering is allowed.
    pub fn cheapest_tool(
        &self,
        info: &BlockInfo,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
    ) -> Option<(String, f64)> {
        if let Some(held) = info
            .harvest_tools
            .iter()
            .find(|tool| self.view.count(tool) > 0)
        {
            return Some((held.clone(), 0.0));
        }
        if !options.gather_tool {
            return None;
        }
        let next = depth.saturating_add(1);
        let mut best: Option<(String, f64)> = None;
        for tool in &info.harvest_tools {
            let cost = self.cost(tool, 1, options, next, exclude);
            if cost.is_finite() && best.as_ref().is_none_or(|(_, c)| cost < *c) {
                best = Some((tool.clone(), cost));
            }
        }
        best
    }

    fn tool_cost(
        &self,
        info: &BlockInfo,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
    ) -> f64 {
        if !info.requires_tool() {
            return 0.0;
        }
        self.cheapest_tool(info, options, depth, exclude)
            .map_or(f64::INFINITY, |(_, cost)| cost)
    }

    // -----------------------------------------------------------------------
    // Crafting and smelting
    // -----------------------------------------------------------------------

    /// Cost of crafting `count` of the recipe's result. `exclude` holds the
    /// ancestors of the result, not the result itself.
    pub fn recipe_cost(
        &self,
        recipe: &Recipe,
        count: u32,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
    ) -> f64 {
        if !options.craft || recipe.is_self_referential() {
            return f64::INFINITY;
        }
        let crafts = recipe.crafts_for(count);
        if crafts == 0 {
            return f64::INFINITY;
        }
        let child = with_ancestor(exclude, &recipe.result);
        let next = depth.saturating_add(1);
        let mut total = self.config.craft_overhead;
        for (ingredient, needed) in recipe.totals(crafts) {
            total += self.cost(&ingredient, needed, options, next, &child);
            if !total.is_finite() {
                return f64::INFINITY;
            }
        }
        if recipe.needs_table {
            total += self.station_cost(Landmark::CraftingTable, options, depth, &child);
        }
        total
    }

    /// The cheapest recipe for `count` of `item` that is not rejected.
    /// Returns its index in `GameData::recipes_for` and its cost.
    pub fn cheapest_recipe(
        &self,
        item: &str,
        count: u32,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
        rejected: &BTreeSet<usize>,
    ) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, recipe) in self.view.data().recipes_for(item).into_iter().enumerate() {
            if rejected.contains(&index) {
                continue;
            }
            let cost = self.recipe_cost(recipe, count, options, depth, exclude);
            if cost.is_finite() && best.is_none_or(|(_, c)| cost < c) {
                best = Some((index, cost));
            }
        }
        best
    }

    /// Cost of smelting `count` of the recipe's output.
    pub fn smelt_cost(
        &self,
        recipe: &SmeltingRecipe,
        count: u32,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
    ) -> f64 {
        if !options.smelt {
            return f64::INFINITY;
        }
        let child = with_ancestor(exclude, &recipe.output);
        let input = self.cost(&recipe.input, count, options, depth.saturating_add(1), &child);
        if !input.is_finite() {
            return f64::INFINITY;
        }
        let Some(fuel) = self.cheapest_fuel(count, options, depth, &child) else {
            return f64::INFINITY;
        };
        input
            + fuel.cost
            + self.station_cost(Landmark::Furnace, options, depth, &child)
            + self.config.smelt_overhead
    }

    /// The cheapest fuel for smelting `count` items.
    pub fn cheapest_fuel(
        &self,
        count: u32,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
    ) -> Option<FuelChoice> {
        let data = self.view.data();
        let next = depth.saturating_add(1);
        let mut best: Option<FuelChoice> = None;
        for (item, _) in data.fuels_by_value() {
            let Some(units) = data.fuel_needed(item, count) else {
                continue;
            };
            let cost = self.cost(item, units, options, next, exclude);
            if cost.is_finite() && best.as_ref().is_none_or(|b| cost < b.cost) {
                best = Some(FuelChoice {
                    item: item.to_owned(),
                    units,
                    cost,
                });
            }
        }
        best
    }

    // -----------------------------------------------------------------------
    // Stations
    // -----------------------------------------------------------------------

    /// Nearest confirmed station of `kind` within the search radius:
    /// remembered locations first, then a world search.
    pub fn locate(&self, kind: Landmark) -> Option<BlockPos> {
        let radius = self.config.search_radius;
        let remembered = self
            .memory
            .nearest(kind, self.view.position())
            .into_iter()
            .filter(|pos| self.view.distance_to_block(*pos) <= radius)
            .find(|pos| self.view.block_at(*pos).is_some_and(|b| kind.matches(&b)));
        remembered.or_else(|| {
            self.view
                .find_block(&|_: BlockPos, name: &str| kind.matches(name), radius)
        })
    }

    /// Cost of having a station of `kind` to work at: walk to a known one,
    /// place a held one, or obtain one and place it.
    pub fn station_cost(
        &self,
        kind: Landmark,
        options: AcquireOptions,
        depth: usize,
        exclude: &BTreeSet<String>,
    ) -> f64 {
        if let Some(pos) = self.locate(kind) {
            return self.view.distance_to_block(pos);
        }
        let Some(item) = station_item(kind) else {
            return f64::INFINITY;
        };
        if self.view.count(item) > 0 {
            return self.config.place_overhead;
        }
        self.cost(item, 1, options, depth.saturating_add(1), exclude) + self.config.place_overhead
    }
}

/// The item that places a station of `kind`, for stations the planner can
/// make.
pub const fn station_item(kind: Landmark) -> Option<&'static str> {
    match kind {
        Landmark::CraftingTable => Some("crafting_table"),
        Landmark::Furnace => Some("furnace"),
        Landmark::Chest => Some("chest"),
        Landmark::Bed => None,
    }
}

fn with_ancestor(exclude: &BTreeSet<String>, item: &str) -> BTreeSet<String> {
    let mut child = exclude.clone();
    child.insert(item.to_owned());
    child
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use quarry_types::Vec3;
    use quarry_world::{GameData, SimWorld};

    use super::*;

    fn with_estimator<R>(
        world: &SimWorld,
        memory: &AgentMemory,
        f: impl FnOnce(&CostEstimator<'_>) -> R,
    ) -> R {
        let config = PlannerConfig::default();
        let estimator = CostEstimator::new(world, memory, &config);
        f(&estimator)
    }

    fn cost_of(world: &SimWorld, item: &str, count: u32, depth: usize) -> f64 {
        with_estimator(world, &AgentMemory::default(), |e| {
            e.cost(item, count, AcquireOptions::ALL, depth, &BTreeSet::new())
        })
    }

    fn plan_of(world: &SimWorld, item: &str, rejected: &Rejections) -> Option<Plan> {
        with_estimator(world, &AgentMemory::default(), |e| {
            e.plan(item, 1, AcquireOptions::ALL, 0, &BTreeSet::new(), rejected)
        })
    }

    #[test]
    fn held_items_cost_nothing() {
        let world = SimWorld::vanilla();
        world.give("stick", 3);
        assert!(cost_of(&world, "stick", 1, 0).abs() < f64::EPSILON);
        assert!(cost_of(&world, "stick", 3, 0).abs() < f64::EPSILON);
        assert!(cost_of(&world, "stick", 4, 0).is_infinite());
    }

    #[test]
    fn items_without_a_source_are_infinite() {
        let world = SimWorld::vanilla();
        assert!(cost_of(&world, "diamond", 1, 0).is_infinite());
        assert!(plan_of(&world, "diamond", &Rejections::new()).is_none());
    }

    #[test]
    fn self_referential_recipes_are_never_chosen() {
        let mut data = GameData::default();
        data.recipes.push(Recipe {
            result: String::from("widget"),
            count: 1,
            ingredients: BTreeMap::from([(String::from("widget"), 1)]),
            needs_table: false,
        });
        let world = SimWorld::new(data);
        assert!(cost_of(&world, "widget", 1, 0).is_infinite());
        assert!(plan_of(&world, "widget", &Rejections::new()).is_none());
    }

    #[test]
    fn depth_budget_makes_deep_chains_infinite() {
        let world = SimWorld::vanilla();
        world.set_block(BlockPos::new(3, 64, 0), "oak_log");

        let shallow = cost_of(&world, "wooden_pickaxe", 1, 0);
        assert!(shallow.is_finite());
        assert!(cost_of(&world, "wooden_pickaxe", 1, 20).is_infinite());
        assert!(cost_of(&world, "wooden_pickaxe", 1, 21).is_infinite());

        let costs: Vec<f64> = (0..=21)
            .map(|d| cost_of(&world, "wooden_pickaxe", 1, d))
            .collect();
        for pair in costs.windows(2) {
            assert!(pair.first() <= pair.get(1), "cost decreased with depth: {costs:?}");
        }
    }

    #[test]
    fn held_check_precedes_the_depth_budget() {
        let world = SimWorld::vanilla();
        world.give("oak_planks", 1);
        assert!(cost_of(&world, "oak_planks", 1, 50).abs() < f64::EPSILON);
    }

    #[test]
    fn environment_is_preferred_when_present() {
        let world = SimWorld::vanilla();
        let log = BlockPos::new(3, 64, 0);
        world.set_block(log, "oak_log");
        let plan = plan_of(&world, "oak_log", &Rejections::new()).unwrap();
        assert_eq!(
            plan.branch,
            Branch::Dig {
                pos: log,
                block: String::from("oak_log")
            }
        );
    }

    #[test]
    fn creatures_are_looted_for_their_drops() {
        let world = SimWorld::vanilla();
        let sheep = world.spawn_creature("sheep", Vec3::new(5.0, 64.0, 0.5));
        let plan = plan_of(&world, "mutton", &Rejections::new()).unwrap();
        assert_eq!(plan.branch.rejection(), Rejection::Entity(sheep));
        assert_eq!(plan.branch.method(), "attack");
    }

    #[test]
    fn held_ingredients_make_crafting_cheapest() {
        let world = SimWorld::vanilla();
        world.give("oak_log", 1);
        let plan = plan_of(&world, "oak_planks", &Rejections::new()).unwrap();
        assert_eq!(plan.branch, Branch::Craft { recipe: 0 });
    }

    #[test]
    fn rejected_alternatives_are_skipped() {
        let world = SimWorld::vanilla();
        let near = BlockPos::new(2, 64, 0);
        let far = BlockPos::new(8, 64, 0);
        world.set_block(near, "oak_log");
        world.set_block(far, "oak_log");

        let mut rejected = Rejections::new();
        let first = plan_of(&world, "oak_log", &rejected).unwrap();
        assert_eq!(first.branch.rejection(), Rejection::Block(near));

        assert!(rejected.reject(first.branch.rejection()));
        let second = plan_of(&world, "oak_log", &rejected).unwrap();
        assert_eq!(second.branch.rejection(), Rejection::Block(far));

        rejected.reject(second.branch.rejection());
        assert!(plan_of(&world, "oak_log", &rejected).is_none());
    }

    #[test]
    fn missing_harvest_tool_blocks_digging_unless_it_can_be_gathered() {
        let world = SimWorld::vanilla();
        world.set_block(BlockPos::new(2, 64, 0), "iron_ore");
        let no_gathering = with_estimator(&world, &AgentMemory::default(), |e| {
            e.cost(
                "raw_iron",
                1,
                AcquireOptions::HELD_TOOLS_ONLY,
                0,
                &BTreeSet::new(),
            )
        });
        assert!(no_gathering.is_infinite());

        world.give("stone_pickaxe", 1);
        assert!(cost_of(&world, "raw_iron", 1, 0).is_finite());
        let tool = with_estimator(&world, &AgentMemory::default(), |e| {
            let info = e.view.data().block("iron_ore").unwrap().clone();
            e.cheapest_tool(&info, AcquireOptions::HELD_TOOLS_ONLY, 0, &BTreeSet::new())
        });
        assert_eq!(tool.map(|(name, _)| name), Some(String::from("stone_pickaxe")));
    }

    #[test]
    fn stale_memory_is_ignored_when_locating_stations() {
        let world = SimWorld::vanilla();
        let pos = BlockPos::new(2, 64, 0);
        let mut memory = AgentMemory::default();
        memory.remember_block("crafting_table", pos);
        assert_eq!(
            with_estimator(&world, &memory, |e| e.locate(Landmark::CraftingTable)),
            None
        );

        world.set_block(pos, "crafting_table");
        assert_eq!(
            with_estimator(&world, &memory, |e| e.locate(Landmark::CraftingTable)),
            Some(pos)
        );
    }

    #[test]
    fn smelting_needs_fuel() {
        let world = SimWorld::vanilla();
        world.give("raw_iron", 1);
        world.set_block(BlockPos::new(2, 64, 0), "furnace");
        assert!(plan_of(&world, "iron_ingot", &Rejections::new()).is_none());

        world.give("coal", 1);
        let plan = plan_of(&world, "iron_ingot", &Rejections::new()).unwrap();
        assert_eq!(plan.branch, Branch::Smelt { recipe: 0 });
    }
}
