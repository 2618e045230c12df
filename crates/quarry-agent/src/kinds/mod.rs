//! Concrete goal kinds.
//!
//! Every kind is an explicit state machine over [`Goal::step`]: it either
//! spawns children and returns [`Step::Pending`], suspends on one external
//! operation, or finishes. Composite kinds receive each child's result in
//! [`Goal::child_finished`] and act on it at their next step.
//!
//! Primitive kinds: [`Perform`] (one action-executor call),
//! [`NavigateTo`], [`Wait`] and [`Wander`]. Everything else decomposes into
//! those.
//!
//! [`Goal::step`]: quarry_goals::Goal::step
//! [`Goal::child_finished`]: quarry_goals::Goal::child_finished
//! [`Step::Pending`]: quarry_goals::Step::Pending

use std::collections::BTreeSet;
use std::sync::Arc;

use quarry_goals::GoalContext;
use quarry_planner::{AcquireOptions, CostEstimator, PlannerConfig};
use quarry_types::BlockPos;
use quarry_world::WorldView;

pub mod attack;
#[cfg(test)]
mod bench;
pub mod collect;
pub mod craft;
pub mod deposit;
pub mod dig;
pub mod eat;
pub mod flee;
pub mod gather;
pub mod give;
pub mod harvest;
mod levels;
pub mod navigate;
pub mod perform;
pub mod place;
pub mod plant;
pub mod sleep;
pub mod smelt;
pub mod wait;
pub mod wander;

pub use attack::AttackEntity;
pub use collect::CollectDrops;
pub use craft::CraftItem;
pub use deposit::DepositItems;
pub use dig::DigBlock;
pub use eat::Eat;
pub use flee::Flee;
pub use gather::GatherItem;
pub use give::GiveItem;
pub use harvest::HarvestCrops;
pub use navigate::NavigateTo;
pub use perform::{Action, Perform};
pub use place::PlaceBlock;
pub use plant::PlantSapling;
pub use sleep::Sleep;
pub use smelt::SmeltItem;
pub use wait::Wait;
pub use wander::Wander;

/// Radius around a broken block or a kill in which drops are collected.
pub const DROP_RADIUS: f64 = 3.0;

/// Planning state a goal hands down to the goals it spawns.
#[derive(Debug, Clone, PartialEq)]
pub struct Planning {
    /// Planner limits and weights.
    pub config: Arc<PlannerConfig>,
    /// Allowed acquisition methods.
    pub options: AcquireOptions,
    /// Planning depth of the goal holding this.
    pub depth: usize,
    /// Items being obtained further up the chain.
    pub ancestors: BTreeSet<String>,
}

impl Planning {
    /// Top-level planning with every method allowed.
    pub fn root(config: Arc<PlannerConfig>) -> Self {
        Self {
            config,
            options: AcquireOptions::ALL,
            depth: 0,
            ancestors: BTreeSet::new(),
        }
    }

    /// Same planning with different options.
    #[must_use]
    pub fn with_options(mut self, options: AcquireOptions) -> Self {
        self.options = options;
        self
    }

    /// Same depth, with `item` marked as being obtained further up.
    #[must_use]
    pub fn excluding(&self, item: &str) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.insert(item.to_owned());
        Self {
            config: Arc::clone(&self.config),
            options: self.options,
            depth: self.depth,
            ancestors,
        }
    }

    /// One planning level further down.
    #[must_use]
    pub fn deeper(&self) -> Self {
        Self {
            depth: self.depth.saturating_add(1),
            ..self.clone()
        }
    }

    /// Planning for a sub-goal obtaining something on behalf of `item`.
    #[must_use]
    pub fn nested(&self, item: &str) -> Self {
        let mut nested = self.excluding(item);
        nested.depth = nested.depth.saturating_add(1);
        nested
    }

    /// Interaction reach.
    pub fn reach(&self) -> f64 {
        self.config.reach
    }

    /// Estimator over the world as the goal currently sees it.
    pub fn estimator<'a>(&'a self, ctx: &'a GoalContext<'_>) -> CostEstimator<'a> {
        CostEstimator::new(ctx.view(), ctx.memory(), &self.config)
    }
}

/// Whether the agent stands close enough to work a block.
pub(crate) fn in_reach(view: &dyn WorldView, pos: BlockPos, reach: f64) -> bool {
    view.distance_to_block(pos) <= reach
}

/// The first inventory item accepted by `matches`.
pub(crate) fn held_matching(view: &dyn WorldView, matches: impl Fn(&str) -> bool) -> Option<String> {
    view.inventory()
        .into_iter()
        .find(|(item, count)| *count > 0 && matches(item.as_str()))
        .map(|(item, _)| item)
}

/// Sum of every stack in the inventory.
pub(crate) fn inventory_total(view: &dyn WorldView) -> u32 {
    view.inventory()
        .values()
        .fold(0_u32, |acc, n| acc.saturating_add(*n))
}
