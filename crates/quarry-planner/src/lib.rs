//! Cost-based acquisition planning for Quarry.
//!
//! Given an item the agent wants, the planner scores every way of getting
//! it (digging a block that drops it, killing a creature that drops it,
//! crafting it, smelting it) by recursively estimating the cost of the
//! tools and ingredients each way needs, and picks the cheapest.
//!
//! # Modules
//!
//! - [`config`] -- Planner limits and cost weights
//! - [`cost`] -- The recursive [`CostEstimator`]
//! - [`options`] -- Allowed acquisition methods
//! - [`plan`] -- Branches, plans and rejected alternatives

pub mod config;
pub mod cost;
pub mod options;
pub mod plan;

pub use config::PlannerConfig;
pub use cost::{CostEstimator, FuelChoice, station_item};
pub use options::AcquireOptions;
pub use plan::{Branch, Plan, Rejection, Rejections};
