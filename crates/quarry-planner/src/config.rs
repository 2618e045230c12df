//! Planner limits and cost weights.
//!
//! Mirrors the `planner:` section of `quarry-config.yaml`. Every field has
//! a default, so an absent or partial section is valid.

use serde::Deserialize;

/// Limits and weights used by the cost estimator and the gather goal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlannerConfig {
    /// Recursion budget for cost estimation; deeper estimates are infinite.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// How far from the agent to look for blocks, creatures and stations.
    #[serde(default = "default_search_radius")]
    pub search_radius: f64,

    /// Fixed cost added to killing a creature for its drops.
    #[serde(default = "default_combat_overhead")]
    pub combat_overhead: f64,

    /// Fixed cost added to every craft.
    #[serde(default = "default_craft_overhead")]
    pub craft_overhead: f64,

    /// Fixed cost added to every smelt.
    #[serde(default = "default_smelt_overhead")]
    pub smelt_overhead: f64,

    /// Fixed cost of placing a station the agent already holds.
    #[serde(default = "default_place_overhead")]
    pub place_overhead: f64,

    /// Distance within which the agent can act on a block or entity.
    #[serde(default = "default_reach")]
    pub reach: f64,

    /// Iteration guard of the gather goal.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            search_radius: default_search_radius(),
            combat_overhead: default_combat_overhead(),
            craft_overhead: default_craft_overhead(),
            smelt_overhead: default_smelt_overhead(),
            place_overhead: default_place_overhead(),
            reach: default_reach(),
            max_iterations: default_max_iterations(),
        }
    }
}

const fn default_max_depth() -> usize {
    20
}

const fn default_search_radius() -> f64 {
    64.0
}

const fn default_combat_overhead() -> f64 {
    10.0
}

const fn default_craft_overhead() -> f64 {
    1.0
}

const fn default_smelt_overhead() -> f64 {
    5.0
}

const fn default_place_overhead() -> f64 {
    2.0
}

const fn default_reach() -> f64 {
    4.5
}

const fn default_max_iterations() -> u32 {
    32
}
