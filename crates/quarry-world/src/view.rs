//! Synchronous, read-only view of the world around the agent.

use std::collections::BTreeMap;

use quarry_types::{BlockPos, EntityId, EntitySnapshot, Vec3};

use crate::data::GameData;

/// Read-only queries over the current world state.
///
/// Every call reflects the latest state the provider has observed; goal
/// kinds re-query on each step instead of caching answers across ticks.
pub trait WorldView: Send + Sync {
    /// Game rules for this world.
    fn data(&self) -> &GameData;

    /// Current agent position.
    fn position(&self) -> Vec3;

    /// Current agent health (0-20).
    fn health(&self) -> f32;

    /// Current food level (0-20).
    fn food(&self) -> u32;

    /// Full inventory contents (item -> count).
    fn inventory(&self) -> BTreeMap<String, u32>;

    /// Number of `item` held.
    fn count(&self, item: &str) -> u32 {
        self.inventory().get(item).copied().unwrap_or(0)
    }

    /// Item currently in the main hand.
    fn held_item(&self) -> Option<String>;

    /// Block name at a position, or `None` for air.
    fn block_at(&self, pos: BlockPos) -> Option<String>;

    /// Nearest block within `max_distance` of the agent accepted by
    /// `matches`.
    fn find_block(
        &self,
        matches: &dyn Fn(BlockPos, &str) -> bool,
        max_distance: f64,
    ) -> Option<BlockPos>;

    /// Nearest entity within `max_distance` of the agent accepted by
    /// `matches`.
    fn nearest_entity(
        &self,
        matches: &dyn Fn(&EntitySnapshot) -> bool,
        max_distance: f64,
    ) -> Option<EntitySnapshot>;

    /// Look up an entity by id.
    fn entity(&self, id: EntityId) -> Option<EntitySnapshot>;

    /// Whether it is currently night.
    fn is_night(&self) -> bool;

    /// Distance from the agent to the centre of a block.
    fn distance_to_block(&self, pos: BlockPos) -> f64 {
        self.position().distance_to(pos.center())
    }
}
