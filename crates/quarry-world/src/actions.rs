//! Action executor contract.
//!
//! Future-returning primitives perform one in-game action each. The three
//! synchronous methods release external resources and are what cancel
//! hooks call; they never fail.

use futures::future::BoxFuture;
use quarry_types::{BlockPos, EntityId, EquipSlot, Recipe, SmeltingRecipe};

use crate::error::ActionError;

/// Future resolving when an action completes.
pub type ActionFuture = BoxFuture<'static, Result<(), ActionError>>;

/// Executes in-game actions on behalf of the agent.
pub trait ActionExecutor: Send + Sync {
    /// Move `item` from the inventory into `slot`.
    fn equip(&self, item: &str, slot: EquipSlot) -> ActionFuture;

    /// Break the block at `pos` with the held item.
    fn dig(&self, pos: BlockPos) -> ActionFuture;

    /// Place `item` as a block at `pos`.
    fn place(&self, item: &str, pos: BlockPos) -> ActionFuture;

    /// Run `recipe` `times` times, at the crafting table at `table` when the
    /// recipe needs one.
    fn craft(&self, recipe: &Recipe, times: u32, table: Option<BlockPos>) -> ActionFuture;

    /// Smelt `count` items with the furnace at `furnace`, burning `fuel`.
    fn smelt(
        &self,
        furnace: BlockPos,
        recipe: &SmeltingRecipe,
        fuel: &str,
        count: u32,
    ) -> ActionFuture;

    /// Swing at an entity once.
    fn attack(&self, target: EntityId) -> ActionFuture;

    /// Eat the held item.
    fn consume(&self) -> ActionFuture;

    /// Sleep in the bed at `bed` until morning.
    fn sleep(&self, bed: BlockPos) -> ActionFuture;

    /// Throw `count` of `item` on the ground in front of the agent.
    fn toss(&self, item: &str, count: u32) -> ActionFuture;

    /// Open the container at `pos`.
    fn open_container(&self, pos: BlockPos) -> ActionFuture;

    /// Move `count` of `item` into the open container.
    fn deposit(&self, item: &str, count: u32) -> ActionFuture;

    /// Close whatever container is open.
    fn close_container(&self);

    /// Leave the bed.
    fn wake(&self);

    /// Abort a dig in progress.
    fn stop_digging(&self);
}
