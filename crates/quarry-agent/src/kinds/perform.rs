//! One action-executor call as a goal.

use futures::FutureExt;
use quarry_goals::{Goal, GoalContext, GoalError, Outcome, Step};
use quarry_types::{BlockPos, EntityId, EquipSlot, Recipe, SmeltingRecipe};
use quarry_world::ActionExecutor;

/// A single in-game action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Put an item in a slot.
    Equip {
        /// Item to equip.
        item: String,
        /// Where.
        slot: EquipSlot,
    },
    /// Break a block.
    Dig {
        /// The block.
        pos: BlockPos,
    },
    /// Place an item as a block.
    Place {
        /// Item to place.
        item: String,
        /// Where.
        pos: BlockPos,
    },
    /// Craft a recipe.
    Craft {
        /// The recipe.
        recipe: Recipe,
        /// How many times.
        times: u32,
        /// Crafting table, when the recipe needs one.
        table: Option<BlockPos>,
    },
    /// Smelt items in a furnace.
    Smelt {
        /// The furnace.
        furnace: BlockPos,
        /// The smelting recipe.
        recipe: SmeltingRecipe,
        /// Fuel item.
        fuel: String,
        /// Items to smelt.
        count: u32,
    },
    /// Swing at an entity once.
    Attack {
        /// The entity.
        target: EntityId,
    },
    /// Eat the held item.
    Consume,
    /// Sleep in a bed.
    Sleep {
        /// The bed.
        bed: BlockPos,
    },
    /// Throw items on the ground.
    Toss {
        /// Item to throw.
        item: String,
        /// How many.
        count: u32,
    },
    /// Open a container.
    OpenContainer {
        /// The container.
        pos: BlockPos,
    },
    /// Move items into the open container.
    Deposit {
        /// Item to store.
        item: String,
        /// How many.
        count: u32,
    },
}

impl Action {
    fn start(&self, actions: &dyn ActionExecutor) -> quarry_world::ActionFuture {
        match self {
            Self::Equip { item, slot } => actions.equip(item, *slot),
            Self::Dig { pos } => actions.dig(*pos),
            Self::Place { item, pos } => actions.place(item, *pos),
            Self::Craft {
                recipe,
                times,
                table,
            } => actions.craft(recipe, *times, *table),
            Self::Smelt {
                furnace,
                recipe,
                fuel,
                count,
            } => actions.smelt(*furnace, recipe, fuel, *count),
            Self::Attack { target } => actions.attack(*target),
            Self::Consume => actions.consume(),
            Self::Sleep { bed } => actions.sleep(*bed),
            Self::Toss { item, count } => actions.toss(item, *count),
            Self::OpenContainer { pos } => actions.open_container(*pos),
            Self::Deposit { item, count } => actions.deposit(item, *count),
        }
    }

    /// What a successful run of this action reports.
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Dig { pos } => Outcome::Dug(*pos),
            Self::Place { pos, .. } => Outcome::Placed(*pos),
            Self::Craft { recipe, times, .. } => {
                Outcome::Crafted(recipe.count.saturating_mul(*times))
            }
            Self::Smelt { count, .. } => Outcome::Smelted(*count),
            Self::Sleep { .. } => Outcome::Slept,
            Self::Toss { count, .. } => Outcome::Given(*count),
            Self::Deposit { count, .. } => Outcome::Deposited(*count),
            Self::Equip { .. } | Self::Attack { .. } | Self::Consume | Self::OpenContainer { .. } => {
                Outcome::Done
            }
        }
    }

    /// Release whatever this action holds on to.
    fn release(&self, actions: &dyn ActionExecutor) {
        match self {
            Self::Dig { .. } => actions.stop_digging(),
            Self::Sleep { .. } => actions.wake(),
            Self::OpenContainer { .. } | Self::Deposit { .. } => actions.close_container(),
            _ => {}
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Equip { item, .. } => write!(f, "equip {item}"),
            Self::Dig { pos } => write!(f, "dig {pos}"),
            Self::Place { item, pos } => write!(f, "place {item} at {pos}"),
            Self::Craft { recipe, times, .. } => write!(f, "craft {} x{times}", recipe.result),
            Self::Smelt { recipe, count, .. } => write!(f, "smelt {} x{count}", recipe.input),
            Self::Attack { target } => write!(f, "swing at {target}"),
            Self::Consume => f.write_str("eat"),
            Self::Sleep { bed } => write!(f, "sleep at {bed}"),
            Self::Toss { item, count } => write!(f, "toss {item} x{count}"),
            Self::OpenContainer { pos } => write!(f, "open {pos}"),
            Self::Deposit { item, count } => write!(f, "deposit {item} x{count}"),
        }
    }
}

/// Runs one [`Action`] and resolves when it settles.
#[derive(Debug)]
pub struct Perform {
    action: Action,
}

impl Perform {
    /// Goal performing `action`.
    pub const fn new(action: Action) -> Self {
        Self { action }
    }
}

impl Goal for Perform {
    fn label(&self) -> String {
        self.action.to_string()
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        let outcome = self.action.outcome();
        let future = self.action.start(ctx.actions());
        Step::Suspended(
            future
                .map(move |result| result.map(|()| outcome).map_err(GoalError::from))
                .boxed(),
        )
    }

    fn cancel(&mut self, ctx: &mut GoalContext<'_>) {
        self.action.release(ctx.actions());
    }
}
