//! The alternatives a gather can take and the bookkeeping of failed ones.

use std::collections::BTreeSet;

use quarry_types::{BlockPos, EntityId};
use serde::Serialize;

/// One way of obtaining an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Branch {
    /// Break a block that drops the item.
    Dig {
        /// Where the block is.
        pos: BlockPos,
        /// Block name.
        block: String,
    },
    /// Kill a creature that drops the item.
    Attack {
        /// The creature.
        entity: EntityId,
        /// Creature name.
        creature: String,
    },
    /// Craft the item with the recipe at this index of
    /// `GameData::recipes_for`.
    Craft {
        /// Recipe index.
        recipe: usize,
    },
    /// Smelt the item with the furnace recipe at this index of
    /// `GameData::smelting_for`.
    Smelt {
        /// Smelting recipe index.
        recipe: usize,
    },
}

impl Branch {
    /// The key under which a failure of this branch is remembered.
    pub fn rejection(&self) -> Rejection {
        match self {
            Self::Dig { pos, .. } => Rejection::Block(*pos),
            Self::Attack { entity, .. } => Rejection::Entity(*entity),
            Self::Craft { recipe } => Rejection::Recipe(*recipe),
            Self::Smelt { recipe } => Rejection::Smelting(*recipe),
        }
    }

    /// Short name of the acquisition method.
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Dig { .. } => "dig",
            Self::Attack { .. } => "attack",
            Self::Craft { .. } => "craft",
            Self::Smelt { .. } => "smelt",
        }
    }
}

impl core::fmt::Display for Branch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Dig { pos, block } => write!(f, "dig {block} at {pos}"),
            Self::Attack { entity, creature } => write!(f, "attack {creature} {entity}"),
            Self::Craft { recipe } => write!(f, "craft (recipe {recipe})"),
            Self::Smelt { recipe } => write!(f, "smelt (recipe {recipe})"),
        }
    }
}

/// The cheapest branch and its estimated cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    /// What to do.
    pub branch: Branch,
    /// Its estimated cost, finite.
    pub cost: f64,
}

/// A specific alternative that already failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Rejection {
    /// A block position.
    Block(BlockPos),
    /// A creature.
    Entity(EntityId),
    /// A crafting recipe index.
    Recipe(usize),
    /// A smelting recipe index.
    Smelting(usize),
}

/// Alternatives excluded from further planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rejections {
    entries: BTreeSet<Rejection>,
}

impl Rejections {
    /// Nothing rejected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject an alternative. Returns whether it was new.
    pub fn reject(&mut self, rejection: Rejection) -> bool {
        self.entries.insert(rejection)
    }

    /// Whether an alternative was rejected.
    pub fn contains(&self, rejection: Rejection) -> bool {
        self.entries.contains(&rejection)
    }

    /// Number of rejected alternatives.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was rejected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rejected recipe indices.
    pub fn recipes(&self) -> BTreeSet<usize> {
        self.entries
            .iter()
            .filter_map(|r| match r {
                Rejection::Recipe(i) => Some(*i),
                _ => None,
            })
            .collect()
    }
}
