//! Game-data records and entity snapshots.
//!
//! These are the static facts the planner reasons about (what a block
//! drops, how hard it is, what a recipe consumes) plus the point-in-time
//! view of an entity returned by the world provider.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::EntityKind;
use crate::geometry::Vec3;
use crate::ids::EntityId;

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A quantity of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item name, e.g. `oak_planks`.
    pub name: String,
    /// Number of items.
    pub count: u32,
}

impl ItemStack {
    /// Create a stack.
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// A crafting recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// The item produced.
    pub result: String,
    /// How many items one craft produces.
    pub count: u32,
    /// Items consumed per craft (item -> quantity).
    pub ingredients: BTreeMap<String, u32>,
    /// Whether the recipe needs a crafting table (3x3 grid).
    #[serde(default)]
    pub needs_table: bool,
}

impl Recipe {
    /// Whether the recipe lists its own result as an ingredient.
    pub fn is_self_referential(&self) -> bool {
        self.ingredients.contains_key(&self.result)
    }

    /// Number of crafts needed to produce at least `count` items.
    pub const fn crafts_for(&self, count: u32) -> u32 {
        if self.count == 0 {
            return 0;
        }
        count.div_ceil(self.count)
    }

    /// Total quantity of each ingredient consumed by `crafts` crafts.
    pub fn totals(&self, crafts: u32) -> BTreeMap<String, u32> {
        self.ingredients
            .iter()
            .map(|(name, qty)| (name.clone(), qty.saturating_mul(crafts)))
            .collect()
    }
}

/// A furnace recipe: one `input` item smelts into one `output` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmeltingRecipe {
    /// Item placed in the furnace.
    pub input: String,
    /// Item produced.
    pub output: String,
}

// ---------------------------------------------------------------------------
// Blocks and creatures
// ---------------------------------------------------------------------------

/// Static facts about a block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block name, e.g. `oak_log`.
    pub name: String,
    /// Time-like digging effort; the block term of a dig cost.
    pub hardness: f64,
    /// Items dropped when the block is broken with an acceptable tool.
    #[serde(default)]
    pub drops: Vec<String>,
    /// Tools able to harvest the block, best first. Empty means bare hands
    /// suffice.
    #[serde(default)]
    pub harvest_tools: Vec<String>,
}

impl BlockInfo {
    /// Whether the block yields drops only with one of `harvest_tools`.
    pub fn requires_tool(&self) -> bool {
        !self.harvest_tools.is_empty()
    }
}

/// Static facts about a creature type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureInfo {
    /// Creature name, e.g. `sheep`.
    pub name: String,
    /// Whether it is hostile or passive.
    pub kind: EntityKind,
    /// Items dropped on death.
    #[serde(default)]
    pub drops: Vec<String>,
    /// Hit points when spawned.
    pub health: f32,
}

// ---------------------------------------------------------------------------
// Entity snapshots
// ---------------------------------------------------------------------------

/// Point-in-time view of a world entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Entity identifier.
    pub id: EntityId,
    /// Creature, player, or item name.
    pub name: String,
    /// Broad category.
    pub kind: EntityKind,
    /// Current position.
    pub position: Vec3,
    /// Remaining hit points (item drops report their stack size).
    pub health: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planks_recipe() -> Recipe {
        Recipe {
            result: String::from("oak_planks"),
            count: 4,
            ingredients: BTreeMap::from([(String::from("oak_log"), 1)]),
            needs_table: false,
        }
    }

    #[test]
    fn crafts_round_up() {
        let r = planks_recipe();
        assert_eq!(r.crafts_for(1), 1);
        assert_eq!(r.crafts_for(4), 1);
        assert_eq!(r.crafts_for(5), 2);
        assert_eq!(r.totals(2).get("oak_log").copied(), Some(2));
    }

    #[test]
    fn self_reference_is_detected() {
        let mut r = planks_recipe();
        assert!(!r.is_self_referential());
        r.ingredients.insert(String::from("oak_planks"), 1);
        assert!(r.is_self_referential());
    }

    #[test]
    fn recipe_table_flag_defaults_to_false() {
        let json = r#"{"result":"stick","count":4,"ingredients":{"oak_planks":2}}"#;
        let r: Recipe = serde_json::from_str(json).unwrap_or_else(|_| planks_recipe());
        assert_eq!(r.result, "stick");
        assert!(!r.needs_table);
    }
}
